use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

pub const DEFAULT_GOVERNED_KIND: &str = "Pod";
pub const DEFAULT_GOVERNED_NAMESPACE: &str = "test-admisssion";
pub const DEFAULT_REQUIRED_LABELS: [&str; 2] = ["test-admission", "admission-webhook"];
pub const DEFAULT_SENTINEL_VALUE: &str = "yes";

/// How the validation path checks the list of required labels.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LabelCheckMode {
    /// Every required label must be set.
    #[default]
    AllKeys,
    /// Only the first required label is inspected, the others are ignored.
    FirstKey,
}

/// The constants governing the label policy.
///
/// Every field has a default, so an empty settings document is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PolicySettings {
    /// The only object kind inspected; every other kind is always accepted.
    pub governed_kind: String,
    /// The only namespace inspected; objects elsewhere are always accepted.
    pub governed_namespace: String,
    /// Ordered list of label keys an object must carry.
    pub required_labels: Vec<String>,
    /// Value assigned to required labels added by the mutation path.
    pub sentinel_value: String,
    pub validation_check_mode: LabelCheckMode,
}

impl Default for PolicySettings {
    fn default() -> Self {
        PolicySettings {
            governed_kind: DEFAULT_GOVERNED_KIND.to_owned(),
            governed_namespace: DEFAULT_GOVERNED_NAMESPACE.to_owned(),
            required_labels: DEFAULT_REQUIRED_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            sentinel_value: DEFAULT_SENTINEL_VALUE.to_owned(),
            validation_check_mode: LabelCheckMode::default(),
        }
    }
}

impl PolicySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.governed_kind.is_empty() {
            return Err(SettingsError::EmptyGovernedKind);
        }
        if self.governed_namespace.is_empty() {
            return Err(SettingsError::EmptyGovernedNamespace);
        }
        if self.required_labels.is_empty() {
            return Err(SettingsError::NoRequiredLabels);
        }

        let mut seen = BTreeSet::new();
        for label in &self.required_labels {
            if label.is_empty() {
                return Err(SettingsError::EmptyRequiredLabel);
            }
            if !seen.insert(label.as_str()) {
                return Err(SettingsError::DuplicatedRequiredLabel(label.clone()));
            }
        }

        if self.sentinel_value.is_empty() {
            return Err(SettingsError::EmptySentinel);
        }

        Ok(())
    }
}
