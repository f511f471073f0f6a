use std::collections::BTreeMap;

use crate::errors::SettingsError;
use crate::settings::{LabelCheckMode, PolicySettings};

/// Reason given when the validation path rejects an object.
pub const MISSING_LABEL_REASON: &str = "required label is not set";

/// The outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { reason: String },
    /// The object is accepted once its labels are replaced by `labels`.
    /// This is the complete resulting label set, not only the additions.
    Mutated { labels: BTreeMap<String, String> },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Denied { .. })
    }
}

/// Evaluates the "has required labels" rule.
///
/// Both evaluation modes are pure functions of the object kind, its namespace
/// and its labels.
#[derive(Debug, Clone)]
pub struct LabelPolicy {
    settings: PolicySettings,
}

impl LabelPolicy {
    pub fn new(settings: PolicySettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(LabelPolicy { settings })
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Returns true when the policy has something to say about the object.
    pub fn governs(&self, kind: &str, namespace: &str) -> bool {
        kind == self.settings.governed_kind && namespace == self.settings.governed_namespace
    }

    pub fn governs_kind(&self, kind: &str) -> bool {
        kind == self.settings.governed_kind
    }

    pub fn validate(
        &self,
        kind: &str,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Decision {
        if !self.governs(kind, namespace) {
            return Decision::Allowed;
        }

        let checked = match self.settings.validation_check_mode {
            LabelCheckMode::AllKeys => &self.settings.required_labels[..],
            LabelCheckMode::FirstKey => &self.settings.required_labels[..1],
        };

        if checked.iter().all(|key| labels.contains_key(key)) {
            Decision::Allowed
        } else {
            Decision::Denied {
                reason: MISSING_LABEL_REASON.to_owned(),
            }
        }
    }

    /// The mutation path always looks at every required label, regardless of
    /// the check mode used by validation.
    pub fn mutate(
        &self,
        kind: &str,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Decision {
        if !self.governs(kind, namespace) {
            return Decision::Allowed;
        }

        let missing = self.missing_labels(labels);
        if missing.is_empty() {
            return Decision::Allowed;
        }

        let mut result = labels.clone();
        for key in missing {
            result.insert(key.to_owned(), self.settings.sentinel_value.clone());
        }

        Decision::Mutated { labels: result }
    }

    /// Required label keys absent from `labels`, in the configured order.
    pub fn missing_labels<'a>(&'a self, labels: &BTreeMap<String, String>) -> Vec<&'a str> {
        self.settings
            .required_labels
            .iter()
            .filter(|key| !labels.contains_key(key.as_str()))
            .map(String::as_str)
            .collect()
    }
}
