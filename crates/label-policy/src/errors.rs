use thiserror::Error;

/// Errors raised while turning raw bytes into typed admission data.
///
/// The `Display` output is the bare parser message: it ends up verbatim in
/// the `status.message` of the admission response.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{0}")]
    Envelope(String),

    #[error("{0}")]
    Object(String),

    #[error("admission request does not carry an object")]
    MissingObject,
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("cannot serialize patch: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("governed kind cannot be empty")]
    EmptyGovernedKind,

    #[error("governed namespace cannot be empty")]
    EmptyGovernedNamespace,

    #[error("at least one required label must be provided")]
    NoRequiredLabels,

    #[error("required label keys cannot be empty")]
    EmptyRequiredLabel,

    #[error("required label \"{0}\" is listed more than once")]
    DuplicatedRequiredLabel(String),

    #[error("the value written for missing labels cannot be empty")]
    EmptySentinel,
}
