//! JSON patch (RFC 6902) documents produced by the mutation path.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::errors::PatchError;

/// JSON pointer of the labels map inside of an object.
pub const LABELS_PATH: &str = "/metadata/labels";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
}

/// The values a patch operation can carry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PatchValue {
    Map(BTreeMap<String, String>),
    Scalar(String),
    List(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: PatchValue,
}

/// Builds the patch replacing the whole labels map of an object.
///
/// `add` on an existing member replaces its value wholesale, hence `labels`
/// must be the complete label set: any key left out is dropped from the
/// object.
pub fn labels_patch(labels: BTreeMap<String, String>) -> Vec<PatchOperation> {
    vec![PatchOperation {
        op: PatchOp::Add,
        path: LABELS_PATH.to_owned(),
        value: PatchValue::Map(labels),
    }]
}

pub fn serialize_patch(patch: &[PatchOperation]) -> Result<Vec<u8>, PatchError> {
    serde_json::to_vec(patch).map_err(PatchError::Serialize)
}

/// Serializes the patch and encodes it the way the `patch` field of an
/// AdmissionResponse expects it.
pub fn encode_patch(patch: &[PatchOperation]) -> Result<String, PatchError> {
    serialize_patch(patch).map(|bytes| general_purpose::STANDARD.encode(bytes))
}
