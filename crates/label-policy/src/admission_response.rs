use serde::{Deserialize, Serialize};

use crate::errors::{DecodeError, PatchError};
use crate::patch;
use crate::policy::Decision;

/// This models the admission/v1/AdmissionResponse object of Kubernetes
/// See https://pkg.go.dev/k8s.io/kubernetes/pkg/apis/admission#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    /// It is left out when the request could not be decoded at all.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    #[serde(default)]
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// The patch body, base64 encoded. Currently we only support "JSONPatch"
    /// which implements RFC 6902.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status contains extra details into why an admission request was denied.
    /// This field IS NOT consulted in any way if "Allowed" is "true".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

/// PatchType is the type of patch being used to represent the mutated object
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// A human-readable description of the status of this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// A machine-readable description of why this operation is in the
    /// "Failure" status. A Reason clarifies an HTTP status code but does
    /// not override it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<StatusReason>,

    /// Suggested HTTP return code for this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

/// The subset of the Kubernetes StatusReason values used by this webhook.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum StatusReason {
    /// The request was understood, but the policy refuses it.
    /// Status code 403.
    Forbidden,

    /// The request could not be understood.
    /// Status code 400.
    BadRequest,

    /// An internal error occurred.
    /// Status code 500.
    InternalError,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }

    pub fn reject(uid: String, message: String, code: u16) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
                code: Some(code),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn reject_internal_server_error(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(format!("internal server error: {message}")),
                reason: Some(StatusReason::InternalError),
                code: Some(500),
            }),
            ..Default::default()
        }
    }

    /// Answer given when the request, or the object inside of it, cannot be
    /// decoded. The object is not admitted and the message is the parser error.
    pub fn from_decode_error(uid: Option<String>, error: &DecodeError) -> AdmissionResponse {
        AdmissionResponse {
            uid: uid.unwrap_or_default(),
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(error.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn from_decision(uid: String, decision: Decision) -> Result<AdmissionResponse, PatchError> {
        let response = match decision {
            Decision::Allowed => AdmissionResponse::allow(uid),
            Decision::Denied { reason } => {
                let mut response = AdmissionResponse::reject(uid, reason, 403);
                if let Some(status) = response.status.as_mut() {
                    status.reason = Some(StatusReason::Forbidden);
                }
                response
            }
            Decision::Mutated { labels } => {
                let encoded = patch::encode_patch(&patch::labels_patch(labels))?;
                AdmissionResponse {
                    uid,
                    allowed: true,
                    patch_type: Some(PatchType::JSONPatch),
                    patch: Some(encoded),
                    status: None,
                }
            }
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use base64::{Engine as _, engine::general_purpose};
    use serde_json::json;

    #[test]
    fn create_reject_response() {
        let uid = String::from("UID");
        let message = String::from("test message");
        let code: u16 = 500;

        let response = AdmissionResponse::reject(uid.clone(), message.clone(), code);
        assert_eq!(response.uid, uid);
        assert!(!response.allowed);
        assert_eq!(response.patch, None);
        assert_eq!(response.patch_type, None);

        let status = response.status.unwrap();
        assert_eq!(status.code, Some(code));
        assert_eq!(status.message, Some(message));
    }

    #[test]
    fn create_internal_server_error_response() {
        let response =
            AdmissionResponse::reject_internal_server_error("UID".to_owned(), "boom".to_owned());

        assert_eq!(response.uid, "UID");
        assert!(!response.allowed);
        assert_eq!(
            response.status,
            Some(AdmissionResponseStatus {
                message: Some("internal server error: boom".to_owned()),
                reason: Some(StatusReason::InternalError),
                code: Some(500),
            })
        );
    }

    #[test]
    fn decode_error_without_uid_omits_it() {
        let response = AdmissionResponse::from_decode_error(
            None,
            &DecodeError::Envelope("expected value at line 1 column 1".to_owned()),
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "allowed": false,
                "status": {"message": "expected value at line 1 column 1"}
            })
        );
    }

    #[test]
    fn decode_error_keeps_uid() {
        let response =
            AdmissionResponse::from_decode_error(Some("UID".to_owned()), &DecodeError::MissingObject);

        assert_eq!(response.uid, "UID");
        assert!(!response.allowed);
        assert_eq!(
            response.status.unwrap().message.unwrap(),
            "admission request does not carry an object"
        );
    }

    #[test]
    fn allowed_decision() {
        let response = AdmissionResponse::from_decision("UID".to_owned(), Decision::Allowed).unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"uid": "UID", "allowed": true})
        );
    }

    #[test]
    fn denied_decision() {
        let response = AdmissionResponse::from_decision(
            "UID".to_owned(),
            Decision::Denied {
                reason: "required label is not set".to_owned(),
            },
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "uid": "UID",
                "allowed": false,
                "status": {
                    "message": "required label is not set",
                    "reason": "Forbidden",
                    "code": 403
                }
            })
        );
    }

    #[test]
    fn mutated_decision() {
        let labels = BTreeMap::from([
            ("app".to_owned(), "nginx".to_owned()),
            ("test-admission".to_owned(), "yes".to_owned()),
        ]);

        let response =
            AdmissionResponse::from_decision("UID".to_owned(), Decision::Mutated { labels }).unwrap();

        assert!(response.allowed);
        assert_eq!(response.status, None);
        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));

        let patch = general_purpose::STANDARD
            .decode(response.patch.unwrap())
            .unwrap();
        let patch: serde_json::Value = serde_json::from_slice(&patch).unwrap();
        assert_eq!(
            patch,
            json!([{
                "op": "add",
                "path": "/metadata/labels",
                "value": {"app": "nginx", "test-admission": "yes"}
            }])
        );
    }
}
