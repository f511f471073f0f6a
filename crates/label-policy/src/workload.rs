use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde::Deserialize;

use crate::errors::DecodeError;

/// The part of a workload object the label policy looks at.
///
/// Any object kind decodes into this shape: only `metadata` is read, the
/// rest of the document is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkloadObject {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ObjectWithMetadata {
    #[serde(default)]
    metadata: ObjectMeta,
}

impl WorkloadObject {
    pub fn from_raw(raw: &RawExtension) -> Result<Self, DecodeError> {
        let object = ObjectWithMetadata::deserialize(&raw.0)
            .map_err(|e| DecodeError::Object(e.to_string()))?;

        Ok(object.metadata.into())
    }
}

impl From<ObjectMeta> for WorkloadObject {
    fn from(metadata: ObjectMeta) -> Self {
        WorkloadObject {
            name: metadata.name,
            namespace: metadata.namespace,
            labels: metadata.labels.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_pod_metadata() {
        let raw = RawExtension(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "nginx",
                "namespace": "test-admisssion",
                "labels": {"app": "nginx", "tier": "frontend"}
            },
            "spec": {"containers": [{"name": "nginx", "image": "nginx:1.27"}]}
        }));

        let object = WorkloadObject::from_raw(&raw).unwrap();

        assert_eq!(object.name.as_deref(), Some("nginx"));
        assert_eq!(object.namespace.as_deref(), Some("test-admisssion"));
        assert_eq!(
            object.labels,
            BTreeMap::from([
                ("app".to_owned(), "nginx".to_owned()),
                ("tier".to_owned(), "frontend".to_owned()),
            ])
        );
    }

    #[test]
    fn missing_labels_decode_to_empty_map() {
        let raw = RawExtension(json!({"metadata": {"name": "nginx"}}));

        let object = WorkloadObject::from_raw(&raw).unwrap();

        assert!(object.labels.is_empty());
        assert!(object.namespace.is_none());
    }

    #[test]
    fn label_with_wrong_type_is_a_decode_error() {
        let raw = RawExtension(json!({"metadata": {"labels": {"app": 42}}}));

        let error = WorkloadObject::from_raw(&raw).unwrap_err();

        assert!(matches!(error, DecodeError::Object(_)));
    }

    #[test]
    fn non_object_payload_is_a_decode_error() {
        let raw = RawExtension(json!("not an object"));

        match WorkloadObject::from_raw(&raw).unwrap_err() {
            DecodeError::Object(message) => assert!(message.contains("invalid type")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
