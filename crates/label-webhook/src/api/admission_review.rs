use label_policy::admission_request::AdmissionRequest;
use label_policy::admission_response::AdmissionResponse;
use label_policy::errors::DecodeError;

pub const DEFAULT_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub request: AdmissionRequest,
}

impl AdmissionReviewRequest {
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(body).map_err(|e| DecodeError::Envelope(e.to_string()))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: Some(String::from(DEFAULT_API_VERSION)),
            kind: Some(String::from(ADMISSION_REVIEW_KIND)),
            response,
        }
    }

    /// The API server expects the answer to use the same `apiVersion` it
    /// sent the review with.
    pub fn for_request(request: &AdmissionReviewRequest, response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: Some(
                request
                    .api_version
                    .clone()
                    .unwrap_or_else(|| String::from(DEFAULT_API_VERSION)),
            ),
            kind: Some(String::from(ADMISSION_REVIEW_KIND)),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_review_envelope() {
        let body = include_bytes!("../../tests/data/pod_with_required_labels.json");

        let review = AdmissionReviewRequest::decode(body).unwrap();

        assert_eq!(review.api_version.as_deref(), Some("admission.k8s.io/v1"));
        assert_eq!(review.request.kind.kind, "Pod");
        assert_eq!(review.request.namespace.as_deref(), Some("test-admisssion"));
        assert!(review.request.object.is_some());
    }

    #[test]
    fn decode_reports_parser_message() {
        let error = AdmissionReviewRequest::decode(b"{not json").unwrap_err();

        assert_eq!(
            error,
            DecodeError::Envelope("key must be a string at line 1 column 2".to_owned())
        );
    }

    #[test]
    fn decode_requires_the_request_field() {
        let error = AdmissionReviewRequest::decode(br#"{"kind": "AdmissionReview"}"#).unwrap_err();

        assert!(error.to_string().contains("missing field `request`"));
    }

    #[test]
    fn response_echoes_request_api_version() {
        let mut request =
            AdmissionReviewRequest::decode(include_bytes!("../../tests/data/deployment.json"))
                .unwrap();
        request.api_version = Some("admission.k8s.io/v1beta1".to_owned());

        let review = AdmissionReviewResponse::for_request(
            &request,
            AdmissionResponse::allow(request.request.uid.clone()),
        );

        assert_eq!(review.api_version.as_deref(), Some("admission.k8s.io/v1beta1"));
        assert_eq!(review.kind.as_deref(), Some("AdmissionReview"));
    }
}
