use std::fmt;

use label_policy::{
    LabelPolicy, WorkloadObject, admission_request::AdmissionRequest,
    admission_response::AdmissionResponse, errors::DecodeError,
};
use tracing::{debug, error, warn};

use crate::api::{
    admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
    populate_span_with_admission_request_data, populate_span_with_evaluation_results,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReviewMode {
    Validate,
    Mutate,
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReviewMode::Validate => write!(f, "validate"),
            ReviewMode::Mutate => write!(f, "mutate"),
        }
    }
}

/// Runs a raw review body through the whole admission pipeline.
///
/// Never fails: bodies that cannot be decoded produce a response denying
/// the request, with the decoding error as message.
pub(crate) fn review(
    policy: &LabelPolicy,
    mode: ReviewMode,
    body: &[u8],
) -> AdmissionReviewResponse {
    let admission_review = match AdmissionReviewRequest::decode(body) {
        Ok(admission_review) => admission_review,
        Err(error) => {
            warn!(error = %error, "cannot decode admission review");
            let response = AdmissionResponse::from_decode_error(None, &error);
            populate_span_with_evaluation_results(&response);
            return AdmissionReviewResponse::new(response);
        }
    };

    populate_span_with_admission_request_data(&admission_review.request);

    let response = evaluate(policy, mode, &admission_review.request);
    debug!(response =? &response, "policy evaluated");

    populate_span_with_evaluation_results(&response);

    AdmissionReviewResponse::for_request(&admission_review, response)
}

pub(crate) fn evaluate(
    policy: &LabelPolicy,
    mode: ReviewMode,
    request: &AdmissionRequest,
) -> AdmissionResponse {
    let uid = request.uid.clone();
    let kind = request.kind.kind.as_str();

    // the object is decoded only for the governed kind
    if !policy.governs_kind(kind) {
        debug!(
            kind,
            namespace = request.namespace.as_deref().unwrap_or_default(),
            name = request.name.as_deref().unwrap_or_default(),
            "skipping {mode}, kind is not governed by the policy"
        );
        return AdmissionResponse::allow(uid);
    }

    let object = match request
        .object
        .as_ref()
        .ok_or(DecodeError::MissingObject)
        .and_then(WorkloadObject::from_raw)
    {
        Ok(object) => object,
        Err(error) => {
            warn!(error = %error, "cannot decode admission request object");
            return AdmissionResponse::from_decode_error(Some(uid), &error);
        }
    };

    // The namespace of the request is authoritative: objects created without
    // an explicit namespace do not carry it inside of their metadata.
    let namespace = request
        .namespace
        .as_deref()
        .or(object.namespace.as_deref())
        .unwrap_or_default();

    let decision = match mode {
        ReviewMode::Validate => policy.validate(kind, namespace, &object.labels),
        ReviewMode::Mutate => policy.mutate(kind, namespace, &object.labels),
    };
    debug!(
        kind,
        namespace,
        name = object.name.as_deref().unwrap_or_default(),
        allowed = decision.is_allowed(),
        "{mode} decision taken"
    );

    AdmissionResponse::from_decision(uid.clone(), decision).unwrap_or_else(|error| {
        error!(error = %error, "cannot build admission patch");
        AdmissionResponse::reject_internal_server_error(uid, error.to_string())
    })
}
