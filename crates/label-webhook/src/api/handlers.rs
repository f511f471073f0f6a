use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{self, FromRequest, Request},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::api::{
    api_error::ApiError,
    service::{ReviewMode, review},
    state::ApiServerState,
};

/// The raw body of an admission review, once the transport preconditions
/// hold: the body is not empty and it is declared as `application/json`.
pub(crate) struct AdmissionReviewBody(pub(crate) Bytes);

impl<S> FromRequest<S> for AdmissionReviewBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

        if body.is_empty() {
            error!("empty body");
            return Err(ApiError::empty_body());
        }

        if content_type.as_deref() != Some(mime::APPLICATION_JSON.as_ref()) {
            error!(
                content_type = content_type.as_deref().unwrap_or_default(),
                "unexpected Content-Type, expect {}",
                mime::APPLICATION_JSON
            );
            return Err(ApiError::unsupported_media_type());
        }

        Ok(Self(body))
    }
}

#[tracing::instrument(
    name = "validation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind_group=tracing::field::Empty,
        kind_version=tracing::field::Empty,
        kind=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_code=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Check an object against the required labels policy.
pub(crate) async fn validate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    AdmissionReviewBody(body): AdmissionReviewBody,
) -> Result<Response, ApiError> {
    handle_review(&state, ReviewMode::Validate, &body)
}

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind_group=tracing::field::Empty,
        kind_version=tracing::field::Empty,
        kind=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_code=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Add the missing required labels to an object.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    AdmissionReviewBody(body): AdmissionReviewBody,
) -> Result<Response, ApiError> {
    handle_review(&state, ReviewMode::Mutate, &body)
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

pub(crate) async fn not_found_handler(uri: Uri) -> ApiError {
    debug!(path = uri.path(), "request for an unknown endpoint");
    ApiError::not_found(uri.path())
}

fn handle_review(
    state: &ApiServerState,
    mode: ReviewMode,
    body: &[u8],
) -> Result<Response, ApiError> {
    let admission_review = review(&state.policy, mode, body);

    let payload = serde_json::to_vec(&admission_review).map_err(|e| {
        error!(error = %e, "cannot encode response");
        ApiError::internal(format!("could not encode response: {e}"))
    })?;

    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
        payload,
    )
        .into_response())
}
