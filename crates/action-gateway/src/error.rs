//! Request-time gateway errors.
//!
//! [`GatewayError`] is the single error type returned by every stage of the
//! request pipeline (decode, lookup, gate, throttle, merge, invoke,
//! transcode). It implements [`IntoResponse`] directly — unlike
//! `gateway_kernel::gateway::GatewayError`, which only covers structural
//! configuration failures detected before any request arrives.
//!
//! Every non-2xx response is a JSON object `{"error": <message>, "code":
//! <transaction_id>}`, except `.http`-extension responses, which pass the
//! user-supplied status and body through untouched (built directly in
//! [`crate::transcode`], not through this type).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Request-time error taxonomy, per §7 of the gateway design.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Entity missing, package is a binding, or a record failed to
    /// deserialize — every lookup failure collapses here to avoid leaking
    /// existence (§4.2).
    #[error("{0}")]
    LookupMissing(String),

    /// The action requires authentication and the caller supplied none.
    #[error("authentication required")]
    Unauthorized,

    /// The action owner has exceeded its activation quota.
    #[error("activation quota exceeded")]
    Throttled,

    /// Malformed input: immutability violation, bad header map, bad status
    /// code, projection/media-contract mismatch, unknown content-type.
    #[error("{0}")]
    BadInput(String),

    /// Decoded entity body exceeded the configured size limit.
    #[error("request entity too large")]
    EntityTooLarge,

    /// The requested extension is not one of the five recognized ones.
    #[error("content type not supported")]
    MediaUnsupported,

    /// The blocking invocation timed out, or completed with no result.
    /// Carries the activation id so the caller can poll for it later.
    #[error("response not yet ready")]
    NotReady(String),

    /// Unexpected store failure, invoker fault, or transcoder panic path.
    #[error("{0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::LookupMissing(_) => StatusCode::NOT_FOUND,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BadInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::EntityTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::MediaUnsupported => StatusCode::NOT_ACCEPTABLE,
            GatewayError::NotReady(_) => StatusCode::ACCEPTED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Build an error response directly from a status code and message, for
/// callers that only have a [`gateway_kernel::gateway::FilterAction::Reject`]
/// in hand rather than a typed [`GatewayError`] (e.g. the filter pipeline).
/// Produces the same `{"error", "code"}` body shape as [`IntoResponse`].
pub fn reject_response(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let transaction_id = Uuid::new_v4().to_string();
    tracing::error!(transaction_id = %transaction_id, status = status.as_u16(), error = %message, "request rejected");
    let body = json!({ "error": message, "code": transaction_id });
    (status, Json(body)).into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let transaction_id = Uuid::new_v4().to_string();

        tracing::error!(transaction_id = %transaction_id, status = status.as_u16(), error = %self, "request failed");

        let body = match &self {
            GatewayError::NotReady(activation_id) => json!({
                "error": self.to_string(),
                "code": transaction_id,
                "activationId": activation_id,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": transaction_id,
            }),
        };

        (status, Json(body)).into_response()
    }
}
