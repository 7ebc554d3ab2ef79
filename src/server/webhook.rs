//! Webhook endpoint handler.
//!
//! Each delivery is verified, parsed into a typed event and handled before
//! the response is sent. A handler failure answers 500 so that GitHub records
//! the delivery as failed and it can be redelivered.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AppState, InterpreterFactory};
use crate::effects::EffectExecutor;
use crate::handlers::{Dispatch, HandlerError, dispatch};
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, SignatureError, parse_webhook};

const HEADER_EVENT: &str = "x-github-event";
const HEADER_DELIVERY: &str = "x-github-delivery";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 `Processed`: at least one handler ran
/// - 200 `Ignored`: event type or action is not handled
/// - 400 Bad Request: missing header or malformed payload
/// - 401 Unauthorized: signature missing or wrong (only with a secret configured)
/// - 500 Internal Server Error: a GitHub call failed
pub async fn webhook_handler<F: InterpreterFactory>(
    State(app_state): State<AppState<F>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);

    debug!(delivery_id = %delivery_id, event_type = %event_type, "Received webhook");

    // Verify before parsing anything.
    if let Some(secret) = app_state.webhook_secret() {
        let signature = headers.get(HEADER_SIGNATURE).and_then(|v| v.to_str().ok());
        if let Err(e) = secret.verify(&body, signature) {
            warn!(delivery_id = %delivery_id, error = %e, "Rejected webhook signature");
            return Err(e.into());
        }
    }

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    let executor = EffectExecutor::new(app_state.factory().for_repo(event.repo_id()));
    let result = dispatch(&event, &executor, app_state.config(), app_state.analyzer()).await;

    match result {
        Ok(Dispatch::Handled) => {
            info!(
                delivery_id = %delivery_id,
                repo = %event.repo_id(),
                pr = %event.pr().number,
                installation = ?event.installation_id(),
                "Webhook processed"
            );
            Ok((StatusCode::OK, "Processed"))
        }
        Ok(Dispatch::Ignored) => Ok((StatusCode::OK, "Ignored")),
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Webhook handling failed");
            Err(e.into())
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
