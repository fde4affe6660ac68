//! Endpoint: `POST /ask`
//!
//! Requires the device api key header; forwards the body to the completion
//! backend. `INIT` and `EXIT` are answered locally without touching the
//! backend, so freshly provisioned devices can smoke-test their key cheaply.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, info};

use edgegate_core::CompletionRequest;

use crate::server::GatewayState;
use crate::status::{self, truncate_utf8};

/// Completion token budget per request.
const MAX_TOKENS: u32 = 256;

pub async fn ask(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let presented = headers
        .get(state.config.key_header.as_str())
        .and_then(|v| v.to_str().ok());

    match state.authorizer.authorize(presented).await {
        Ok(true) => {}
        Ok(false) => return (StatusCode::FORBIDDEN, "FORBIDDEN".to_string()),
        Err(e) => {
            let (code, body) = status::to_response(&e);
            return (code, body.to_string());
        }
    }

    let body = String::from_utf8_lossy(&body).into_owned();
    match body.as_str() {
        "INIT" => return (StatusCode::OK, "OK".to_string()),
        "EXIT" => return (StatusCode::OK, "BYE".to_string()),
        "" => return (StatusCode::BAD_REQUEST, "EMPTY".to_string()),
        _ => {}
    }

    let prompt = truncate_utf8(&body, state.config.max_prompt_len).to_string();
    debug!(prompt_len = prompt.len(), "Forwarding prompt to completion backend");

    let request = CompletionRequest {
        model: state.config.model_id.clone(),
        prompt,
        max_tokens: MAX_TOKENS,
    };

    match state.completion.complete(&request).await {
        Ok(response) => {
            info!(provider = %response.provider, "Completion served");
            let text = truncate_utf8(&response.content, state.config.max_response_len);
            (StatusCode::OK, text.to_string())
        }
        Err(e) => {
            let err = edgegate_core::GateError::Completion(e.to_string());
            let (code, body) = status::to_response(&err);
            (code, body.to_string())
        }
    }
}
