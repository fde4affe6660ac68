//! Endpoint: `POST /provision`
//!
//! Accepts `{device_id, ts, sig}` and returns the issued api key as plain
//! text on success.

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use tracing::debug;

use edgegate_core::ProvisionRequest;

use crate::server::GatewayState;
use crate::status;

pub async fn provision(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    let req: ProvisionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            debug!(error = %e, "Unparsable provisioning payload");
            return (StatusCode::BAD_REQUEST, "BAD REQUEST".to_string());
        }
    };

    match state.provisioner.provision(&req).await {
        Ok(api_key) => (StatusCode::OK, api_key),
        Err(e) => {
            let (code, body) = status::to_response(&e);
            (code, body.to_string())
        }
    }
}
