//! Gateway Health API
//!
//! Public probe endpoint. Also surfaces the device-key parse-failure counter,
//! the only internal signal for the fail-open-to-empty-map policy.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: String,
    /// Times the stored device-key map failed to parse and was served empty.
    pub key_map_parse_failures: u64,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        key_map_parse_failures: state.cache.parse_failures(),
    })
}
