//! EdgeGate HTTP API Server
//!
//! Exposes the provisioning endpoint, the authorized-request endpoint, and a
//! health probe, over an explicit route table.

pub mod ask_api;
pub mod health_api;
pub mod provision_api;
pub mod server;
pub mod status;

pub use server::{build_router, start_server, GatewayState};
