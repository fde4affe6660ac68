//! Device authentication core: the provisioning handshake (HMAC
//! challenge-response with replay protection) and the api-key authorization
//! check that gates all proxied traffic.

pub mod authorize;
pub mod provision;
pub mod sign;

pub use authorize::Authorizer;
pub use provision::Provisioner;
pub use sign::{constant_time_eq, generate_api_key, hmac_digest, sign_hex, signing_message};
