pub mod error;
pub mod traits;
pub mod types;

pub use error::{ForbiddenReason, GateError};
pub use traits::{CompletionProvider, CompletionRequest, CompletionResponse, SecretStore};
pub use types::{DeviceKeyMap, ProvisionRequest};
