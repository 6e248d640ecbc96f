#![doc = include_str!("../README.md")]

pub mod authz;
pub mod error;
pub mod identity;
pub mod server;
pub mod types;
pub mod upstream;

// Re-exports for convenient access
pub use authz::AuthzClient;
pub use error::Error;
pub use identity::IdentityClient;
pub use server::{router, AppState, BridgeConfig, HandlerError};
pub use types::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentChallenge, ConsentRequest, ErrorId,
    ExternalError, FlowId, LoginChallenge, SelfServiceError, Session,
};
pub use upstream::UpstreamResponse;
