//! HTTP layer of the bridge.
//!
//! The four route handlers in [`routes`] are the orchestration core: they
//! decide per challenge whether an existing session short-circuits the
//! login, which upstream calls to issue in what order, and how each
//! upstream status maps outward. Everything else here is carrier plumbing:
//! configuration, shared client state, cookie forwarding, response relaying
//! and embedded UI assets.

mod assets;
mod config;
mod cookies;
mod error;
mod relay;
mod routes;
mod state;

pub use config::BridgeConfig;
pub use error::HandlerError;
pub use routes::router;
pub use state::AppState;
