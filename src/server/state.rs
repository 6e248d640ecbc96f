use std::sync::Arc;

use crate::authz::AuthzClient;
use crate::identity::IdentityClient;

use super::config::BridgeConfig;
use super::error::HandlerError;

/// Shared state for the bridge handlers.
///
/// Both upstream clients share one pooled HTTP client with redirect
/// following disabled (upstream responses, including 3xx, are relayed to
/// the browser verbatim) and an explicit per-call timeout.
#[derive(Clone)]
pub struct AppState {
    pub(super) identity: Arc<IdentityClient>,
    pub(super) authz: Arc<AuthzClient>,
}

impl AppState {
    /// Build handler state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Config`] if the HTTP client cannot be
    /// constructed (TLS backend initialization).
    pub fn from_config(config: &BridgeConfig) -> Result<Self, HandlerError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| HandlerError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            identity: Arc::new(
                IdentityClient::new(config.identity_url.clone()).with_http_client(http.clone()),
            ),
            authz: Arc::new(AuthzClient::new(config.authz_url.clone()).with_http_client(http)),
        })
    }
}
