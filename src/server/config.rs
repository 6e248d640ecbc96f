use std::time::Duration;

use url::Url;

use super::error::HandlerError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Bridge configuration.
///
/// Required fields (the two upstream base URLs) are constructor parameters.
/// Use [`from_env()`](BridgeConfig::from_env) for convention-based setup,
/// or [`new()`](BridgeConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub(crate) identity_url: Url,
    pub(crate) authz_url: Url,
    pub(crate) port: u16,
    pub(crate) upstream_timeout: Duration,
}

impl BridgeConfig {
    /// Create config with the two required upstream base URLs.
    #[must_use]
    pub fn new(identity_url: Url, authz_url: Url) -> Self {
        Self {
            identity_url,
            authz_url,
            port: DEFAULT_PORT,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `IDENTITY_SERVICE_URL`: Identity Service base URL
    /// - `AUTHZ_SERVICE_URL`: Authorization Service admin base URL
    ///
    /// # Optional env vars
    /// - `PORT`: listen port (default 8080)
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Config`] if required vars are missing or
    /// values do not parse.
    pub fn from_env() -> Result<Self, HandlerError> {
        let identity_url = required_url("IDENTITY_SERVICE_URL")?;
        let authz_url = required_url("AUTHZ_SERVICE_URL")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| HandlerError::Config(format!("PORT: {e}")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self::new(identity_url, authz_url).with_port(port))
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Identity Service base URL.
    #[must_use]
    pub fn identity_url(&self) -> &Url {
        &self.identity_url
    }

    /// Authorization Service admin base URL.
    #[must_use]
    pub fn authz_url(&self) -> &Url {
        &self.authz_url
    }

    /// Listen port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Per-call timeout applied to every upstream request.
    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }
}

fn required_url(name: &'static str) -> Result<Url, HandlerError> {
    let raw = std::env::var(name).map_err(|_| HandlerError::Config(format!("{name} is required")))?;
    raw.parse()
        .map_err(|e| HandlerError::Config(format!("{name}: {e}")))
}
