use reqwest::header::ACCEPT;
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::Error;
use crate::types::{AcceptConsentRequest, AcceptLoginRequest, ConsentChallenge, ConsentRequest, LoginChallenge};
use crate::upstream::UpstreamResponse;

/// Typed client for the Authorization Service's admin REST API.
///
/// Covers the three challenge operations the bridge needs: accepting a
/// login challenge, reading a pending consent request, and accepting it.
pub struct AuthzClient {
    base: Url,
    http: reqwest::Client,
}

impl AuthzClient {
    /// Create a client for the given Authorization Service admin base URL.
    #[must_use]
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base.join(path).expect("valid endpoint path")
    }

    /// Accept a pending login challenge on behalf of a resolved subject.
    ///
    /// Returns the raw response for relaying (it carries the redirect the
    /// browser must follow to resume the authorization-code handshake).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn accept_login(
        &self,
        challenge: &LoginChallenge,
        accept: &AcceptLoginRequest,
    ) -> Result<UpstreamResponse, Error> {
        let mut url = self.endpoint("oauth2/auth/requests/login/accept");
        url.query_pairs_mut()
            .append_pair("login_challenge", &challenge.0);

        let request = self
            .http
            .put(url)
            .header(ACCEPT, "application/json")
            .json(accept);
        UpstreamResponse::read(request.send().await?).await
    }

    /// Fetch the consent request behind a pending consent challenge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Upstream`] on
    /// a non-2xx status, or [`Error::Decode`] on an unparseable body.
    pub async fn get_consent_request(
        &self,
        challenge: &ConsentChallenge,
    ) -> Result<ConsentRequest, Error> {
        let mut url = self.endpoint("oauth2/auth/requests/consent");
        url.query_pairs_mut()
            .append_pair("consent_challenge", &challenge.0);

        let request = self.http.get(url).header(ACCEPT, "application/json");
        let response = UpstreamResponse::read(request.send().await?).await?;
        response
            .ensure_success("consent request lookup")?
            .json("consent request lookup")
    }

    /// Accept a consent request with a computed grant.
    ///
    /// Returns the acceptance body (it carries the resume redirect) as an
    /// opaque JSON value written back to the browser unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Upstream`] on
    /// a non-2xx status, or [`Error::Decode`] on an unparseable body.
    pub async fn accept_consent(
        &self,
        challenge: &ConsentChallenge,
        accept: &AcceptConsentRequest,
    ) -> Result<JsonValue, Error> {
        let mut url = self.endpoint("oauth2/auth/requests/consent/accept");
        url.query_pairs_mut()
            .append_pair("consent_challenge", &challenge.0);

        let request = self
            .http
            .put(url)
            .header(ACCEPT, "application/json")
            .json(accept);
        let response = UpstreamResponse::read(request.send().await?).await?;
        response
            .ensure_success("consent acceptance")?
            .json("consent acceptance")
    }
}
