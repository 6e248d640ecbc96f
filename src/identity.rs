use reqwest::header::{ACCEPT, COOKIE};
use url::Url;

use crate::error::Error;
use crate::types::{ErrorId, FlowId, NewLoginFlow, Session, UpdateLoginFlowBody};
use crate::upstream::UpstreamResponse;

/// Typed client for the Identity Service's self-service REST API.
///
/// Pure I/O adapter: builds requests, forwards cookies verbatim, and hands
/// back buffered responses. All flow policy lives in the handlers.
pub struct IdentityClient {
    base: Url,
    http: reqwest::Client,
}

impl IdentityClient {
    /// Create a client for the given Identity Service base URL.
    #[must_use]
    pub fn new(mut base: Url) -> Self {
        // Url::join drops the last path segment of a non-directory base.
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

    /// Resolve the session behind the browser's cookies (whoami).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Upstream`] on
    /// any non-2xx status (no session, expired session), or
    /// [`Error::Decode`] if the body is not a session record.
    pub async fn to_session(&self, cookie: Option<&str>) -> Result<Session, Error> {
        let mut request = self
            .http
            .get(self.endpoint("sessions/whoami"))
            .header(ACCEPT, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = UpstreamResponse::read(request.send().await?).await?;
        response.ensure_success("session lookup")?.json("session lookup")
    }

    /// Create a browser login flow, correlating it to a pending login
    /// challenge when one is present.
    ///
    /// Returns the raw response for relaying; the caller decides how to
    /// treat non-2xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn create_login_flow(
        &self,
        flow: &NewLoginFlow,
        cookie: Option<&str>,
    ) -> Result<UpstreamResponse, Error> {
        let mut url = self.endpoint("self-service/login/browser");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("refresh", if flow.refresh { "true" } else { "false" });
            if let Some(aal) = &flow.aal {
                pairs.append_pair("aal", aal);
            }
            if let Some(return_to) = &flow.return_to {
                pairs.append_pair("return_to", return_to);
            }
            if let Some(challenge) = &flow.login_challenge {
                pairs.append_pair("login_challenge", &challenge.0);
            }
        }

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        UpstreamResponse::read(request.send().await?).await
    }

    /// Submit one authentication-method payload to advance a login flow.
    ///
    /// Returns the raw response for relaying. A 422 here is expected
    /// in-flow validation state, which is why no status check happens at
    /// this layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn update_login_flow(
        &self,
        flow: &FlowId,
        body: &UpdateLoginFlowBody,
        cookie: Option<&str>,
    ) -> Result<UpstreamResponse, Error> {
        let mut url = self.endpoint("self-service/login");
        url.query_pairs_mut().append_pair("flow", &flow.0);

        let mut request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        UpstreamResponse::read(request.send().await?).await
    }

    /// Fetch a self-service error record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn get_flow_error(&self, id: &ErrorId) -> Result<UpstreamResponse, Error> {
        let mut url = self.endpoint("self-service/errors");
        url.query_pairs_mut().append_pair("id", &id.0);

        let request = self.http.get(url).header(ACCEPT, "application/json");
        UpstreamResponse::read(request.send().await?).await
    }
}
