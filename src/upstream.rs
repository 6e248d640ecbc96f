use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// A fully buffered upstream HTTP response.
///
/// Transport failures become [`Error::Http`]; an HTTP error status is data,
/// not an error — the orchestration handlers decide what each status means
/// (relay it, treat it as a soft failure, or accept 422 as in-flow state).
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Buffer a reqwest response into status + headers + body.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into an [`Error::Upstream`] carrying the
    /// status and body for logging.
    pub fn ensure_success(self, operation: &'static str) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        Err(self.into_error(operation))
    }

    /// Build the [`Error::Upstream`] this response represents.
    #[must_use]
    pub fn into_error(self, operation: &'static str) -> Error {
        Error::Upstream {
            operation,
            status: self.status.as_u16(),
            detail: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self, operation: &'static str) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|source| Error::Decode { operation, source })
    }
}
