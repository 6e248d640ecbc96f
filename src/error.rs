#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed with status {status}: {detail}")]
    Upstream {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{operation} returned an undecodable body: {source}")]
    Decode {
        operation: &'static str,
        source: serde_json::Error,
    },
}
