use axum::body::Body;
use axum::http::header::{CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, Response};

use crate::upstream::UpstreamResponse;

// The HTTP client already decoded the body, so transport-negotiated headers
// no longer describe what is being written out.
const STRIPPED: [HeaderName; 4] = [
    CONNECTION,
    TRANSFER_ENCODING,
    CONTENT_LENGTH,
    CONTENT_ENCODING,
];

/// Copy an upstream response verbatim onto the outbound response.
///
/// Headers are set first, then the status code, then the body. Response
/// writers lock in headers once the status line goes out, so this ordering
/// must hold for every relayed response.
pub(super) fn relay(upstream: UpstreamResponse) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.headers_mut() = relay_headers(&upstream.headers);
    *response.status_mut() = upstream.status;
    *response.body_mut() = Body::from(upstream.body);
    response
}

/// Copy every upstream header, preserving multi-valued headers
/// (`Set-Cookie` in particular) value for value.
pub(super) fn relay_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if STRIPPED.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
