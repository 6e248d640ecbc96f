use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Cookie name the Identity Service issues for browser sessions.
pub(super) const SESSION_COOKIE: &str = "ory_kratos_session";

/// Serialize the browser's cookies as `name=value; name=value` in original
/// order, the wire format the Identity Service's cookie parser expects.
pub(super) fn forward_cookies(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = cookie_pairs(headers).collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Whether the browser presented a session cookie at all. Only its
/// presence is checked here; validity is the Identity Service's call.
pub(super) fn has_session_cookie(headers: &HeaderMap) -> bool {
    cookie_pairs(headers).any(|pair| {
        pair.split_once('=')
            .is_some_and(|(name, _)| name == SESSION_COOKIE)
    })
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
}
