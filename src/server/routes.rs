use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Response, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{any, get};
use axum::Router;
use serde::Deserialize;

use crate::types::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentChallenge, ErrorId, ExternalError, FlowId,
    LoginChallenge, NewLoginFlow, SelfServiceError, UpdateLoginFlowBody,
};

use super::assets;
use super::cookies;
use super::error::HandlerError;
use super::relay;
use super::state::AppState;

/// Build the bridge router: the four flow-orchestration endpoints plus the
/// embedded UI fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/kratos/self-service/login/browser",
            get(initiate_login),
        )
        .route("/api/kratos/self-service/login", any(update_login))
        .route("/api/kratos/self-service/errors", get(lookup_error))
        .route("/api/consent", get(accept_consent))
        .fallback(assets::serve)
        .with_state(state)
}

// ── Login initiation ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct InitiateLoginParams {
    refresh: Option<String>,
    aal: Option<String>,
    return_to: Option<String>,
    login_challenge: Option<String>,
}

/// Either short-circuit a pending login challenge via the existing session,
/// or create a fresh login flow for the UI to render.
async fn initiate_login(
    State(state): State<AppState>,
    Query(params): Query<InitiateLoginParams>,
    headers: HeaderMap,
) -> Result<Response<Body>, HandlerError> {
    let cookie = cookies::forward_cookies(&headers);

    if cookies::has_session_cookie(&headers) {
        // Resolve the session first: with a live session the flow-creation
        // endpoint answers with an empty response instead of a new flow.
        let session = state.identity.to_session(cookie.as_deref()).await?;

        let challenge = LoginChallenge::from(params.login_challenge.unwrap_or_default());
        let accept = AcceptLoginRequest::new(session.identity.id);
        let response = state
            .authz
            .accept_login(&challenge, &accept)
            .await?
            .ensure_success("login acceptance")?;

        tracing::debug!(challenge = %challenge, "accepted login challenge from existing session");
        return Ok(relay::relay(response));
    }

    // Absent or malformed refresh means no forced re-authentication.
    let refresh = params
        .refresh
        .as_deref()
        .and_then(|raw| raw.parse::<bool>().ok())
        .unwrap_or(false);

    let flow = NewLoginFlow {
        refresh,
        aal: params.aal,
        return_to: params.return_to,
        login_challenge: params.login_challenge.map(LoginChallenge::from),
    };
    let response = state
        .identity
        .create_login_flow(&flow, cookie.as_deref())
        .await?;

    // Redirect following is disabled on the shared client, so a 3xx from
    // flow creation is a real outcome the browser must see.
    if response.is_success() || response.status.is_redirection() {
        Ok(relay::relay(response))
    } else {
        Err(response.into_error("login flow creation").into())
    }
}

// ── Login update ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UpdateLoginParams {
    flow: Option<String>,
}

/// Forward one authentication-method submission to the Identity Service.
///
/// A 422 from upstream is in-flow validation feedback the UI renders, so it
/// is relayed like a success; every other error status aborts.
async fn update_login(
    State(state): State<AppState>,
    Query(params): Query<UpdateLoginParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response<Body>, HandlerError> {
    let submission: UpdateLoginFlowBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Deliberately permissive: the zero-valued submission still goes
            // upstream, which answers with field-level validation errors.
            tracing::warn!(error = %e, "malformed login submission, forwarding defaults");
            UpdateLoginFlowBody::default()
        }
    };

    let flow = FlowId::from(params.flow.unwrap_or_default());
    let cookie = cookies::forward_cookies(&headers);
    let response = state
        .identity
        .update_login_flow(&flow, &submission, cookie.as_deref())
        .await?;

    if response.is_success() || response.status == StatusCode::UNPROCESSABLE_ENTITY {
        Ok(relay::relay(response))
    } else {
        Err(response.into_error("login flow update").into())
    }
}

// ── Error lookup ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorParams {
    id: Option<String>,
}

/// Fetch a self-service error record and project it to the external shape,
/// keeping the upstream status and headers but never the internal fields.
async fn lookup_error(
    State(state): State<AppState>,
    Query(params): Query<ErrorParams>,
) -> Result<Response<Body>, HandlerError> {
    let id = ErrorId::from(params.id.unwrap_or_default());
    let response = state
        .identity
        .get_flow_error(&id)
        .await?
        .ensure_success("error lookup")?;

    // An uninterpretable body here is an operator-facing integration fault,
    // not something the browser can act on.
    let record: SelfServiceError =
        response
            .json("error lookup")
            .map_err(|e| HandlerError::Integration {
                operation: "error lookup",
                detail: e.to_string(),
            })?;
    let external = ExternalError::from(record);
    let body = serde_json::to_vec(&external).map_err(|e| HandlerError::Integration {
        operation: "error lookup",
        detail: e.to_string(),
    })?;

    let mut headers = relay::relay_headers(&response.headers);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    // Same ordering as the relay: headers, then status, then body.
    let mut out = Response::new(Body::empty());
    *out.headers_mut() = headers;
    *out.status_mut() = response.status;
    *out.body_mut() = Body::from(body);
    Ok(out)
}

// ── Consent ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ConsentParams {
    consent_challenge: Option<String>,
}

/// Accept a pending consent request with the full requested grant once the
/// browser proves it holds a valid session.
///
/// Consent is granted iff the session check and both upstream calls
/// succeed; there is no partial-grant path.
async fn accept_consent(
    State(state): State<AppState>,
    Query(params): Query<ConsentParams>,
    headers: HeaderMap,
) -> Result<Response<Body>, HandlerError> {
    let cookie = cookies::forward_cookies(&headers);
    let session = state.identity.to_session(cookie.as_deref()).await?;
    tracing::debug!(
        identity = %session.identity.id,
        traits = ?session.identity.traits,
        "resolved session for consent"
    );

    let challenge = ConsentChallenge::from(params.consent_challenge.unwrap_or_default());
    let consent = state.authz.get_consent_request(&challenge).await?;

    let accept = AcceptConsentRequest::full_grant(&consent);
    let accepted = state.authz.accept_consent(&challenge, &accept).await?;

    tracing::info!(challenge = %challenge, "consent granted");
    Ok((StatusCode::OK, Json(accepted)).into_response())
}
