use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Login challenge minted by the Authorization Service.
///
/// Opaque: the bridge never generates or inspects one, it only forwards it
/// to whichever upstream call requires it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct LoginChallenge(pub String);

/// Consent challenge minted by the Authorization Service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct ConsentChallenge(pub String);

/// Login Flow identifier owned by the Identity Service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct FlowId(pub String);

/// Self-service error record identifier owned by the Identity Service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct ErrorId(pub String);

/// Authenticated browser session as reported by the Identity Service's
/// whoami endpoint. Read-only here; the Identity Service owns its lifetime.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Session {
    #[serde(default)]
    pub id: Option<String>,
    pub identity: Identity,
}

/// The identity behind a session.
///
/// `traits` is schema-less by design: its shape is defined by the Identity
/// Service's identity schema and the bridge never interprets individual
/// fields (they are only logged).
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub traits: serde_json::Map<String, JsonValue>,
}

/// Parameters for creating a browser login flow on the Identity Service.
#[derive(Debug, Clone, Default)]
pub struct NewLoginFlow {
    pub refresh: bool,
    pub aal: Option<String>,
    pub return_to: Option<String>,
    pub login_challenge: Option<LoginChallenge>,
}

/// One authentication-method submission advancing a login flow.
///
/// Every field is defaulted so a malformed request body degrades to a
/// zero-valued submission that is still forwarded upstream (the Identity
/// Service answers with field-level validation errors, which the UI renders).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoginFlowBody {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_parameters: Option<JsonValue>,
}

/// Payload accepting a login challenge on behalf of a resolved session.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptLoginRequest {
    pub subject: String,
}

impl AcceptLoginRequest {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Pending consent request as recorded by the Authorization Service.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct ConsentRequest {
    #[serde(default)]
    pub challenge: Option<ConsentChallenge>,
    #[serde(default)]
    pub requested_scope: Vec<String>,
    #[serde(default)]
    pub requested_access_token_audience: Vec<String>,
}

/// Payload accepting a consent request.
///
/// Only constructible via [`full_grant`](Self::full_grant): the bridge never
/// narrows a requested grant.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptConsentRequest {
    pub grant_scope: Vec<String>,
    pub grant_access_token_audience: Vec<String>,
}

impl AcceptConsentRequest {
    /// Grant exactly what the client application requested.
    #[must_use]
    pub fn full_grant(consent: &ConsentRequest) -> Self {
        Self {
            grant_scope: consent.requested_scope.clone(),
            grant_access_token_audience: consent.requested_access_token_audience.clone(),
        }
    }
}

/// Self-service error record fetched from the Identity Service.
///
/// Internal fields (numeric code, status string, timestamps) must never
/// reach the browser; see [`ExternalError`].
#[derive(Debug, Clone, Deserialize)]
pub struct SelfServiceError {
    pub id: ErrorId,
    pub error: ErrorDetail,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<time::OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<time::OffsetDateTime>,
}

/// Nested error detail inside a [`SelfServiceError`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

/// Browser-facing projection of a [`SelfServiceError`].
///
/// Strict subset: every field is derived from the upstream record, and the
/// upstream's code/status/timestamps are discarded, never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalError {
    pub id: ErrorId,
    pub reason: String,
    pub message: String,
}

impl From<SelfServiceError> for ExternalError {
    fn from(err: SelfServiceError) -> Self {
        Self {
            id: err.id,
            reason: err.error.reason,
            message: err.error.message,
        }
    }
}
