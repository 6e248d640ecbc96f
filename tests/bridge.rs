//! End-to-end handler tests against mocked upstream services.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use login_bridge::{router, AppState, BridgeConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as req_header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn bridge(identity: &MockServer, authz: &MockServer) -> Router {
    let config = BridgeConfig::new(
        identity.uri().parse().unwrap(),
        authz.uri().parse().unwrap(),
    );
    router(AppState::from_config(&config).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn into_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_body() -> Value {
    json!({
        "id": "sess-1",
        "identity": {"id": "user-1", "traits": {"email": "a@b.c"}},
    })
}

#[tokio::test]
async fn no_session_creates_exactly_one_login_flow() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    let flow_body = json!({"id": "flow-1", "oauth2_login_challenge": "abc"});
    Mock::given(method("GET"))
        .and(path("/self-service/login/browser"))
        .and(query_param("login_challenge", "abc"))
        .and(query_param("refresh", "false"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&flow_body)
                .insert_header("set-cookie", "csrf_token=t1; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&identity)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions/whoami"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/login/accept"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&authz)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get(
            "/api/kratos/self-service/login/browser?login_challenge=abc",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::SET_COOKIE).unwrap(),
        "csrf_token=t1; Path=/; HttpOnly"
    );
    assert_eq!(into_json(response).await, flow_body);
}

#[tokio::test]
async fn existing_session_accepts_login_without_new_flow() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/whoami"))
        .and(req_header("cookie", "ory_kratos_session=sess"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&identity)
        .await;
    Mock::given(method("GET"))
        .and(path("/self-service/login/browser"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;
    let accept_body = json!({"redirect_to": "https://authz/resume?challenge=abc"});
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/login/accept"))
        .and(query_param("login_challenge", "abc"))
        .and(body_json(json!({"subject": "user-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&accept_body))
        .expect(1)
        .mount(&authz)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get_with_cookie(
            "/api/kratos/self-service/login/browser?login_challenge=abc",
            "ory_kratos_session=sess",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(into_json(response).await, accept_body);
}

#[tokio::test]
async fn failed_session_lookup_is_a_502_and_creates_no_flow() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/whoami"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "no session"})))
        .expect(1)
        .mount(&identity)
        .await;
    Mock::given(method("GET"))
        .and(path("/self-service/login/browser"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get_with_cookie(
            "/api/kratos/self-service/login/browser?login_challenge=abc",
            "ory_kratos_session=stale",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        into_json(response).await,
        json!({"error": "upstream request failed"})
    );
}

#[tokio::test]
async fn malformed_refresh_defaults_to_false() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/self-service/login/browser"))
        .and(query_param("refresh", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "flow-2"})))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get(
            "/api/kratos/self-service/login/browser?refresh=banana&login_challenge=abc",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_update_relays_422_with_original_body() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    let validation_body = json!({
        "id": "flow-1",
        "ui": {"messages": [{"id": 4000006, "text": "wrong credentials"}]},
    });
    Mock::given(method("POST"))
        .and(path("/self-service/login"))
        .and(query_param("flow", "flow-1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(&validation_body))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/kratos/self-service/login?flow=flow-1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"method": "oidc", "provider": "github"}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(into_json(response).await, validation_body);
}

#[tokio::test]
async fn login_update_forwards_defaults_on_malformed_body() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/self-service/login"))
        .and(query_param("flow", "flow-1"))
        .and(body_json(json!({"method": "", "provider": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/kratos/self-service/login?flow=flow-1")
        .body(Body::from("this is not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_update_non_422_error_is_a_502() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/self-service/login"))
        .respond_with(ResponseTemplate::new(410).set_body_json(json!({"error": "flow expired"})))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/kratos/self-service/login?flow=flow-1")
        .body(Body::from(json!({"method": "oidc"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn consent_grants_exactly_the_requested_scope_and_audience() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/whoami"))
        .and(req_header("cookie", "ory_kratos_session=sess"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&identity)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/consent"))
        .and(query_param("consent_challenge", "xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "challenge": "xyz",
            "requested_scope": ["openid", "email"],
            "requested_access_token_audience": ["https://api.example.com"],
        })))
        .expect(1)
        .mount(&authz)
        .await;
    let accept_body = json!({"redirect_to": "https://authz/resume?challenge=xyz"});
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/consent/accept"))
        .and(query_param("consent_challenge", "xyz"))
        .and(body_json(json!({
            "grant_scope": ["openid", "email"],
            "grant_access_token_audience": ["https://api.example.com"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&accept_body))
        .expect(1)
        .mount(&authz)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get_with_cookie(
            "/api/consent?consent_challenge=xyz",
            "ory_kratos_session=sess",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(into_json(response).await, accept_body);
}

#[tokio::test]
async fn consent_fetch_failure_never_reaches_acceptance() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/whoami"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&identity)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/consent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .expect(1)
        .mount(&authz)
        .await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/consent/accept"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&authz)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get_with_cookie(
            "/api/consent?consent_challenge=xyz",
            "ory_kratos_session=sess",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn error_lookup_projects_to_external_shape() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/self-service/errors"))
        .and(query_param("id", "E1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "E1",
            "error": {"code": 500, "status": "Internal", "reason": "r", "message": "m"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        })))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get("/api/kratos/self-service/errors?id=E1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(
        into_json(response).await,
        json!({"id": "E1", "reason": "r", "message": "m"})
    );
}

#[tokio::test]
async fn unparseable_error_record_is_a_500_not_a_crash() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/self-service/errors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get("/api/kratos/self-service/errors?id=E1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(into_json(response).await, json!({"error": "internal error"}));
}

#[tokio::test]
async fn upstream_redirect_is_relayed_not_followed() {
    let identity = MockServer::start().await;
    let authz = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/self-service/login/browser"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://authz/resume"),
        )
        .expect(1)
        .mount(&identity)
        .await;

    let app = bridge(&identity, &authz).await;
    let response = app
        .oneshot(get(
            "/api/kratos/self-service/login/browser?login_challenge=abc",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://authz/resume"
    );
}
