//! Smoke tests for the HTTP handlers.
//!
//! Each handler group gets at least one test verifying that valid requests
//! succeed against a fresh store and that the auth middleware rejects
//! unauthenticated or under-privileged access.
//!
//! Run with: `cargo test --test handler_tests`

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use riise_backend::auth::{self, IdentityGate, Role};
use riise_backend::config::ServerConfig;
use riise_backend::handlers::{build_protected_routes, build_public_routes, PortalState};
use riise_backend::store::RecordStore;

// ═══════════════════════════════════════════════════════════════════════
// Test infrastructure
// ═══════════════════════════════════════════════════════════════════════

const ADMIN_TOKEN: &str = "test-admin-token";
const USER_TOKEN: &str = "test-user-token";

const ADMIN_EMAIL: &str = "dean@riise.edu";
const USER_EMAIL: &str = "asha@riise.edu";

/// Self-contained harness: in-memory store, static identity gate, and the
/// same router wiring as main.rs.
struct Harness {
    state: Arc<PortalState>,
    user_id: i64,
}

impl Harness {
    fn new() -> Self {
        let store = RecordStore::open_in_memory().expect("open in-memory store");
        let user_id;
        {
            let session = store.session();
            session
                .insert_user("Dean Verma", ADMIN_EMAIL, Role::Admin)
                .expect("seed admin");
            user_id = session
                .insert_user("Asha Rao", USER_EMAIL, Role::User)
                .expect("seed user");
        }

        let gate = IdentityGate::fixed([
            (ADMIN_TOKEN.to_string(), ADMIN_EMAIL.to_string()),
            (USER_TOKEN.to_string(), USER_EMAIL.to_string()),
        ]);

        let state = Arc::new(PortalState::with_parts(
            store,
            gate,
            ServerConfig::default(),
        ));
        Self { state, user_id }
    }

    fn app(&self) -> Router {
        // Mirror main.rs: auth middleware only wraps protected routes.
        let public = build_public_routes(self.state.clone());
        let protected = build_protected_routes(self.state.clone()).layer(
            axum::middleware::from_fn_with_state(self.state.clone(), auth::auth_middleware),
        );
        Router::new().merge(public).merge(protected)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let response = self.app().oneshot(request).await.expect("send request");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes()
            .to_vec();
        (status, body, headers)
    }
}

// ── request helpers ──

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn authed_json(method: Method, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

// ═══════════════════════════════════════════════════════════════════════
// Public routes
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn health_is_public() {
    let harness = Harness::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = harness.send(request).await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users_count"], 2);
}

#[tokio::test]
async fn signup_creates_account_and_rejects_duplicates() {
    let harness = Harness::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/signup")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Ravi Iyer", "email": "ravi@riise.edu"}).to_string(),
        ))
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json_body(&body)["user_id"].as_i64().unwrap() > 0);

    // Same email again conflicts.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/signup")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Ravi Again", "email": "ravi@riise.edu"}).to_string(),
        ))
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json_body(&body)["code"], "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn signup_rejects_bad_email() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/signup")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "No Email", "email": "not-an-email"}).to_string(),
        ))
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["code"], "INVALID_INPUT");
}

// ═══════════════════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn protected_routes_require_credential() {
    let harness = Harness::new();

    let request = Request::builder()
        .uri("/api/v1/ipr/")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["code"], "MISSING_CREDENTIAL");

    let (status, body, _) = harness
        .send(authed_get("/api/v1/ipr/", "bogus-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["code"], "INVALID_CREDENTIAL");
}

#[tokio::test]
async fn cookie_credential_is_accepted() {
    let harness = Harness::new();
    let request = Request::builder()
        .uri("/api/v1/users/me")
        .header("cookie", format!("access_token={USER_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["email"], USER_EMAIL);
}

#[tokio::test]
async fn me_returns_authenticated_profile() {
    let harness = Harness::new();
    let (status, body, _) = harness.send(authed_get("/api/v1/users/me", USER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["email"], USER_EMAIL);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let harness = Harness::new();

    let (status, _, _) = harness.send(authed_get("/api/v1/users", USER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body, _) = harness.send(authed_get("/api/v1/users", ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Contribution CRUD
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn ipr_crud_honors_role_rules() {
    let harness = Harness::new();

    // User files an IPR.
    let (status, body, _) = harness
        .send(authed_json(
            Method::POST,
            "/api/v1/ipr/add-ipr",
            USER_TOKEN,
            json!({
                "ipr_type": "Patent",
                "title": "Low-power irrigation valve",
                "filing_date": "2022-01-01",
                "status": "Filed"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let ipr_id = json_body(&body)["ipr_id"].as_i64().unwrap();

    // Owner sees it; admin sees it too (list-all).
    let (status, body, _) = harness.send(authed_get("/api/v1/ipr/", USER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().unwrap().len(), 1);

    let (status, body, _) = harness.send(authed_get("/api/v1/ipr/", ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().unwrap().len(), 1);

    // Owner updates a field.
    let (status, _, _) = harness
        .send(authed_json(
            Method::PUT,
            &format!("/api/v1/ipr/update-ipr/{ipr_id}"),
            USER_TOKEN,
            json!({"status": "Granted"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Deletion is admin-only.
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/ipr/delete-ipr/{ipr_id}"))
        .header("authorization", format!("Bearer {USER_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/ipr/delete-ipr/{ipr_id}"))
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);

    // Gone now.
    let (status, _, _) = harness
        .send(authed_json(
            Method::PUT,
            &format!("/api/v1/ipr/update-ipr/{ipr_id}"),
            ADMIN_TOKEN,
            json!({"status": "Granted"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_unknown_fields() {
    let harness = Harness::new();

    let (_, body, _) = harness
        .send(authed_json(
            Method::POST,
            "/api/v1/ipr/add-ipr",
            USER_TOKEN,
            json!({"ipr_type": "Patent", "title": "Valve"}),
        ))
        .await;
    let ipr_id = json_body(&body)["ipr_id"].as_i64().unwrap();

    let (status, _, _) = harness
        .send(authed_json(
            Method::PUT,
            &format!("/api/v1/ipr/update-ipr/{ipr_id}"),
            USER_TOKEN,
            json!({"user_id": 999}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn users_cannot_touch_other_users_records() {
    let harness = Harness::new();

    // Admin files a paper of their own.
    let (_, body, _) = harness
        .send(authed_json(
            Method::POST,
            "/api/v1/research/add-paper",
            ADMIN_TOKEN,
            json!({"title": "Department annual review"}),
        ))
        .await;
    let paper_id = json_body(&body)["paper_id"].as_i64().unwrap();

    // Regular user cannot update it...
    let (status, body, _) = harness
        .send(authed_json(
            Method::PUT,
            &format!("/api/v1/research/update-paper/{paper_id}"),
            USER_TOKEN,
            json!({"status": "Retracted"}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body)["code"], "FORBIDDEN");

    // ...and does not see it in their own listing.
    let (_, body, _) = harness.send(authed_get("/api/v1/research/", USER_TOKEN)).await;
    assert!(json_body(&body).as_array().unwrap().is_empty());
}

#[tokio::test]
async fn innovation_and_startup_smoke() {
    let harness = Harness::new();

    let (status, _, _) = harness
        .send(authed_json(
            Method::POST,
            "/api/v1/innovation/add-innovation",
            USER_TOKEN,
            json!({"title": "Sensor mesh", "domain": "IoT", "level": "institute"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = harness
        .send(authed_json(
            Method::POST,
            "/api/v1/startup/add-startup",
            USER_TOKEN,
            json!({"name": "AgroPulse", "industry": "AgriTech", "status": "Incubated"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = harness
        .send(authed_get("/api/v1/innovation/", USER_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().unwrap().len(), 1);

    let (status, body, _) = harness.send(authed_get("/api/v1/startup/", USER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Profile operations
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn profile_update_round_trip() {
    let harness = Harness::new();

    let (status, _, _) = harness
        .send(authed_json(
            Method::PUT,
            "/api/v1/users/update-profile",
            USER_TOKEN,
            json!({"name": "Asha R. Rao", "scholar_id": "SCH123"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body, _) = harness.send(authed_get("/api/v1/users/me", USER_TOKEN)).await;
    let body = json_body(&body);
    assert_eq!(body["name"], "Asha R. Rao");
    assert_eq!(body["scholar_id"], "SCH123");
}

#[tokio::test]
async fn scholar_refresh_requires_scholar_id() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/refresh-scholar-metrics")
        .header("authorization", format!("Bearer {USER_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["code"], "INVALID_INPUT");
}

// ═══════════════════════════════════════════════════════════════════════
// PDF exports
// ═══════════════════════════════════════════════════════════════════════

fn assert_pdf(body: &[u8], headers: &axum::http::HeaderMap, filename: &str) {
    assert_eq!(
        headers.get("content-type").unwrap().to_str().unwrap(),
        "application/pdf"
    );
    assert!(headers
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains(filename));
    assert!(body.starts_with(b"%PDF"), "body must be a complete PDF");
    assert!(body.len() > 500);
}

#[tokio::test]
async fn export_self_returns_complete_pdf() {
    let harness = Harness::new();

    // Give the user some records first.
    {
        let session = harness.state.store.session();
        session
            .insert_ipr(
                harness.user_id,
                &riise_backend::store::ipr::NewIpr {
                    ipr_type: "Patent".to_string(),
                    title: "Low-power irrigation valve".to_string(),
                    ipr_number: None,
                    filing_date: riise_backend::chrono::NaiveDate::from_ymd_opt(2022, 1, 1),
                    status: Some("Filed".to_string()),
                    related_startup_id: None,
                },
            )
            .unwrap();
    }

    let (status, body, headers) = harness
        .send(authed_get("/api/v1/export/user", USER_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_pdf(&body, &headers, "my_progress_report.pdf");
}

#[tokio::test]
async fn admin_exports_require_admin_role() {
    let harness = Harness::new();

    let (status, body, _) = harness
        .send(authed_get("/api/v1/export/admin/all", USER_TOKEN))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body)["code"], "FORBIDDEN");

    let (status, _, _) = harness
        .send(authed_get(
            &format!("/api/v1/export/admin/user/{USER_EMAIL}"),
            USER_TOKEN,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_export_of_unknown_email_is_not_found() {
    let harness = Harness::new();
    let (status, body, _) = harness
        .send(authed_get(
            "/api/v1/export/admin/user/nonexistent@x.com",
            ADMIN_TOKEN,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn admin_export_of_user_and_fleet_succeed() {
    let harness = Harness::new();

    let (status, body, headers) = harness
        .send(authed_get(
            &format!("/api/v1/export/admin/user/{USER_EMAIL}"),
            ADMIN_TOKEN,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_pdf(&body, &headers, "user_report_Asha_Rao.pdf");

    let (status, body, headers) = harness
        .send(authed_get("/api/v1/export/admin/all", ADMIN_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_pdf(&body, &headers, "all_users_report.pdf");
}
