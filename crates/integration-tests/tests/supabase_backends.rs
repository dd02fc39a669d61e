//! Integration tests for the Supabase HTTP backends.
//!
//! Each test points a `SupabaseClient` at a local stub server and checks the
//! request it sends and how the response status maps onto the result.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use cyberguard_client::{
    AdminEntry, AuthError, FunctionInvoker, IdentityService, InvocationError, Session,
    StorageError, TableStore,
};
use cyberguard_core::{ScanRecord, ScanRequest, ScanResult, ScanType, User, UserId};
use cyberguard_integration_tests::http::{ANON_KEY, RecordedRequest, StubServer};

fn session() -> Session {
    Session::new(
        SecretString::from("user-token"),
        User::new("u1", "user@example.com"),
        None,
    )
}

async fn stub(path: &str, status: u16, body: &str) -> StubServer {
    StubServer::single(path, status, body)
        .await
        .expect("bind stub server")
}

fn only_request(server: &StubServer) -> RecordedRequest {
    let mut requests = server.requests();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

fn assert_user_auth(request: &RecordedRequest) {
    assert_eq!(request.header("apikey"), Some(ANON_KEY));
    assert_eq!(request.header("authorization"), Some("Bearer user-token"));
}

// =============================================================================
// Table store
// =============================================================================

#[tokio::test]
async fn test_find_admin_requests_single_row() {
    let server = stub("/rest/v1/admins", 200, r#"{"id":"u1"}"#).await;
    let client = server.client().expect("client");

    let entry = client
        .find_admin(&session(), &UserId::new("u1"))
        .await
        .expect("lookup");

    assert_eq!(
        entry,
        Some(AdminEntry {
            id: UserId::new("u1")
        })
    );

    let request = only_request(&server);
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/rest/v1/admins");
    assert_eq!(request.query.as_deref(), Some("select=id&id=eq.u1"));
    assert_eq!(
        request.header("accept"),
        Some("application/vnd.pgrst.object+json")
    );
    assert_user_auth(&request);
}

#[tokio::test]
async fn test_find_admin_not_exactly_one_row_is_none() {
    let body = r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#;
    let server = stub("/rest/v1/admins", 406, body).await;
    let client = server.client().expect("client");

    let entry = client
        .find_admin(&session(), &UserId::new("u1"))
        .await
        .expect("lookup");

    assert_eq!(entry, None);
}

#[tokio::test]
async fn test_find_admin_server_error_is_reported() {
    let server = stub("/rest/v1/admins", 500, r#"{"message":"database offline"}"#).await;
    let client = server.client().expect("client");

    let err = client
        .find_admin(&session(), &UserId::new("u1"))
        .await
        .expect_err("server error");

    match err {
        StorageError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_insert_scan_posts_minimal_row() {
    let server = stub("/rest/v1/scans", 201, "").await;
    let client = server.client().expect("client");

    let request = ScanRequest::new(ScanType::Email, "a@b.com");
    let result = ScanResult {
        classification: "phishing".to_string(),
        confidence_score: 0.88,
        risk_level: "high".to_string(),
        analysis_details: json!({"spoofed_sender": true}),
    };
    let record = ScanRecord::new(UserId::new("u1"), &request, &result);

    client
        .insert_scan(&session(), &record)
        .await
        .expect("insert");

    let sent = only_request(&server);
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.path, "/rest/v1/scans");
    assert_eq!(sent.header("prefer"), Some("return=minimal"));
    assert_user_auth(&sent);
    assert_eq!(
        sent.json(),
        json!({
            "user_id": "u1",
            "scan_type": "email",
            "input_value": "a@b.com",
            "classification": "phishing",
            "confidence_score": 0.88,
            "risk_level": "high",
            "analysis_details": {"spoofed_sender": true}
        })
    );
}

#[tokio::test]
async fn test_insert_scan_rejection_is_reported() {
    let body = r#"{"message":"new row violates row-level security policy"}"#;
    let server = stub("/rest/v1/scans", 403, body).await;
    let client = server.client().expect("client");

    let request = ScanRequest::new(ScanType::Url, "http://example.com");
    let result = ScanResult {
        classification: "benign".to_string(),
        confidence_score: 0.97,
        risk_level: "low".to_string(),
        analysis_details: json!({}),
    };
    let record = ScanRecord::new(UserId::new("u1"), &request, &result);

    let err = client
        .insert_scan(&session(), &record)
        .await
        .expect_err("rejected");

    assert!(matches!(err, StorageError::Api { status: 403, .. }));
}

// =============================================================================
// Functions
// =============================================================================

#[tokio::test]
async fn test_invoke_posts_body_and_returns_json() {
    let reply = r#"{"classification":"benign","confidence_score":0.97,"risk_level":"low"}"#;
    let server = stub("/functions/v1/scan-url", 200, reply).await;
    let client = server.client().expect("client");

    let body = json!({"inputValue": "http://example.com", "fileData": null});
    let value = client
        .invoke(&session(), "scan-url", &body)
        .await
        .expect("invoke");

    assert_eq!(value["classification"], "benign");

    let request = only_request(&server);
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/functions/v1/scan-url");
    assert_eq!(request.json(), body);
    assert_user_auth(&request);
}

#[tokio::test]
async fn test_invoke_failure_carries_remote_message() {
    let server = stub("/functions/v1/scan-url", 429, r#"{"error":"Too many requests"}"#).await;
    let client = server.client().expect("client");

    let err = client
        .invoke(&session(), "scan-url", &json!({}))
        .await
        .expect_err("rate limited");

    assert_eq!(err.remote_message(), Some("Too many requests"));
    assert!(matches!(err, InvocationError::Http { status: 429, .. }));
}

#[tokio::test]
async fn test_invoke_failure_without_json_has_no_message() {
    let server = stub("/functions/v1/scan-url", 502, "Bad Gateway").await;
    let client = server.client().expect("client");

    let err = client
        .invoke(&session(), "scan-url", &json!({}))
        .await
        .expect_err("bad gateway");

    assert!(matches!(
        err,
        InvocationError::Http {
            status: 502,
            message: None
        }
    ));
}

#[tokio::test]
async fn test_invoke_non_json_success_is_a_response_error() {
    let server = stub("/functions/v1/scan-url", 200, "not json").await;
    let client = server.client().expect("client");

    let err = client
        .invoke(&session(), "scan-url", &json!({}))
        .await
        .expect_err("not json");

    assert!(matches!(err, InvocationError::Response(_)));
}

// =============================================================================
// Identity
// =============================================================================

const SESSION_BODY: &str = r#"{
    "access_token": "fresh-token",
    "token_type": "bearer",
    "expires_in": 3600,
    "user": {"id": "u1", "email": "user@example.com", "user_metadata": {"full_name": "Ada"}}
}"#;

#[tokio::test]
async fn test_sign_in_uses_password_grant() {
    let server = stub("/auth/v1/token", 200, SESSION_BODY).await;
    let client = server.client().expect("client");

    let session = client
        .sign_in_with_password("user@example.com", &SecretString::from("hunter22"))
        .await
        .expect("sign in");

    assert_eq!(session.access_token().expose_secret(), "fresh-token");
    assert_eq!(session.user.full_name.as_deref(), Some("Ada"));
    assert!(session.expires_at.is_some());

    let request = only_request(&server);
    assert_eq!(request.method, "POST");
    assert_eq!(request.query.as_deref(), Some("grant_type=password"));
    assert_eq!(request.header("apikey"), Some(ANON_KEY));
    assert_eq!(
        request.json(),
        json!({"email": "user@example.com", "password": "hunter22"})
    );
}

#[tokio::test]
async fn test_sign_in_invalid_credentials() {
    let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
    let server = stub("/auth/v1/token", 400, body).await;
    let client = server.client().expect("client");

    let err = client
        .sign_in_with_password("user@example.com", &SecretString::from("wrong"))
        .await
        .expect_err("invalid");

    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_sign_up_pending_confirmation() {
    let body = r#"{"id":"u9","email":"new@example.com","confirmation_sent_at":"2026-01-01T00:00:00Z"}"#;
    let server = stub("/auth/v1/signup", 200, body).await;
    let client = server.client().expect("client");

    let err = client
        .sign_up("new@example.com", &SecretString::from("pw"), "New User")
        .await
        .expect_err("pending");

    match err {
        AuthError::ConfirmationPending { email } => assert_eq!(email, "new@example.com"),
        other => panic!("unexpected error: {other:?}"),
    }

    let request = only_request(&server);
    assert_eq!(request.json()["data"]["full_name"], "New User");
}

#[tokio::test]
async fn test_get_user_returns_profile() {
    let body = r#"{"id":"u1","email":"user@example.com","user_metadata":{"full_name":"Ada"}}"#;
    let server = stub("/auth/v1/user", 200, body).await;
    let client = server.client().expect("client");

    let user = client
        .get_user(&session())
        .await
        .expect("get user")
        .expect("user");

    assert_eq!(user.id.as_str(), "u1");
    assert_eq!(user.full_name.as_deref(), Some("Ada"));

    let request = only_request(&server);
    assert_eq!(request.method, "GET");
    assert_user_auth(&request);
}

#[tokio::test]
async fn test_get_user_rejected_token_is_none() {
    for status in [401, 403] {
        let server = stub("/auth/v1/user", status, r#"{"msg":"invalid JWT"}"#).await;
        let client = server.client().expect("client");

        let user = client.get_user(&session()).await.expect("get user");

        assert_eq!(user, None, "status {status}");
    }
}

#[tokio::test]
async fn test_get_user_server_error_is_reported() {
    let server = stub("/auth/v1/user", 500, r#"{"msg":"internal error"}"#).await;
    let client = server.client().expect("client");

    let err = client.get_user(&session()).await.expect_err("server error");

    assert!(matches!(err, AuthError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_sign_out_treats_invalid_token_as_signed_out() {
    for status in [204, 401, 404] {
        let server = stub("/auth/v1/logout", status, "").await;
        let client = server.client().expect("client");

        client
            .sign_out(&session())
            .await
            .unwrap_or_else(|e| panic!("status {status}: {e}"));

        let request = only_request(&server);
        assert_eq!(request.method, "POST");
        assert_user_auth(&request);
    }
}

#[tokio::test]
async fn test_sign_out_server_error_is_reported() {
    let server = stub("/auth/v1/logout", 500, "").await;
    let client = server.client().expect("client");

    let err = client.sign_out(&session()).await.expect_err("server error");

    assert!(matches!(err, AuthError::Api { status: 500, .. }));
}
