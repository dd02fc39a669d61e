//! Integration tests for scan submission.
//!
//! These tests verify the order of remote calls, what gets persisted for the
//! scanning user, and how remote failures surface to callers.

use std::sync::atomic::Ordering;

use serde_json::{Value, json};

use cyberguard_client::{InvocationError, ScanError};
use cyberguard_core::{FileData, ScanType, User};
use cyberguard_integration_tests::{FakeFunctions, FakeIdentity, FakeTables, TestContext};

fn benign() -> Value {
    json!({
        "classification": "benign",
        "confidence_score": 0.97,
        "risk_level": "low",
        "analysis_details": {"domain_age_days": 4200, "redirects": 0}
    })
}

async fn signed_in(reply: Value) -> TestContext {
    let ctx = TestContext::standard(reply);
    ctx.sign_in("user@example.com").await.expect("sign in");
    ctx
}

// =============================================================================
// Successful scans
// =============================================================================

#[tokio::test]
async fn test_successful_scan_is_recorded_for_user() {
    let ctx = signed_in(benign()).await;

    let result = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect("scan");

    assert_eq!(result.classification, "benign");
    assert!((result.confidence_score - 0.97).abs() < f64::EPSILON);
    assert_eq!(result.risk_level, "low");
    assert_eq!(result.analysis_details["domain_age_days"], 4200);

    let scans = ctx.tables.scans();
    assert_eq!(scans.len(), 1);
    let record = &scans[0];
    assert_eq!(record.user_id.as_str(), "u1");
    assert_eq!(record.scan_type, ScanType::Url);
    assert_eq!(record.input_value, "http://example.com");
    assert_eq!(record.classification, "benign");
    assert_eq!(record.risk_level, "low");
    assert_eq!(record.analysis_details, result.analysis_details);
}

#[tokio::test]
async fn test_scan_invokes_function_for_type() {
    let ctx = signed_in(benign()).await;

    ctx.state
        .scans()
        .submit(ScanType::Qr, "https://qr.example.com", None)
        .await
        .expect("scan");

    let calls = ctx.functions.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "scan-qr");
    assert_eq!(calls[0].user_id.as_str(), "u1");
    assert_eq!(
        calls[0].body,
        json!({"inputValue": "https://qr.example.com", "fileData": null})
    );
}

#[tokio::test]
async fn test_file_data_is_forwarded_but_not_persisted() {
    let ctx = signed_in(benign()).await;

    ctx.state
        .scans()
        .submit(
            ScanType::File,
            "invoice.pdf",
            Some(FileData::from_bytes(b"%PDF-1.7")),
        )
        .await
        .expect("scan");

    let calls = ctx.functions.calls();
    assert_eq!(calls[0].body["inputValue"], "invoice.pdf");
    assert_eq!(calls[0].body["fileData"], "JVBERi0xLjc=");

    let scans = ctx.tables.scans();
    assert_eq!(scans[0].input_value, "invoice.pdf");
}

#[tokio::test]
async fn test_long_input_is_truncated_when_persisted() {
    let ctx = signed_in(benign()).await;
    let input: String = ('a'..='z').cycle().take(1500).collect();

    let result = ctx
        .state
        .scans()
        .submit(ScanType::Message, input.clone(), None)
        .await
        .expect("scan");
    assert_eq!(result.classification, "benign");

    // The classifier sees the full input.
    let calls = ctx.functions.calls();
    assert_eq!(calls[0].body["inputValue"], input.as_str());

    let scans = ctx.tables.scans();
    assert_eq!(scans[0].input_value.chars().count(), 1000);
    assert_eq!(scans[0].input_value, input[..1000]);
}

#[tokio::test]
async fn test_each_scan_is_recorded_separately() {
    let ctx = signed_in(benign()).await;

    for input in ["a@b.com", "c@d.com"] {
        ctx.state
            .scans()
            .submit(ScanType::Email, input, None)
            .await
            .expect("scan");
    }

    let inputs: Vec<String> = ctx
        .tables
        .scans()
        .into_iter()
        .map(|record| record.input_value)
        .collect();
    assert_eq!(inputs, vec!["a@b.com", "c@d.com"]);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_unauthenticated_scan_makes_no_remote_calls() {
    let ctx = TestContext::standard(benign());

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Email, "a@b.com", None)
        .await
        .expect_err("no session");

    assert_eq!(err, ScanError::AuthRequired);
    assert!(ctx.functions.calls().is_empty());
    assert_eq!(ctx.tables.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scan_after_sign_out_requires_auth() {
    let ctx = signed_in(benign()).await;
    ctx.state.sessions().sign_out().await;

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("signed out");

    assert_eq!(err, ScanError::AuthRequired);
    assert!(ctx.functions.calls().is_empty());
}

#[tokio::test]
async fn test_embedded_error_is_not_persisted() {
    let ctx = signed_in(json!({"error": "rate limited"})).await;

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("classifier error");

    assert_eq!(err, ScanError::Classification("rate limited".to_string()));
    assert_eq!(ctx.functions.calls().len(), 1);
    assert_eq!(ctx.tables.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embedded_error_wins_over_result_fields() {
    let mut body = benign();
    body["error"] = json!({"message": "model unavailable"});
    let ctx = signed_in(body).await;

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Website, "example.com", None)
        .await
        .expect_err("classifier error");

    assert_eq!(
        err,
        ScanError::Classification("model unavailable".to_string())
    );
    assert!(ctx.tables.scans().is_empty());
}

#[tokio::test]
async fn test_malformed_response_is_not_persisted() {
    let ctx = signed_in(json!({"classification": "benign"})).await;

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("malformed");

    assert!(matches!(err, ScanError::Classification(_)));
    assert_eq!(ctx.tables.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invocation_failure_surfaces_remote_message() {
    let ctx = TestContext::new(
        FakeIdentity::with_users([User::new("u1", "user@example.com")]),
        FakeTables::default(),
        FakeFunctions::failing(InvocationError::Http {
            status: 429,
            message: Some("Too many requests".to_string()),
        }),
    );
    ctx.sign_in("user@example.com").await.expect("sign in");

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("invocation failed");

    assert_eq!(
        err,
        ScanError::RemoteInvocation("Too many requests".to_string())
    );
    assert!(ctx.tables.scans().is_empty());
}

#[tokio::test]
async fn test_invocation_failure_without_message_uses_generic_message() {
    let ctx = TestContext::new(
        FakeIdentity::with_users([User::new("u1", "user@example.com")]),
        FakeTables::default(),
        FakeFunctions::failing(InvocationError::Request("connection refused".to_string())),
    );
    ctx.sign_in("user@example.com").await.expect("sign in");

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("invocation failed");

    assert_eq!(
        err,
        ScanError::RemoteInvocation("Failed to perform scan".to_string())
    );
}

#[tokio::test]
async fn test_persistence_failure_is_reported() {
    let tables = FakeTables::default();
    tables.fail_inserts();
    let ctx = TestContext::new(
        FakeIdentity::with_users([User::new("u1", "user@example.com")]),
        tables,
        FakeFunctions::replying(benign()),
    );
    ctx.sign_in("user@example.com").await.expect("sign in");

    let err = ctx
        .state
        .scans()
        .submit(ScanType::Url, "http://example.com", None)
        .await
        .expect_err("insert failed");

    assert_eq!(
        err,
        ScanError::Persistence("Failed to save scan result".to_string())
    );
    assert_eq!(ctx.tables.insert_calls.load(Ordering::SeqCst), 1);
}
