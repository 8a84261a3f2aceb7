//! Integration tests for HMAC-SHA256 payload signing.
//!
//! Verify the signature header is present, well-formed, and verifiable
//! against the exact bytes delivered to the endpoint.

mod common;

use common::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use hookfan::crypto;

#[tokio::test]
async fn test_signature_header_present_and_prefixed() {
    let mock_server = MockServer::start().await;
    let capture = CaptureResponder::new();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(capture.clone())
        .mount(&mock_server)
        .await;

    let url = format!("{}/webhook", mock_server.uri());
    let sub = subscriber_for(TENANT_A, &url, &["payment.succeeded"]);
    let (_store, dispatcher) = engine_with(vec![sub]).await;

    dispatcher
        .trigger_event(TENANT_A, "payment.succeeded", serde_json::json!({}))
        .await;

    let captured = &capture.requests()[0];
    let signature = captured
        .header("x-webhook-signature")
        .expect("signature header present");
    assert!(signature.starts_with("sha256="));

    // sha256 digest = 32 bytes = 64 hex chars
    let hex_part = &signature[7..];
    assert_eq!(hex_part.len(), 64);
    assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_signature_verifies_against_delivered_body() {
    let mock_server = MockServer::start().await;
    let capture = CaptureResponder::new();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(capture.clone())
        .mount(&mock_server)
        .await;

    let url = format!("{}/webhook", mock_server.uri());
    let sub = subscriber_for(TENANT_A, &url, &["invoice.paid"]);
    let (_store, dispatcher) = engine_with(vec![sub]).await;

    dispatcher
        .trigger_event(
            TENANT_A,
            "invoice.paid",
            serde_json::json!({"invoiceId": "in_123"}),
        )
        .await;

    let captured = &capture.requests()[0];
    let signature = captured.header("x-webhook-signature").unwrap();

    assert!(crypto::verify(&captured.body, signature, SECRET_1));
}

#[tokio::test]
async fn test_signature_rejects_wrong_secret() {
    let mock_server = MockServer::start().await;
    let capture = CaptureResponder::new();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(capture.clone())
        .mount(&mock_server)
        .await;

    let url = format!("{}/webhook", mock_server.uri());
    let sub = subscriber_for(TENANT_A, &url, &["invoice.paid"]);
    let (_store, dispatcher) = engine_with(vec![sub]).await;

    dispatcher
        .trigger_event(TENANT_A, "invoice.paid", serde_json::json!({}))
        .await;

    let captured = &capture.requests()[0];
    let signature = captured.header("x-webhook-signature").unwrap();

    assert!(!crypto::verify(&captured.body, signature, SECRET_2));
}

#[tokio::test]
async fn test_signature_rejects_tampered_body() {
    let mock_server = MockServer::start().await;
    let capture = CaptureResponder::new();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(capture.clone())
        .mount(&mock_server)
        .await;

    let url = format!("{}/webhook", mock_server.uri());
    let sub = subscriber_for(TENANT_A, &url, &["invoice.paid"]);
    let (_store, dispatcher) = engine_with(vec![sub]).await;

    dispatcher
        .trigger_event(TENANT_A, "invoice.paid", serde_json::json!({"amount": 100}))
        .await;

    let captured = &capture.requests()[0];
    let signature = captured.header("x-webhook-signature").unwrap();

    let mut tampered = captured.body.clone();
    tampered[0] ^= 0x01;
    assert!(!crypto::verify(&tampered, signature, SECRET_1));
}

#[tokio::test]
async fn test_signature_covers_exact_payload_field() {
    // The stored payload in the delivery record must be the signed bytes.
    let mock_server = MockServer::start().await;
    let capture = CaptureResponder::new();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(capture.clone())
        .mount(&mock_server)
        .await;

    let url = format!("{}/webhook", mock_server.uri());
    let sub = subscriber_for(TENANT_A, &url, &["customer.created"]);
    let (_store, dispatcher) = engine_with(vec![sub]).await;

    let results = dispatcher
        .trigger_event(
            TENANT_A,
            "customer.created",
            serde_json::json!({"customerId": "cus_1"}),
        )
        .await;

    let captured = &capture.requests()[0];
    assert_eq!(results[0].payload.as_bytes(), &captured.body[..]);
}
