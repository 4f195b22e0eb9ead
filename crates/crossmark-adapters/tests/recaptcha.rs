//! reCAPTCHA adapter tests against a mock verification endpoint.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};

use crossmark_adapters::{DisabledCaptcha, RecaptchaVerifier};
use crossmark_core::{CaptchaRejection, CaptchaVerifier};
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_accepts_successful_verification() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/siteverify")
                .body_contains("secret=s3cret")
                .body_contains("response=good-token")
                .body_contains("remoteip=127.0.0.1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"success": true, "hostname": "localhost"}));
        })
        .await;

    let verifier = RecaptchaVerifier::new("s3cret", server.url("/siteverify")).unwrap();
    let result = verifier
        .verify(Some("good-token"), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))
        .await;

    assert_eq!(result, Ok(()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejects_failed_verification() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"success": false, "error-codes": ["invalid-input-response"]}));
        })
        .await;

    let verifier = RecaptchaVerifier::new("s3cret", server.url("/siteverify")).unwrap();
    let result = verifier.verify(Some("bad-token"), None).await;

    assert_eq!(result, Err(CaptchaRejection::Invalid));
}

#[tokio::test]
async fn test_missing_token_skips_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let verifier = RecaptchaVerifier::new("s3cret", server.url("/siteverify")).unwrap();

    assert_eq!(verifier.verify(None, None).await, Err(CaptchaRejection::Missing));
    assert_eq!(
        verifier.verify(Some("   "), None).await,
        Err(CaptchaRejection::Missing)
    );
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/siteverify");
            then.status(503);
        })
        .await;

    let verifier = RecaptchaVerifier::new("s3cret", server.url("/siteverify")).unwrap();
    let result = verifier.verify(Some("token"), None).await;

    assert_eq!(result, Err(CaptchaRejection::Unavailable));
}

#[tokio::test]
async fn test_disabled_captcha_accepts_anything() {
    assert_eq!(DisabledCaptcha.verify(None, None).await, Ok(()));
}
