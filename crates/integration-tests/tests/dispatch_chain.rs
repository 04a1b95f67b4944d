//! Transport chain end to end.
//!
//! The dispatcher is built from configuration exactly as the server builds
//! it. The hosted transport talks to a real RetroPost server, the form relay
//! and EmailJS are mocks.

#![allow(clippy::unwrap_used)]

use retropost_core::Language;
use retropost_integration_tests::{EMAILJS_PATH, PIXEL, RELAY_PATH, Upstreams, spawn_server};
use retropost_server::dispatch::{
    ContactRequest, DispatchError, Dispatcher, PostcardRequest, Receipt,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn postcard(email: &str) -> PostcardRequest {
    PostcardRequest {
        recipient_email: email.to_string(),
        recipient_name: "Ana".to_string(),
        sender_name: "Ivo".to_string(),
        message: "Pozdrav!".to_string(),
        front_image_data: Some(PIXEL.to_string()),
        back_image_data: Some(PIXEL.to_string()),
    }
}

fn relay_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": "true"}))
}

#[tokio::test]
async fn test_postcard_through_hosted_function() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .and(body_partial_json(json!({
            "_cc": "a@b.com",
            "recipient_name": "Ana",
            "sender_name": "Ivo",
        })))
        .respond_with(relay_ok())
        .expect(1)
        .mount(&upstreams.relay)
        .await;

    // The hosted function forwards to the relay because SMTP is unset.
    let hosted = spawn_server(upstreams.config(None).unwrap()).await.unwrap();
    let config = upstreams.config(Some(&hosted)).unwrap();

    let receipt = Dispatcher::new(&config.delivery)
        .unwrap()
        .send_postcard(postcard("a@b.com"), Language::Hr)
        .await
        .unwrap();

    assert_eq!(receipt, Receipt { transport: "hosted", attempts: 1 });
}

#[tokio::test]
async fn test_relay_used_when_hosted_disabled() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .respond_with(relay_ok())
        .expect(1)
        .mount(&upstreams.relay)
        .await;

    let config = upstreams.config(None).unwrap();
    let receipt = Dispatcher::new(&config.delivery)
        .unwrap()
        .send_postcard(postcard("a@b.com"), Language::Hr)
        .await
        .unwrap();

    assert_eq!(receipt, Receipt { transport: "relay", attempts: 1 });
}

#[tokio::test]
async fn test_invalid_email_never_reaches_network() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("POST"))
        .respond_with(relay_ok())
        .expect(0)
        .mount(&upstreams.relay)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstreams.emailjs)
        .await;

    let config = upstreams.config(None).unwrap();
    let dispatcher = Dispatcher::new(&config.delivery).unwrap();

    for email in ["", "not-an-email"] {
        let err = dispatcher
            .send_postcard(postcard(email), Language::Hr)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { .. }));
    }
}

#[tokio::test]
async fn test_hosted_failure_falls_back_to_relay() {
    let upstreams = Upstreams::start().await;
    let broken = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-postcard"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "down"})))
        .expect(1)
        .mount(&broken)
        .await;
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .respond_with(relay_ok())
        .expect(1)
        .mount(&upstreams.relay)
        .await;

    let config = upstreams.config(Some(&broken.uri())).unwrap();
    let receipt = Dispatcher::new(&config.delivery)
        .unwrap()
        .send_postcard(postcard("a@b.com"), Language::Hr)
        .await
        .unwrap();

    assert_eq!(receipt, Receipt { transport: "relay", attempts: 2 });
}

#[tokio::test]
async fn test_emergency_sends_text_only_summary() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .expect(1)
        .mount(&upstreams.relay)
        .await;
    Mock::given(method("POST"))
        .and(path(EMAILJS_PATH))
        .and(body_partial_json(json!({
            "service_id": "service_retropost",
            "template_params": {"to_email": "a@b.com", "from_name": "Ivo"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&upstreams.emailjs)
        .await;

    let config = upstreams.config(None).unwrap();
    let receipt = Dispatcher::new(&config.delivery)
        .unwrap()
        .send_postcard(postcard("a@b.com"), Language::Hr)
        .await
        .unwrap();

    assert_eq!(receipt, Receipt { transport: "emergency", attempts: 2 });

    let requests = upstreams.emailjs.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests.first().unwrap().body).into_owned();
    assert!(body.contains("Pozdrav!"));
    assert!(!body.contains("base64"));
}

#[tokio::test]
async fn test_exhaustion_names_support_contact() {
    let upstreams = Upstreams::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstreams.relay)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("The user_id parameter is invalid"))
        .mount(&upstreams.emailjs)
        .await;

    let config = upstreams.config(None).unwrap();
    let err = Dispatcher::new(&config.delivery)
        .unwrap()
        .send_contact(
            ContactRequest {
                name: "Marko".to_string(),
                email: "marko@example.hr".to_string(),
                subject: "Upit".to_string(),
                message: "Zanima me cijena razglednica.".to_string(),
            },
            Language::En,
        )
        .await
        .unwrap_err();

    match err {
        DispatchError::Exhausted {
            attempts, message, ..
        } => {
            assert_eq!(attempts, 2);
            assert!(message.contains("podrska@retropost.test"));
        }
        DispatchError::Invalid { .. } => panic!("expected exhaustion"),
    }
}
