use std::time::{Duration, Instant};

use serde_json::{Value, json};
use warden_adapters::{GoogleConfig, OAuthSettings};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::helpers::{TestApp, registration_body};
use crate::oauth::{CLIENT_ID, JWKS, google_id_token};

#[tokio::test]
async fn slow_provider_is_cut_off_at_the_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v3/certs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(JWKS, "application/json")
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&server)
        .await;

    let app = TestApp::with_request_timeout(
        OAuthSettings {
            google: Some(GoogleConfig {
                jwks_url: format!("{}/oauth2/v3/certs", server.uri()),
                ..GoogleConfig::new(CLIENT_ID)
            }),
            ..OAuthSettings::default()
        },
        Duration::from_millis(300),
    )
    .await;
    let email = "slow.provider@example.com";

    let started = Instant::now();
    let response = app
        .post_oauth_login(&json!({ "provider": "google", "token": google_id_token(email) }))
        .await;

    assert!(started.elapsed() < Duration::from_millis(900));
    assert_eq!(response.status().as_u16(), 408);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("REQUEST_TIMEOUT"));
    assert_eq!(body["error"], json!("request timed out"));

    // Past the provider delay: had the abandoned handler kept running it would
    // have provisioned the account by now.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let response = app.post_register(&registration_body(email)).await;
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn fast_requests_are_unaffected_by_the_deadline() {
    let app =
        TestApp::with_request_timeout(OAuthSettings::default(), Duration::from_secs(5)).await;

    let response = app.get_health().await;

    assert_eq!(response.status().as_u16(), 200);
}
