use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::Secret;
use serde_json::{Value, json};
use warden_adapters::{FacebookConfig, GoogleConfig, OAuthSettings};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::helpers::{TestApp, error_code, string_field};

const PRIVATE_KEY: &str = include_str!("../fixtures/google_rsa.pem");
pub const JWKS: &str = include_str!("../fixtures/google_jwks.json");
const KID: &str = "test-key-1";
pub const CLIENT_ID: &str = "warden-web.apps.googleusercontent.com";

pub fn google_id_token(email: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "iss": "https://accounts.google.com",
        "aud": CLIENT_ID,
        "sub": "109876543210",
        "iat": now,
        "exp": now + 600,
        "email": email,
        "email_verified": true,
        "given_name": "Grace",
        "family_name": "Hopper",
        "picture": "https://example.com/grace.png",
    });

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_owned());
    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

async fn app_with_google(server: &MockServer) -> TestApp {
    Mock::given(method("GET"))
        .and(path("/oauth2/v3/certs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
        .mount(server)
        .await;

    TestApp::with_oauth(OAuthSettings {
        google: Some(GoogleConfig {
            jwks_url: format!("{}/oauth2/v3/certs", server.uri()),
            ..GoogleConfig::new(CLIENT_ID)
        }),
        ..OAuthSettings::default()
    })
    .await
}

#[tokio::test]
async fn google_login_creates_verified_user_once() {
    let server = MockServer::start().await;
    let app = app_with_google(&server).await;
    let token = google_id_token("Grace.Hopper@Example.com");

    let first = app
        .post_oauth_login(&json!({ "provider": "google", "token": token }))
        .await;

    assert_eq!(first.status().as_u16(), 200);
    let first = first.json::<Value>().await.unwrap();
    assert_eq!(first["user"]["email"], json!("grace.hopper@example.com"));
    assert_eq!(first["user"]["first_name"], json!("Grace"));
    assert_eq!(first["user"]["last_name"], json!("Hopper"));
    assert_eq!(first["user"]["is_verified"], json!(true));
    assert_eq!(first["user"]["avatar_url"], json!("https://example.com/grace.png"));

    let second = app
        .post_oauth_login(&json!({ "provider": "google", "id_token": token }))
        .await;

    assert_eq!(second.status().as_u16(), 200);
    let second = second.json::<Value>().await.unwrap();
    assert_eq!(second["user"]["id"], first["user"]["id"]);
    assert_ne!(
        string_field(&second, "refresh_token"),
        string_field(&first, "refresh_token")
    );
}

#[tokio::test]
async fn google_login_rejects_untrusted_token() {
    let server = MockServer::start().await;
    let app = app_with_google(&server).await;

    let response = app
        .post_oauth_login(&json!({ "provider": "google", "token": "not-a-jwt" }))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn facebook_login_surfaces_provider_outage_as_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = TestApp::with_oauth(OAuthSettings {
        facebook: Some(FacebookConfig {
            app_id: "1234".to_owned(),
            app_secret: Secret::new("app-secret".to_owned()),
            graph_url: server.uri(),
        }),
        ..OAuthSettings::default()
    })
    .await;

    let response = app
        .post_oauth_login(&json!({ "provider": "facebook", "token": "user-token" }))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_provider_is_a_server_error() {
    let app = TestApp::new().await;

    let response = app
        .post_oauth_login(&json!({ "provider": "github", "token": "whatever" }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["code"], json!("INTERNAL_ERROR"));
    assert_eq!(body["success"], json!(false));
}
