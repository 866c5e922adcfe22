use std::time::Duration;

use fake::{Fake, faker::internet::en::SafeEmail};
use secrecy::Secret;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use warden_adapters::{
    Argon2Cost, Argon2PasswordHasher, HashMapCredentialStore, HashMapTokenBlacklist, JwtConfig,
    JwtTokenIssuer, OAuthSettings, build_oauth_providers, config::test,
};
use warden_application::AuthOrchestrator;
use warden_auth_service::AuthService;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_oauth(OAuthSettings::default()).await
    }

    pub async fn with_oauth(oauth: OAuthSettings) -> Self {
        Self::spawn(oauth, None).await
    }

    pub async fn with_request_timeout(oauth: OAuthSettings, timeout: Duration) -> Self {
        Self::spawn(oauth, Some(timeout)).await
    }

    async fn spawn(oauth: OAuthSettings, request_timeout: Option<Duration>) -> Self {
        let providers = build_oauth_providers(&oauth).expect("Failed to build OAuth providers");

        let orchestrator = AuthOrchestrator::new(
            HashMapCredentialStore::new(),
            Argon2PasswordHasher::new(Argon2Cost {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            }),
            JwtTokenIssuer::new(JwtConfig::new(Secret::new("api-test-secret".to_owned()))),
            HashMapTokenBlacklist::default(),
        )
        .with_oauth_providers(providers);

        let listener = TcpListener::bind(test::APP_ADDRESS)
            .await
            .expect("Failed to bind test listener");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("Failed to read local address")
        );

        let mut service = AuthService::new(orchestrator);
        if let Some(timeout) = request_timeout {
            service = service.with_request_timeout(timeout);
        }
        tokio::spawn(service.run_standalone(listener, None));

        Self {
            address,
            http_client: reqwest::Client::new(),
        }
    }

    async fn post<Body: Serialize + ?Sized>(&self, route: &str, body: &Body) -> reqwest::Response {
        self.http_client
            .post(format!("{}{}", &self.address, route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_health(&self) -> reqwest::Response {
        self.http_client
            .get(format!("{}/health", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_register<Body: Serialize + ?Sized>(&self, body: &Body) -> reqwest::Response {
        self.post("/register", body).await
    }

    pub async fn post_login<Body: Serialize + ?Sized>(&self, body: &Body) -> reqwest::Response {
        self.post("/login", body).await
    }

    pub async fn post_oauth_login<Body: Serialize + ?Sized>(
        &self,
        body: &Body,
    ) -> reqwest::Response {
        self.post("/oauth/login", body).await
    }

    pub async fn post_refresh<Body: Serialize + ?Sized>(&self, body: &Body) -> reqwest::Response {
        self.post("/refresh", body).await
    }

    pub async fn post_validate_bearer(&self, access_token: &str) -> reqwest::Response {
        self.http_client
            .post(format!("{}/validate", &self.address))
            .bearer_auth(access_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_validate<Body: Serialize + ?Sized>(&self, body: &Body) -> reqwest::Response {
        self.post("/validate", body).await
    }

    pub async fn post_change_password<Body: Serialize + ?Sized>(
        &self,
        body: &Body,
    ) -> reqwest::Response {
        self.post("/change-password", body).await
    }

    pub async fn post_logout<Body: Serialize + ?Sized>(&self, body: &Body) -> reqwest::Response {
        self.post("/logout", body).await
    }

    pub async fn post_raw(&self, route: &str, body: &'static str) -> reqwest::Response {
        self.http_client
            .post(format!("{}{}", &self.address, route))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers a fresh client account and returns its email with the
    /// session body.
    pub async fn register_user(&self) -> (String, Value) {
        let email = get_random_email();
        let response = self.post_register(&registration_body(&email)).await;
        assert_eq!(response.status().as_u16(), 201);
        let body = response.json::<Value>().await.expect("session body");
        (email, body)
    }
}

pub fn get_random_email() -> String {
    SafeEmail().fake()
}

pub fn registration_body(email: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "user_type": "client"
    })
}

pub fn string_field<'a>(body: &'a Value, field: &str) -> &'a str {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field {field} in {body}"))
}

/// Asserts the error envelope shape and returns its code.
pub async fn error_code(response: reqwest::Response) -> String {
    let body = response.json::<Value>().await.expect("error body");
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string(), "missing error message in {body}");
    string_field(&body, "code").to_owned()
}
