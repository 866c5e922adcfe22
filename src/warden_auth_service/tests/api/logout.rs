use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code, string_field};

#[tokio::test]
async fn should_revoke_refresh_and_blacklist_access_token() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;
    let access_token = string_field(&registered, "access_token");
    let refresh_token = string_field(&registered, "refresh_token");

    let response = app
        .http_client
        .post(format!("{}/logout", &app.address))
        .bearer_auth(access_token)
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["message"], json!("logged out successfully"));

    let validate = app.post_validate_bearer(access_token).await;
    assert_eq!(validate.status().as_u16(), 401);
    assert_eq!(error_code(validate).await, "UNAUTHORIZED");

    let refresh = app
        .post_refresh(&json!({ "refresh_token": refresh_token }))
        .await;
    assert_eq!(refresh.status().as_u16(), 401);
}

#[tokio::test]
async fn should_be_idempotent() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;
    let body = json!({
        "refresh_token": string_field(&registered, "refresh_token"),
        "access_token": string_field(&registered, "access_token"),
    });

    let first = app.post_logout(&body).await;
    let second = app.post_logout(&body).await;
    let unknown = app
        .post_logout(&json!({ "refresh_token": "never-issued" }))
        .await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
    assert_eq!(unknown.status().as_u16(), 200);
}
