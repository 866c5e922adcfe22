use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code, string_field};

#[tokio::test]
async fn should_accept_bearer_header() {
    let app = TestApp::new().await;
    let (email, registered) = app.register_user().await;

    let response = app
        .post_validate_bearer(string_field(&registered, "access_token"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["user_id"], registered["user"]["id"]);
    assert_eq!(body["email"], json!(email.to_lowercase()));
    assert_eq!(body["user_type"], json!("client"));
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn should_accept_token_in_body() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;

    let response = app
        .post_validate(&json!({ "access_token": string_field(&registered, "access_token") }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn should_return_401_for_garbage_token() {
    let app = TestApp::new().await;

    let response = app.post_validate_bearer("not.a.jwt").await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn should_return_400_without_token() {
    let app = TestApp::new().await;

    let response = app.post_validate(&json!({})).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}
