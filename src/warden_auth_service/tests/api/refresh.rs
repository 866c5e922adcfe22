use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code, string_field};

#[tokio::test]
async fn should_rotate_refresh_token() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;
    let original = string_field(&registered, "refresh_token");

    let response = app.post_refresh(&json!({ "refresh_token": original })).await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert_ne!(string_field(&body, "refresh_token"), original);

    let replay = app.post_refresh(&json!({ "refresh_token": original })).await;
    assert_eq!(replay.status().as_u16(), 401);
    assert_eq!(error_code(replay).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn should_return_401_for_unknown_refresh_token() {
    let app = TestApp::new().await;

    let response = app
        .post_refresh(&json!({ "refresh_token": "does-not-exist" }))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn should_return_400_if_refresh_token_missing() {
    let app = TestApp::new().await;

    let response = app.post_refresh(&json!({})).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}
