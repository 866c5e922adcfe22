use serde_json::{Value, json};

use crate::helpers::{PASSWORD, TestApp, error_code, string_field};

#[tokio::test]
async fn should_change_password_and_revoke_sessions() {
    let app = TestApp::new().await;
    let (email, registered) = app.register_user().await;
    let user_id = registered["user"]["id"].clone();

    let response = app
        .post_change_password(&json!({
            "user_id": user_id,
            "old_password": PASSWORD,
            "new_password": "brand-new-password"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["success"], json!(true));

    let old_login = app
        .post_login(&json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(old_login.status().as_u16(), 401);

    let new_login = app
        .post_login(&json!({ "email": email, "password": "brand-new-password" }))
        .await;
    assert_eq!(new_login.status().as_u16(), 200);

    let stale_refresh = app
        .post_refresh(&json!({ "refresh_token": string_field(&registered, "refresh_token") }))
        .await;
    assert_eq!(stale_refresh.status().as_u16(), 401);
}

#[tokio::test]
async fn should_return_401_for_wrong_old_password() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;

    let response = app
        .post_change_password(&json!({
            "user_id": registered["user"]["id"],
            "old_password": "not-the-password",
            "new_password": "brand-new-password"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn should_return_404_for_unknown_user() {
    let app = TestApp::new().await;

    let response = app
        .post_change_password(&json!({
            "user_id": "6f1c1f7e-2a4c-4a51-9a53-0c0f3d6f4b1e",
            "old_password": PASSWORD,
            "new_password": "brand-new-password"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(error_code(response).await, "NOT_FOUND");
}

#[tokio::test]
async fn should_return_400_for_short_new_password() {
    let app = TestApp::new().await;
    let (_, registered) = app.register_user().await;

    let response = app
        .post_change_password(&json!({
            "user_id": registered["user"]["id"],
            "old_password": PASSWORD,
            "new_password": "short"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}
