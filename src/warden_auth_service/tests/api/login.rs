use serde_json::{Value, json};

use crate::helpers::{PASSWORD, TestApp, error_code, get_random_email, string_field};

#[tokio::test]
async fn should_return_200_with_fresh_session() {
    let app = TestApp::new().await;
    let (email, registered) = app.register_user().await;

    let response = app
        .post_login(&json!({ "email": email, "password": PASSWORD }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["message"], json!("login successful"));
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert!(body["user"]["last_login_at"].is_string());
    assert_ne!(
        string_field(&body, "refresh_token"),
        string_field(&registered, "refresh_token")
    );
}

#[tokio::test]
async fn should_return_same_401_for_unknown_email_and_wrong_password() {
    let app = TestApp::new().await;
    let (email, _) = app.register_user().await;

    let wrong_password = app
        .post_login(&json!({ "email": email, "password": "not-the-password" }))
        .await;
    let unknown_email = app
        .post_login(&json!({ "email": get_random_email(), "password": PASSWORD }))
        .await;

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);

    let wrong_password = wrong_password.json::<Value>().await.unwrap();
    let unknown_email = unknown_email.json::<Value>().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["code"], json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn should_lock_account_after_repeated_failures() {
    let app = TestApp::new().await;
    let (email, _) = app.register_user().await;

    for _ in 0..5 {
        let response = app
            .post_login(&json!({ "email": email, "password": "not-the-password" }))
            .await;
        assert_eq!(response.status().as_u16(), 401);
    }

    let response = app
        .post_login(&json!({ "email": email, "password": PASSWORD }))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(error_code(response).await, "FORBIDDEN");
}

#[tokio::test]
async fn should_return_400_if_malformed_input() {
    let app = TestApp::new().await;

    let response = app.post_login(&json!({ "email": get_random_email() })).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}
