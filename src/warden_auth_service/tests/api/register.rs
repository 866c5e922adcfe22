use serde_json::{Value, json};

use crate::helpers::{
    PASSWORD, TestApp, error_code, get_random_email, registration_body, string_field,
};

#[tokio::test]
async fn should_return_201_with_session_for_valid_input() {
    let app = TestApp::new().await;
    let email = get_random_email();

    let response = app.post_register(&registration_body(&email)).await;

    assert_eq!(response.status().as_u16(), 201);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["token_type"], json!("Bearer"));
    assert_eq!(body["user"]["email"], json!(email.to_lowercase()));
    assert_eq!(body["user"]["user_type"], json!("client"));
    assert!(body["user"].get("password").is_none());
    assert_eq!(string_field(&body, "access_token").split('.').count(), 3);
    assert_eq!(string_field(&body, "refresh_token").len(), 64);
}

#[tokio::test]
async fn should_return_409_if_email_already_exists() {
    let app = TestApp::new().await;
    let (email, _) = app.register_user().await;

    let response = app
        .post_register(&registration_body(&email.to_uppercase()))
        .await;

    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(error_code(response).await, "CONFLICT_ERROR");
}

#[tokio::test]
async fn should_return_400_if_invalid_input() {
    let app = TestApp::new().await;
    let email = get_random_email();

    let test_cases = [
        json!({
            "email": "not-an-email",
            "password": PASSWORD,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "user_type": "client"
        }),
        json!({
            "email": email,
            "password": "short",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "user_type": "client"
        }),
        json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "user_type": "admin"
        }),
        json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "",
            "last_name": "Lovelace",
            "user_type": "client"
        }),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_register(test_case).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "Failed for input: {:?}",
            test_case
        );
        assert_eq!(error_code(response).await, "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn should_return_400_if_malformed_input() {
    let app = TestApp::new().await;

    let missing_fields = app
        .post_register(&json!({ "email": get_random_email() }))
        .await;
    assert_eq!(missing_fields.status().as_u16(), 400);
    assert_eq!(error_code(missing_fields).await, "VALIDATION_ERROR");

    let broken_json = app.post_raw("/register", "{\"email\": ").await;
    assert_eq!(broken_json.status().as_u16(), 400);
    assert_eq!(error_code(broken_json).await, "VALIDATION_ERROR");
}
