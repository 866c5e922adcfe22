use serde_json::{Value, json};

use crate::helpers::TestApp;

#[tokio::test]
async fn health_returns_ok() {
    let app = TestApp::new().await;

    let response = app.get_health().await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}
