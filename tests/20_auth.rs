mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_login_and_first_list() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let email = common::unique_email("auth");

    // Signup succeeds once
    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({ "email": email, "password": "pass1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["email"], json!(email));
    assert!(body["id"].is_i64());

    // Second signup with the same email conflicts
    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({ "email": email, "password": "pass1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Wrong password is rejected
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Correct password yields a usable token
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "pass1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    let token = body["token"].as_str().expect("token");

    let res = client
        .get(format!("{}/contacts", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], json!(0));
    assert_eq!(body["page"], json!(1));
    assert_eq!(body["pageSize"], json!(10));

    Ok(())
}

#[tokio::test]
async fn signup_validation_failures() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Short password
    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({ "email": common::unique_email("short"), "password": "abc" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await?;
    assert!(body["field_errors"]["password"].is_string());

    // Malformed email
    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({ "email": "not-an-email", "password": "pass1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
