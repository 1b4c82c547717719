mod common;

use account_api::auth::{create_access_token, create_refresh_token};
use common::{refresh_cookie_value, spawn_app};
use serde_json::Value;

// --- Login Tests ---

#[tokio::test]
async fn login_returns_access_token_and_refresh_cookie() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;

    let response = app.login("e@x.com", "secret123").await;
    assert_eq!(200, response.status().as_u16());

    let set_cookie = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("jid="))
        .expect("No jid cookie set")
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Max-Age"));

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["accessToken"].as_str().expect("No access token");
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn login_returns_401_for_wrong_password() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;

    let response = app.login("e@x.com", "wrong").await;
    assert_eq!(401, response.status().as_u16());
    assert!(refresh_cookie_value(&response).is_none());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Incorrect Password");
    assert_eq!(body["code"], "INCORRECT_PASSWORD");
}

#[tokio::test]
async fn login_returns_404_for_unknown_email() {
    let app = spawn_app().await;

    let response = app.login("nobody@x.com", "secret123").await;
    assert_eq!(404, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Could not find User");
}

// --- Protected Route Tests ---

#[tokio::test]
async fn bye_returns_user_id_for_valid_token() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;
    let (access, _) = app.login_tokens("e@x.com", "secret123").await;

    let response = app.get_bye(Some(&format!("Bearer {}", access))).await;
    assert_eq!(200, response.status().as_u16());

    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, format!("your user id is: {}", user.id));
}

#[tokio::test]
async fn bye_returns_401_without_token() {
    let app = spawn_app().await;

    let response = app.get_bye(None).await;
    assert_eq!(401, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn bye_returns_401_for_malformed_header() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;
    let (access, _) = app.login_tokens("e@x.com", "secret123").await;

    let test_cases = vec![
        (access.clone(), "missing Bearer prefix"),
        (format!("Basic {}", access), "wrong scheme"),
        ("Bearer ".to_string(), "empty token"),
        ("Bearer not.a.token".to_string(), "garbage token"),
    ];

    for (header, reason) in test_cases {
        let response = app.get_bye(Some(&header)).await;
        assert_eq!(401, response.status().as_u16(), "Should reject: {}", reason);
    }
}

#[tokio::test]
async fn bye_returns_401_for_expired_token() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;

    let mut expired_config = app.jwt_config.clone();
    expired_config.access_token_expiry = -10;
    let token = create_access_token(&user, &expired_config).expect("Failed to sign token");

    let response = app.get_bye(Some(&format!("Bearer {}", token))).await;
    assert_eq!(401, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn bye_returns_401_for_tampered_token() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;
    let (access, _) = app.login_tokens("e@x.com", "secret123").await;

    let (head, signature) = access.rsplit_once('.').expect("Token has no signature");
    let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", head, flipped, &signature[1..]);

    let response = app.get_bye(Some(&format!("Bearer {}", tampered))).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_token_is_not_accepted_as_access_token() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;
    let (_, refresh) = app.login_tokens("e@x.com", "secret123").await;

    let response = app.get_bye(Some(&format!("Bearer {}", refresh))).await;
    assert_eq!(401, response.status().as_u16());
}

// --- Refresh Token Tests ---

#[tokio::test]
async fn refresh_issues_new_access_token_and_rotates_cookie() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;
    let (_, refresh) = app.login_tokens("e@x.com", "secret123").await;

    let response = app.post_refresh(Some(&refresh)).await;
    assert_eq!(200, response.status().as_u16());

    let rotated = refresh_cookie_value(&response).expect("No rotated jid cookie");
    assert_ne!(rotated, refresh);

    let body: Value = response.json().await.expect("Failed to parse response");
    let access = body["accessToken"].as_str().expect("No access token");

    let bye = app.get_bye(Some(&format!("Bearer {}", access))).await;
    assert_eq!(200, bye.status().as_u16());
    let text = bye.text().await.expect("Failed to read body");
    assert_eq!(text, format!("your user id is: {}", user.id));
}

#[tokio::test]
async fn refresh_returns_401_without_cookie() {
    let app = spawn_app().await;

    let response = app.post_refresh(None).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_access_token_in_cookie() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;
    let (access, _) = app.login_tokens("e@x.com", "secret123").await;

    let response = app.post_refresh(Some(&access)).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_returns_404_for_deleted_user() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;
    let refresh = create_refresh_token(&user, &app.jwt_config).expect("Failed to sign token");

    app.client
        .delete(&format!("{}/users/{}", &app.address, user.id))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = app.post_refresh(Some(&refresh)).await;
    assert_eq!(404, response.status().as_u16());
}

// --- Revocation Tests ---

#[tokio::test]
async fn revoked_refresh_token_is_rejected() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;
    let (access, refresh) = app.login_tokens("e@x.com", "secret123").await;

    let response = app
        .client
        .post(&format!("{}/users/{}/revoke_tokens", &app.address, user.id))
        .header("Authorization", format!("Bearer {}", access))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);

    let response = app.post_refresh(Some(&refresh)).await;
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_REVOKED");

    // A fresh login picks up the new version
    let (_, new_refresh) = app.login_tokens("e@x.com", "secret123").await;
    let response = app.post_refresh(Some(&new_refresh)).await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn revoke_tokens_requires_access_token() {
    let app = spawn_app().await;
    let user = app.create_test_user("e@x.com", "secret123").await;

    let response = app
        .client
        .post(&format!("{}/users/{}/revoke_tokens", &app.address, user.id))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let stored = app.stored_user("e@x.com").await.expect("User missing");
    assert_eq!(stored.token_version, 0);
}

#[tokio::test]
async fn revoke_tokens_for_unknown_user_reports_false() {
    let app = spawn_app().await;
    app.create_test_user("e@x.com", "secret123").await;
    let (access, _) = app.login_tokens("e@x.com", "secret123").await;

    let response = app
        .client
        .post(&format!("{}/users/999/revoke_tokens", &app.address))
        .header("Authorization", format!("Bearer {}", access))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}
