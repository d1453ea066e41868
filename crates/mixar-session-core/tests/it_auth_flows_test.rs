//! Integration tests for login, signup, Google OAuth and logout

use mixar_session_core::{
    Config, KeyValueStore, MemoryStore, Navigation, SessionClient, SessionError,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(server_url: String, store: &MemoryStore) -> SessionClient {
    let config = Config {
        api_url: server_url,
        ..Config::default()
    };
    SessionClient::new(config, Box::new(store.clone())).expect("Failed to build client")
}

#[tokio::test]
async fn login_stores_tokens_and_fetches_user() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    let login_mock = server
        .mock("POST", "/auth/login/json")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"email": "u@x.com", "password": "pw"})))
        .with_status(200)
        .with_body(r#"{"access_token": "A", "refresh_token": "B", "token_type": "bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let me_mock = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer A")
        .with_status(200)
        .with_body(r#"{"name": "X"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let pair = client.login("u@x.com", "pw").await.expect("Login should succeed");

    //* Then
    login_mock.assert_async().await;
    me_mock.assert_async().await;
    assert_eq!(pair.access_token, "A");
    assert_eq!(client.access_token(), Some("A"));
    assert_eq!(client.refresh_token(), Some("B"));
    assert_eq!(
        client.user().cloned().map(|u| u.into_value()),
        Some(json!({"name": "X"}))
    );
    assert_eq!(store.get("mixar_refresh_token").as_deref(), Some("B"));
}

#[tokio::test]
async fn login_rejection_surfaces_backend_message() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();
    store.set("mixar_access_token", "prior").unwrap();
    store.set("mixar_refresh_token", "prior-r").unwrap();

    server
        .mock("POST", "/auth/login/json")
        .with_status(400)
        .with_body(r#"{"detail": {"message": "bad creds"}}"#)
        .create_async()
        .await;
    let me_mock = server.mock("GET", "/auth/me").expect(0).create_async().await;

    let mut client = client_for(server.url(), &store);

    //* When
    let err = client
        .login("u@x.com", "pw")
        .await
        .expect_err("Login should fail");

    //* Then
    me_mock.assert_async().await;
    assert_eq!(err.to_string(), "bad creds");
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::Authentication(_))
    ));
    assert_eq!(client.access_token(), Some("prior"));
    assert_eq!(client.refresh_token(), Some("prior-r"));
}

#[tokio::test]
async fn login_rejection_without_detail_uses_fallback() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("POST", "/auth/login/json")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let err = client.login("u@x.com", "pw").await.expect_err("Login should fail");

    //* Then
    assert_eq!(err.to_string(), "Login failed");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_with_unavailable_profile_leaves_user_absent() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("POST", "/auth/login/json")
        .with_status(200)
        .with_body(r#"{"access_token": "A", "refresh_token": "B"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/auth/me")
        .with_status(500)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    client.login("u@x.com", "pw").await.expect("Login should succeed");

    //* Then
    assert!(client.is_authenticated());
    assert!(client.user().is_none());
    assert_eq!(store.get("mixar_user"), None);
}

#[tokio::test]
async fn send_signup_otp_does_not_touch_session() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    let otp_mock = server
        .mock("POST", "/auth/signup/send-otp")
        .match_body(Matcher::Json(json!({"email": "u@x.com", "password": "pw", "name": "X"})))
        .with_status(200)
        .with_body(r#"{"message": "OTP sent"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(server.url(), &store);

    //* When
    let body = client
        .send_signup_otp("u@x.com", "pw", "X")
        .await
        .expect("OTP should be sent");

    //* Then
    otp_mock.assert_async().await;
    assert_eq!(body, json!({"message": "OTP sent"}));
    assert!(!client.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn send_signup_otp_failure_reads_top_level_message() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("POST", "/auth/signup/send-otp")
        .with_status(429)
        .with_body(r#"{"message": "Slow down"}"#)
        .create_async()
        .await;

    let client = client_for(server.url(), &store);

    //* When
    let err = client
        .send_signup_otp("u@x.com", "pw", "X")
        .await
        .expect_err("OTP should fail");

    //* Then
    assert_eq!(err.to_string(), "Slow down");
}

#[tokio::test]
async fn verify_signup_otp_signs_in() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    let verify_mock = server
        .mock("POST", "/auth/signup/verify-otp")
        .match_body(Matcher::Json(json!({
            "email": "u@x.com",
            "otp_code": "123456",
            "password": "pw",
            "name": "X"
        })))
        .with_status(200)
        .with_body(r#"{"access_token": "A", "refresh_token": "B"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/auth/me")
        .with_status(200)
        .with_body(r#"{"name": "X", "is_superuser": false}"#)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    client
        .verify_signup_otp("u@x.com", "123456", "pw", "X")
        .await
        .expect("Verification should succeed");

    //* Then
    verify_mock.assert_async().await;
    assert_eq!(client.access_token(), Some("A"));
    assert!(!client.is_superuser());
    assert_eq!(client.require_superuser(), Navigation::Dashboard);
}

#[tokio::test]
async fn verify_signup_otp_rejection() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("POST", "/auth/signup/verify-otp")
        .with_status(400)
        .with_body(r#"{"detail": "Invalid or expired OTP"}"#)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let err = client
        .verify_signup_otp("u@x.com", "000000", "pw", "X")
        .await
        .expect_err("Verification should fail");

    //* Then
    assert_eq!(err.to_string(), "Invalid or expired OTP");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn google_login_url() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("GET", "/auth/login/google")
        .with_status(200)
        .with_body(r#"{"url": "https://accounts.google.com/o/oauth2/auth?client_id=abc"}"#)
        .create_async()
        .await;

    let client = client_for(server.url(), &store);

    //* When
    let url = client.login_with_google().await.expect("URL should be returned");

    //* Then
    assert_eq!(url, "https://accounts.google.com/o/oauth2/auth?client_id=abc");
}

#[tokio::test]
async fn google_login_without_url_fails() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("GET", "/auth/login/google")
        .with_status(503)
        .with_body(r#"{"detail": "Google OAuth not configured"}"#)
        .create_async()
        .await;

    let client = client_for(server.url(), &store);

    //* When
    let err = client.login_with_google().await.expect_err("Missing URL should fail");

    //* Then
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::MissingOAuthUrl)
    ));
}

#[tokio::test]
async fn google_callback_signs_in_superuser() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    let callback_mock = server
        .mock("POST", "/auth/google")
        .match_body(Matcher::Json(json!({"code": "auth-code"})))
        .with_status(200)
        .with_body(r#"{"access_token": "G", "refresh_token": "GR"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer G")
        .with_status(200)
        .with_body(r#"{"email": "admin@x.com", "is_superuser": true}"#)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    client
        .handle_google_callback("auth-code")
        .await
        .expect("Callback should succeed");

    //* Then
    callback_mock.assert_async().await;
    assert!(client.is_superuser());
    assert!(client.require_superuser().allows());
    assert_eq!(client.redirect_if_authenticated(), Navigation::Dashboard);
}

#[tokio::test]
async fn google_callback_rejection_uses_fallback() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();

    server
        .mock("POST", "/auth/google")
        .with_status(401)
        .with_body("{}")
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let err = client
        .handle_google_callback("bad-code")
        .await
        .expect_err("Callback should fail");

    //* Then
    assert_eq!(err.to_string(), "Google authentication failed");
}

#[tokio::test]
async fn logout_notifies_backend_and_clears_session() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();
    store.set("mixar_access_token", "A").unwrap();
    store.set("mixar_refresh_token", "B").unwrap();
    store.set("mixar_user", r#"{"name": "X"}"#).unwrap();

    let logout_mock = server
        .mock("POST", "/auth/logout")
        .match_header("authorization", "Bearer A")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let navigation = client.logout().await;

    //* Then
    logout_mock.assert_async().await;
    assert_eq!(navigation, Navigation::Login);
    assert!(!client.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn logout_clears_session_when_backend_unreachable() {
    //* Given
    let store = MemoryStore::new();
    store.set("mixar_access_token", "A").unwrap();
    store.set("mixar_refresh_token", "B").unwrap();

    let mut client = client_for("http://127.0.0.1:9".to_string(), &store);

    //* When
    let navigation = client.logout().await;

    //* Then
    assert_eq!(navigation, Navigation::Login);
    assert!(!client.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn logout_clears_session_on_server_error() {
    //* Given
    let mut server = Server::new_async().await;
    let store = MemoryStore::new();
    store.set("mixar_access_token", "A").unwrap();

    server
        .mock("POST", "/auth/logout")
        .with_status(500)
        .create_async()
        .await;

    let mut client = client_for(server.url(), &store);

    //* When
    let navigation = client.logout().await;

    //* Then
    assert_eq!(navigation, Navigation::Login);
    assert!(!client.is_authenticated());
}
