//! Integration tests for the auth store.

mod common;

use common::{harness, logged_in, user_json};
use serde_json::json;
use voluntrack_core::models::{Credentials, NewUser, ProfileUpdate, Role};
use voluntrack_core::{ApiError, Navigation, Session};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        username: "user1".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_login_stores_token_and_profile() {
    let h = harness(None).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "user1", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "access_token": "jwt-abc",
            "user": user_json(1)
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.state.auth.login(&credentials()).await.expect("login");
    assert_eq!(user.id, 1);

    assert!(h.state.auth.is_logged_in());
    assert_eq!(h.state.auth.token().as_deref(), Some("jwt-abc"));
    assert_eq!(h.state.auth.user_id(), Some(1));
    assert_eq!(h.state.auth.user_role(), Some(Role::Volunteer));
    assert_eq!(h.tokens.peek().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn test_failed_login_leaves_state_unchanged() {
    let h = harness(None).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Username and password are required"})),
        )
        .mount(&h.server)
        .await;

    let err = h.state.auth.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unclassified { status: 400, .. }));
    assert_eq!(h.state.auth.session(), Session::default());
    assert_eq!(h.tokens.peek(), None);
    assert_eq!(h.notices.drain(), vec!["Username and password are required"]);
}

#[tokio::test]
async fn test_register_does_not_log_in() {
    let h = harness(None).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "User registered successfully",
            "user": user_json(8)
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h
        .state
        .auth
        .register(&NewUser {
            username: "user8".to_string(),
            email: "user8@example.org".to_string(),
            password: "pw".to_string(),
            real_name: "Eight".to_string(),
            phone: None,
            role: None,
        })
        .await
        .expect("register");

    assert_eq!(user.id, 8);
    assert!(!h.state.auth.is_logged_in());
    assert!(h.state.auth.token().is_none());
}

#[tokio::test]
async fn test_check_auth_without_token_makes_no_request() {
    let h = harness(None).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json(1)})))
        .expect(0)
        .mount(&h.server)
        .await;

    h.state.auth.check_auth().await;

    assert_eq!(h.state.auth.session(), Session::default());
    let requests = h.server.received_requests().await.expect("recorded requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_check_auth_validates_saved_token() {
    let h = harness(Some("saved")).await;
    assert!(!h.state.auth.is_logged_in());

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer saved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json(2)})))
        .expect(1)
        .mount(&h.server)
        .await;

    h.state.auth.check_auth().await;

    assert!(h.state.auth.is_logged_in());
    assert_eq!(h.state.auth.user_id(), Some(2));
    assert_eq!(h.state.auth.token().as_deref(), Some("saved"));
}

#[tokio::test]
async fn test_check_auth_failure_resets_session() {
    let h = harness(Some("stale")).await;

    // A 404 does not trigger the gateway's forced logout; check_auth must
    // reset on its own and swallow the error.
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "User not found"})))
        .mount(&h.server)
        .await;

    h.state.auth.check_auth().await;

    let session = h.state.auth.session();
    assert!(session.token.is_none());
    assert!(session.user.is_none());
    assert!(!session.is_logged_in);
    assert_eq!(h.tokens.peek(), None);
}

#[tokio::test]
async fn test_update_profile_replaces_stored_profile() {
    let h = harness(None).await;
    logged_in(&h).await;

    let mut updated = user_json(1);
    updated["real_name"] = json!("Renamed");
    updated["phone"] = json!("555-0111");

    Mock::given(method("PUT"))
        .and(path("/api/auth/profile"))
        .and(body_json(json!({"real_name": "Renamed", "phone": "555-0111"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Profile updated successfully",
            "user": updated
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.state
        .auth
        .update_profile(&ProfileUpdate {
            real_name: Some("Renamed".to_string()),
            phone: Some("555-0111".to_string()),
            avatar: None,
        })
        .await
        .expect("update profile");

    let user = h.state.auth.user().expect("user");
    assert_eq!(user.real_name.as_deref(), Some("Renamed"));
    assert_eq!(user.phone.as_deref(), Some("555-0111"));
}

#[tokio::test]
async fn test_logout_clears_persisted_token_without_request() {
    let h = harness(None).await;
    logged_in(&h).await;
    let before = h.server.received_requests().await.expect("recorded").len();

    h.state.auth.logout();

    assert_eq!(h.state.auth.session(), Session::default());
    assert_eq!(h.tokens.peek(), None);
    let after = h.server.received_requests().await.expect("recorded").len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_navigation_follows_login_state() {
    let h = harness(None).await;
    assert_eq!(
        h.state.navigate("/profile"),
        Navigation::Redirect("/login".to_string())
    );

    logged_in(&h).await;
    assert_eq!(h.state.navigate("/profile"), Navigation::Allow);
    assert_eq!(
        h.state.navigate("/login"),
        Navigation::Redirect("/home".to_string())
    );
}
