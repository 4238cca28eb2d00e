//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use voluntrack_core::auth::MemoryTokenStore;
use voluntrack_core::{AppState, NotificationQueue};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub state: AppState,
    pub tokens: Arc<MemoryTokenStore>,
    pub notices: Arc<NotificationQueue>,
}

/// App state wired to a fresh mock server, optionally with a saved token.
pub async fn harness(saved_token: Option<&str>) -> Harness {
    let server = MockServer::start().await;
    let tokens = Arc::new(match saved_token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });
    let notices = Arc::new(NotificationQueue::new());
    let state = AppState::new(
        &format!("{}/api", server.uri()),
        Duration::from_secs(2),
        tokens.clone(),
        notices.clone(),
    )
    .expect("build app state");

    Harness {
        server,
        state,
        tokens,
        notices,
    }
}

pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "username": format!("user{}", id),
        "email": format!("user{}@example.org", id),
        "real_name": "Test User",
        "phone": "",
        "role": "volunteer",
        "avatar": null,
        "volunteer_hours": 4.5,
        "created_at": "2026-01-05T10:00:00"
    })
}

pub fn activity_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Help out",
        "location": "Community center",
        "start_time": "2026-11-01T09:00:00",
        "end_time": "2026-11-01T12:00:00",
        "max_participants": 30,
        "current_participants": 4,
        "status": "active",
        "category": "elderly care",
        "volunteer_hours": 3.0,
        "requirements": "",
        "contact_person": "Mei",
        "contact_phone": "555-0199",
        "image_url": "",
        "created_by": 1,
        "created_at": "2026-10-01T08:00:00",
        "is_full": false,
        "is_active": true
    })
}

pub fn registration_json(id: i64, activity_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "activity_id": activity_id,
        "status": status,
        "registration_time": "2026-10-10T10:00:00",
        "check_in_time": null,
        "completion_time": null,
        "notes": "",
        "rating": null,
        "feedback": null
    })
}

/// Log in against the mock server with token `tok-1` and user id 1.
pub async fn logged_in(h: &Harness) {
    use voluntrack_core::models::Credentials;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let guard = Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "access_token": "tok-1",
            "user": user_json(1)
        })))
        .mount_as_scoped(&h.server)
        .await;

    h.state
        .auth
        .login(&Credentials {
            username: "user1".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login");
    drop(guard);
}
