//! API client for communicating with the volunteer service REST API.
//!
//! Every request goes through `ApiClient::send`, which attaches the session's
//! bearer token, classifies failures, notifies the user and forces a logout
//! on 401 before handing the error back to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionHandle;
use crate::models::{
    Activity, ActivityQuery, Credentials, NewActivity, NewUser, Page, Pagination, ProfileUpdate,
    Registration, RegistrationQuery, UserProfile, UserStatistics,
};

use super::{ApiError, Notifier};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Result type for gateway calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    activity: Activity,
}

#[derive(Debug, Deserialize)]
struct RegistrationEnvelope {
    registration: Registration,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ActivityListResponse {
    #[serde(default)]
    activities: Vec<Activity>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    pages: u64,
    #[serde(default = "first_page")]
    current_page: u64,
}

#[derive(Debug, Deserialize)]
struct RegistrationListResponse {
    #[serde(default)]
    registrations: Vec<Registration>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    pages: u64,
    #[serde(default = "first_page")]
    current_page: u64,
}

fn first_page() -> u64 {
    1
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct CompleteBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<&'a str>,
}

/// Gateway to the volunteer service.
/// Clone is cheap - reqwest::Client and the session share their state.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client with a fixed base URL and timeout.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: SessionHandle,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token when the session has one.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(ApiError::Network(e))),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.fail(ApiError::from_status(status, &body)));
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.fail(ApiError::Network(e))),
        };
        serde_json::from_str(&text)
            .map_err(|e| self.fail(ApiError::InvalidResponse(e.to_string())))
    }

    /// Apply the side effects of a failed request, then return the error.
    fn fail(&self, error: ApiError) -> ApiError {
        if error.is_unauthorized() {
            debug!("Received 401, clearing session");
            self.session.clear();
        }
        warn!(error = %error, status = ?error.status(), "API request failed");
        self.notifier.error(error.user_message());
        error
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    // ===== Auth =====

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.post("/auth/login", credentials).await
    }

    /// Create an account. Returns the new user's profile.
    pub async fn register(&self, user: &NewUser) -> ApiResult<UserProfile> {
        let response: UserEnvelope = self.post("/auth/register", user).await?;
        Ok(response.user)
    }

    pub async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        let response: UserEnvelope = self.get("/auth/profile").await?;
        Ok(response.user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let response: UserEnvelope = self.put("/auth/profile", update).await?;
        Ok(response.user)
    }

    // ===== Activities =====

    pub async fn fetch_activities(&self, query: &ActivityQuery) -> ApiResult<Page<Activity>> {
        let response: ActivityListResponse = self.get_with_query("/activities", query).await?;
        Ok(Page {
            items: response.activities,
            pagination: Pagination {
                total: response.total,
                pages: response.pages,
                current_page: response.current_page,
            },
        })
    }

    pub async fn fetch_activity(&self, activity_id: i64) -> ApiResult<Activity> {
        let response: ActivityEnvelope = self.get(&format!("/activities/{}", activity_id)).await?;
        Ok(response.activity)
    }

    pub async fn create_activity(&self, activity: &NewActivity) -> ApiResult<Activity> {
        let response: ActivityEnvelope = self.post("/activities", activity).await?;
        Ok(response.activity)
    }

    pub async fn register_activity(&self, activity_id: i64, notes: &str) -> ApiResult<Registration> {
        let response: RegistrationEnvelope = self
            .post(
                &format!("/activities/{}/register", activity_id),
                &RegisterBody { notes },
            )
            .await?;
        Ok(response.registration)
    }

    /// Cancel the user's registration. Returns the server's confirmation text.
    pub async fn unregister_activity(&self, activity_id: i64) -> ApiResult<String> {
        let response: MessageResponse = self
            .delete(&format!("/activities/{}/unregister", activity_id))
            .await?;
        Ok(response.message)
    }

    // ===== Current user =====

    pub async fn fetch_my_registrations(
        &self,
        query: &RegistrationQuery,
    ) -> ApiResult<Page<Registration>> {
        let response: RegistrationListResponse =
            self.get_with_query("/users/my-registrations", query).await?;
        Ok(Page {
            items: response.registrations,
            pagination: Pagination {
                total: response.total,
                pages: response.pages,
                current_page: response.current_page,
            },
        })
    }

    /// Activities created by the current user
    pub async fn fetch_my_activities(&self, query: &ActivityQuery) -> ApiResult<Page<Activity>> {
        let response: ActivityListResponse =
            self.get_with_query("/users/my-activities", query).await?;
        Ok(Page {
            items: response.activities,
            pagination: Pagination {
                total: response.total,
                pages: response.pages,
                current_page: response.current_page,
            },
        })
    }

    pub async fn fetch_statistics(&self) -> ApiResult<UserStatistics> {
        self.get("/users/statistics").await
    }

    pub async fn check_in(&self, registration_id: i64) -> ApiResult<Registration> {
        let response: RegistrationEnvelope = self
            .send(self.request(Method::POST, &format!("/users/check-in/{}", registration_id)))
            .await?;
        Ok(response.registration)
    }

    pub async fn complete_activity(
        &self,
        registration_id: i64,
        rating: Option<u8>,
        feedback: Option<&str>,
    ) -> ApiResult<Registration> {
        let response: RegistrationEnvelope = self
            .post(
                &format!("/users/complete/{}", registration_id),
                &CompleteBody { rating, feedback },
            )
            .await?;
        Ok(response.registration)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TracingNotifier;
    use crate::auth::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        let session = SessionHandle::restore(Arc::new(MemoryTokenStore::new()));
        ApiClient::new(
            base,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session,
            Arc::new(TracingNotifier),
        )
        .expect("build client")
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = client("http://localhost:5000/api/");
        assert_eq!(api.base_url(), "http://localhost:5000/api");
        assert_eq!(api.url("/activities/3"), "http://localhost:5000/api/activities/3");
    }

    #[test]
    fn test_parse_activity_list_response() {
        let json = r#"{"activities": [{"id": 1, "title": "a"}, {"id": 2, "title": "b"}],
            "total": 42, "pages": 5, "current_page": 1}"#;
        let resp: ActivityListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.activities.len(), 2);
        assert_eq!((resp.total, resp.pages, resp.current_page), (42, 5, 1));
    }

    #[test]
    fn test_complete_body_omits_missing_fields() {
        let body = CompleteBody {
            rating: Some(5),
            feedback: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"rating":5}"#);
    }
}
