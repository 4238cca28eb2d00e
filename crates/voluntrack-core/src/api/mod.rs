//! HTTP gateway to the volunteer service.
//!
//! This module provides the `ApiClient` for talking to the REST API, the
//! `ApiError` taxonomy its failures are classified into, and the
//! `Notifier` seam through which failures reach the user.
//!
//! The API uses bearer token authentication obtained from `/auth/login`.

pub mod client;
pub mod error;
pub mod notify;

pub use client::{ApiClient, ApiResult, LoginResponse, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
pub use notify::{NotificationQueue, Notifier, TracingNotifier};
