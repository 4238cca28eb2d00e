//! Voluntrack core - client library for the community volunteer service.
//!
//! This crate provides the pieces a front end needs to talk to the
//! volunteer-activity REST API:
//!
//! - `api`: HTTP gateway with bearer auth and error classification
//! - `auth`: session state, login/logout and token persistence
//! - `store`: cached activity data and the `AppState` that ties it together
//! - `router`: route table and navigation guard
//! - `models`: data types exchanged with the server
//! - `config`: client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod store;

pub use api::{ApiClient, ApiError, ApiResult, NotificationQueue, Notifier, TracingNotifier};
pub use auth::{AuthStore, Session, SessionHandle, TokenStore};
pub use config::Config;
pub use router::{Navigation, Route};
pub use store::{ActivityStore, AppState};
