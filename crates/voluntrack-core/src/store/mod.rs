//! Client-side state containers.
//!
//! - `ActivityStore`: cached activity lists, detail, registrations and the
//!   pagination descriptor
//! - `AppState`: owns the gateway and both stores
//!
//! Caches start empty, are filled by successful fetches and are only ever
//! replaced by later fetches. There is no eviction.

pub mod activities;
pub mod app;

pub use activities::{ActivityCache, ActivityStore};
pub use app::AppState;
