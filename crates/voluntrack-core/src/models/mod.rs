//! Data models for Voluntrack entities.
//!
//! This module contains the structures exchanged with the volunteer
//! service:
//!
//! - `UserProfile`, `Role`: the account and its permissions
//! - `Activity`, `ActivityStatus`: volunteer activities
//! - `Registration`, `RegistrationStatus`: a user's signup for an activity
//! - `UserStatistics`: per-user totals
//! - `Pagination`, `Page`: list descriptors returned with paged listings
//! - Request payloads and query parameters

pub mod activity;
pub mod registration;
pub mod statistics;
pub mod user;

use serde::{Deserialize, Deserializer, Serialize};

pub use activity::{Activity, ActivityQuery, ActivityStatus, NewActivity};
pub use registration::{Registration, RegistrationQuery, RegistrationStatus};
pub use statistics::UserStatistics;
pub use user::{Credentials, NewUser, ProfileUpdate, Role, UserProfile};

/// Where a paged listing currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            pages: 0,
            current_page: 1,
        }
    }
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.current_page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Deserialize an explicit `null` the same way as a missing field.
///
/// The service leaves nullable columns as `null` in its JSON, so a field
/// with a sensible default must accept both shapes.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a listing together with its pagination descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default_starts_on_first_page() {
        let p = Pagination::default();
        assert_eq!((p.total, p.pages, p.current_page), (0, 0, 1));
        assert!(!p.has_next());
        assert!(!p.has_prev());
    }

    #[test]
    fn test_pagination_navigation() {
        let p = Pagination {
            total: 42,
            pages: 5,
            current_page: 3,
        };
        assert!(p.has_next());
        assert!(p.has_prev());
    }
}
