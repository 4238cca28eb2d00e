use serde::{Deserialize, Serialize};

/// Per-user totals from `GET /users/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub total_registrations: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub completed_activities: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub checked_in_activities: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub cancelled_activities: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub volunteer_hours: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_activities: u64,
}

impl UserStatistics {
    /// Share of registrations that reached completion, as a percentage
    pub fn completion_rate(&self) -> f64 {
        if self.total_registrations == 0 {
            return 0.0;
        }
        self.completed_activities as f64 * 100.0 / self.total_registrations as f64
    }
}
