use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Activity;

/// Lifecycle of a signup: registered -> checked_in -> completed, or cancelled
/// before completion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    CheckedIn,
    Completed,
    Cancelled,
    Other(String),
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::CheckedIn => "checked_in",
            RegistrationStatus::Completed => "completed",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Other(s) => s,
        }
    }
}

impl From<String> for RegistrationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "registered" => RegistrationStatus::Registered,
            "checked_in" => RegistrationStatus::CheckedIn,
            "completed" => RegistrationStatus::Completed,
            "cancelled" => RegistrationStatus::Cancelled,
            _ => RegistrationStatus::Other(s),
        }
    }
}

impl From<RegistrationStatus> for String {
    fn from(status: RegistrationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Registered => write!(f, "Registered"),
            RegistrationStatus::CheckedIn => write!(f, "Checked In"),
            RegistrationStatus::Completed => write!(f, "Completed"),
            RegistrationStatus::Cancelled => write!(f, "Cancelled"),
            RegistrationStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub activity_id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: RegistrationStatus,
    #[serde(default)]
    pub registration_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub check_in_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub completion_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
    // Only present in the my-registrations listing
    #[serde(default)]
    pub activity: Option<Activity>,
}

impl Registration {
    pub fn can_check_in(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }

    pub fn can_complete(&self) -> bool {
        self.status == RegistrationStatus::CheckedIn
    }

    pub fn can_cancel(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }
}

/// Query parameters for the my-registrations listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RegistrationStatus>,
}
