use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
    Other(String),
}

impl ActivityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityStatus::Active => "active",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Cancelled => "cancelled",
            ActivityStatus::Other(s) => s,
        }
    }
}

impl From<String> for ActivityStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => ActivityStatus::Active,
            "completed" => ActivityStatus::Completed,
            "cancelled" => ActivityStatus::Cancelled,
            _ => ActivityStatus::Other(s),
        }
    }
}

impl From<ActivityStatus> for String {
    fn from(status: ActivityStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityStatus::Active => write!(f, "Active"),
            ActivityStatus::Completed => write!(f, "Completed"),
            ActivityStatus::Cancelled => write!(f, "Cancelled"),
            ActivityStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub location: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub max_participants: u32,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub current_participants: u32,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: ActivityStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub volunteer_hours: f64,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_full: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
}

impl Activity {
    /// Remaining places, zero once the activity is full
    pub fn spots_left(&self) -> u32 {
        self.max_participants.saturating_sub(self.current_participants)
    }

    /// Whether the server would accept a new registration right now
    pub fn accepts_registrations(&self) -> bool {
        self.is_active && !self.is_full
    }
}

/// Payload for `POST /activities`.
#[derive(Debug, Clone, Serialize)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Query parameters for the activity list. The server defaults to
/// page 1, 10 per page, status `active`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ActivityQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVITY_JSON: &str = r#"{
        "id": 7, "title": "River cleanup", "description": "Bring gloves",
        "location": "East bank", "start_time": "2026-11-02T09:00:00",
        "end_time": "2026-11-02T12:00:00", "max_participants": 20,
        "current_participants": 20, "status": "active", "category": "environment",
        "volunteer_hours": 3.0, "requirements": "", "contact_person": "Ana",
        "contact_phone": "555-0101", "image_url": "", "created_by": 2,
        "created_at": "2026-10-01T10:11:12.000001", "is_full": true, "is_active": true
    }"#;

    #[test]
    fn test_parse_activity() {
        let activity: Activity = serde_json::from_str(ACTIVITY_JSON).expect("parse activity");
        assert_eq!(activity.id, 7);
        assert_eq!(activity.status, ActivityStatus::Active);
        assert_eq!(activity.spots_left(), 0);
        assert!(!activity.accepts_registrations());
        assert_eq!(activity.created_by, Some(2));
    }

    #[test]
    fn test_parse_activity_with_null_times() {
        let activity: Activity = serde_json::from_str(
            r#"{"id": 1, "title": "t", "start_time": null, "end_time": null, "status": "paused"}"#,
        )
        .unwrap();
        assert!(activity.start_time.is_none());
        assert_eq!(activity.status, ActivityStatus::Other("paused".to_string()));
        assert_eq!(activity.max_participants, 0);
    }

    #[test]
    fn test_parse_activity_with_null_columns() {
        let activity: Activity = serde_json::from_str(
            r#"{"id": 4, "title": "Food bank", "location": null, "start_time": null,
                "end_time": null, "max_participants": null, "current_participants": null,
                "status": null, "volunteer_hours": null, "is_full": null, "is_active": null}"#,
        )
        .expect("null columns fall back to defaults");
        assert_eq!(activity.location, "");
        assert_eq!(activity.volunteer_hours, 0.0);
        assert_eq!(activity.status, ActivityStatus::Active);
        assert_eq!(activity.spots_left(), 0);
        assert!(!activity.is_full);
    }

    #[test]
    fn test_activity_query_serializes_only_set_fields() {
        let query = ActivityQuery {
            page: Some(2),
            status: Some(ActivityStatus::Completed),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({"page": 2, "status": "completed"}));
    }
}
