use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account role as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    Volunteer,
    Organizer,
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
            Role::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "volunteer" => Role::Volunteer,
            "organizer" => Role::Organizer,
            "admin" => Role::Admin,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Volunteer => write!(f, "Volunteer"),
            Role::Organizer => write!(f, "Organizer"),
            Role::Admin => write!(f, "Admin"),
            Role::Other(s) => write!(f, "{}", s),
        }
    }
}

/// The logged-in user's profile. Fields the client does not model are
/// kept in `extra` so a profile round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub volunteer_hours: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Real name when set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.real_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub real_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Editable profile fields; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.real_name.is_none() && self.phone.is_none() && self.avatar.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_keeps_unknown_fields() {
        let json = r#"{"id": 3, "username": "lin", "email": "lin@example.org", "real_name": "Lin Wei",
            "phone": "", "role": "organizer", "avatar": null, "volunteer_hours": 12.5,
            "created_at": "2024-03-01T08:30:00.123456", "is_active": true}"#;

        let user: UserProfile = serde_json::from_str(json).expect("parse profile");
        assert_eq!(user.id, 3);
        assert_eq!(user.role, Role::Organizer);
        assert_eq!(user.volunteer_hours, 12.5);
        assert!(user.created_at.is_some());
        assert_eq!(user.extra.get("is_active"), Some(&Value::Bool(true)));
        assert_eq!(user.display_name(), "Lin Wei");
    }

    #[test]
    fn test_role_round_trips_unknown_value() {
        let role: Role = serde_json::from_str(r#""coordinator""#).unwrap();
        assert_eq!(role, Role::Other("coordinator".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""coordinator""#);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id": 1, "username": "kai", "real_name": ""}"#).unwrap();
        assert_eq!(user.display_name(), "kai");
        assert_eq!(user.role, Role::Volunteer);
    }

    #[test]
    fn test_parse_profile_with_null_hours_and_role() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id": 2, "username": "mo", "role": null, "volunteer_hours": null}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Volunteer);
        assert_eq!(user.volunteer_hours, 0.0);
        assert!(user.extra.is_empty());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("555-0100".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"phone":"555-0100"}"#);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }
}
