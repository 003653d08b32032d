use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session as served by the session service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// Coach profile as served by the user service
///
/// `name` and `avatar_url` are absent on the placeholder built when the
/// profile lookup degrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachProfileData {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl CoachProfileData {
    pub fn placeholder(coach_id: Uuid) -> Self {
        Self {
            id: coach_id,
            name: None,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetailsResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    pub capacity: i32,
    pub coach: CoachProfileData,
    pub created_at: DateTime<Utc>,
}

impl SessionDetailsResponse {
    pub fn compose(session: SessionData, coach: CoachProfileData) -> Self {
        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            start_at: session.start_at,
            end_at: session.end_at,
            capacity: session.capacity,
            coach,
            created_at: session.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_serializes_nulls() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(CoachProfileData::placeholder(id)).unwrap();

        assert_eq!(json["id"], id.to_string());
        assert!(json["name"].is_null());
        assert!(json["avatar_url"].is_null());
    }

    #[test]
    fn test_session_decodes_without_optional_fields() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "coach_id": Uuid::new_v4(),
            "title": "Mobility",
            "start_at": "2026-03-01T07:00:00Z",
            "capacity": 12,
            "created_at": "2026-02-20T10:00:00Z",
            "status": "scheduled"
        });

        let session: SessionData = serde_json::from_value(json).unwrap();
        assert_eq!(session.description, "");
        assert!(session.end_at.is_none());
    }
}
