use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "log_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Create,
    Update,
    Delete,
    View,
}

impl LogAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "VIEW" => Some(Self::View),
            _ => None,
        }
    }
}

/// One immutable audit record. Entries carry the acting user's id and display
/// name at the time of the action, with no foreign keys back to users or
/// vehicles.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub action: LogAction,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub occurred_at: DateTime<Utc>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
}
