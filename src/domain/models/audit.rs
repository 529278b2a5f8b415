use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AuditEvent {
    pub id: String,
    pub action: String,
    pub user_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        action: &str,
        user_id: &str,
        resource_type: &str,
        resource_id: &str,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            user_id: user_id.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details: Json(details),
            created_at: Utc::now(),
        }
    }
}
