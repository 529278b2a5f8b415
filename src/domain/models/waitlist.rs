use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    Waiting,
    Promoted,
    Cancelled,
}

impl WaitlistStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WaitlistStatus::Promoted | WaitlistStatus::Cancelled)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WaitlistEntry {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_type: String,
    pub requested_date: NaiveDate,
    pub requested_time: NaiveTime,
    pub duration_min: i32,
    pub pets: Json<Vec<String>>,
    pub special_instructions: Option<String>,
    pub priority: i32,
    pub estimated_wait_min: i32,
    pub status: WaitlistStatus,
    pub created_at: DateTime<Utc>,
}

pub struct NewWaitlistParams {
    pub client_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_type: String,
    pub requested_date: NaiveDate,
    pub requested_time: NaiveTime,
    pub duration_min: i32,
    pub pets: Vec<String>,
    pub special_instructions: Option<String>,
    pub priority: i32,
    pub estimated_wait_min: i32,
}

impl WaitlistEntry {
    pub fn new(params: NewWaitlistParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: params.client_id,
            client_name: params.client_name,
            client_email: params.client_email,
            client_phone: params.client_phone,
            service_type: params.service_type,
            requested_date: params.requested_date,
            requested_time: params.requested_time,
            duration_min: params.duration_min,
            pets: Json(params.pets),
            special_instructions: params.special_instructions,
            priority: params.priority,
            estimated_wait_min: params.estimated_wait_min,
            status: WaitlistStatus::Waiting,
            created_at: Utc::now(),
        }
    }
}
