use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Terminal statuses accept no further reschedule or cancellation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RescheduleRecord {
    pub original_date: DateTime<Utc>,
    pub new_date: DateTime<Utc>,
    pub reason: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub sitter_id: Option<String>,
    pub service_type: String,
    pub scheduled_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub duration_min: i32,
    pub price: String,
    pub status: BookingStatus,
    pub recurring_series_id: Option<String>,
    pub visit_number: Option<i32>,
    pub is_recurring: bool,
    pub reschedule_history: Json<Vec<RescheduleRecord>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub modification_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub client_id: String,
    pub sitter_id: Option<String>,
    pub service_type: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub price: String,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let end_at = params.scheduled_at + Duration::minutes(params.duration_min as i64);

        Self {
            id: Uuid::new_v4().to_string(),
            client_id: params.client_id,
            sitter_id: params.sitter_id,
            service_type: params.service_type,
            scheduled_at: params.scheduled_at,
            end_at,
            duration_min: params.duration_min,
            price: params.price,
            status: BookingStatus::Pending,
            recurring_series_id: None,
            visit_number: None,
            is_recurring: false,
            reschedule_history: Json(Vec::new()),
            last_modified: None,
            last_modified_by: None,
            modification_reason: None,
            version: 0,
            created_at: Utc::now(),
        }
    }
}
