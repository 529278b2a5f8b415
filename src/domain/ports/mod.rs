use crate::domain::models::{
    audit::AuditEvent,
    booking::Booking,
    job::Job,
    waitlist::{WaitlistEntry, WaitlistStatus},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// Active (non-cancelled) bookings for a sitter whose window intersects [start, end).
    async fn list_by_sitter_range(&self, sitter_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Future, not-yet-completed, not-cancelled members of a recurring series.
    async fn list_future_in_series(&self, series_id: &str, after: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Version-guarded write. Returns `None` when the stored version no longer
    /// matches `expected_version` (a concurrent commit won).
    async fn update_if_version(&self, booking: &Booking, expected_version: i64) -> Result<Option<Booking>, AppError>;
}

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    async fn create(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistEntry>, AppError>;
    async fn list_waiting(&self, service_type: &str, date: NaiveDate) -> Result<Vec<WaitlistEntry>, AppError>;
    /// Guarded transition out of WAITING. Returns `false` when the entry was
    /// already terminal (promotion raced, or the entry was cancelled).
    async fn transition(&self, id: &str, to: WaitlistStatus) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError>;
    async fn list_by_resource(&self, resource_type: &str, resource_id: &str) -> Result<Vec<AuditEvent>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}
