use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, client_id, sitter_id, service_type, scheduled_at, end_at, duration_min, price, status, recurring_series_id, visit_number, is_recurring, reschedule_history, last_modified, last_modified_by, modification_reason, version, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.client_id).bind(&booking.sitter_id).bind(&booking.service_type)
            .bind(booking.scheduled_at).bind(booking.end_at).bind(booking.duration_min).bind(&booking.price)
            .bind(booking.status).bind(&booking.recurring_series_id).bind(booking.visit_number).bind(booking.is_recurring)
            .bind(&booking.reschedule_history).bind(booking.last_modified).bind(&booking.last_modified_by)
            .bind(&booking.modification_reason).bind(booking.version).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_sitter_range(&self, sitter_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE sitter_id = ? AND scheduled_at < ? AND end_at > ? AND status != 'CANCELLED' ORDER BY scheduled_at ASC"
        )
            .bind(sitter_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_future_in_series(&self, series_id: &str, after: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE recurring_series_id = ? AND scheduled_at > ? AND status NOT IN ('COMPLETED', 'CANCELLED') ORDER BY scheduled_at ASC"
        )
            .bind(series_id).bind(after)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_if_version(&self, booking: &Booking, expected_version: i64) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET sitter_id=?, scheduled_at=?, end_at=?, duration_min=?, price=?, status=?, reschedule_history=?, last_modified=?, last_modified_by=?, modification_reason=?, version=version+1
             WHERE id=? AND version=?
             RETURNING *"
        )
            .bind(&booking.sitter_id).bind(booking.scheduled_at).bind(booking.end_at).bind(booking.duration_min)
            .bind(&booking.price).bind(booking.status).bind(&booking.reschedule_history)
            .bind(booking.last_modified).bind(&booking.last_modified_by).bind(&booking.modification_reason)
            .bind(&booking.id).bind(expected_version)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
