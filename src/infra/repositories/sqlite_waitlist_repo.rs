use crate::domain::{
    models::waitlist::{WaitlistEntry, WaitlistStatus},
    ports::WaitlistRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteWaitlistRepo {
    pool: SqlitePool,
}

impl SqliteWaitlistRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistRepository for SqliteWaitlistRepo {
    async fn create(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "INSERT INTO waitlist_entries (id, client_id, client_name, client_email, client_phone, service_type, requested_date, requested_time, duration_min, pets, special_instructions, priority, estimated_wait_min, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&entry.id).bind(&entry.client_id).bind(&entry.client_name).bind(&entry.client_email)
            .bind(&entry.client_phone).bind(&entry.service_type).bind(entry.requested_date).bind(entry.requested_time)
            .bind(entry.duration_min).bind(&entry.pets).bind(&entry.special_instructions)
            .bind(entry.priority).bind(entry.estimated_wait_min).bind(entry.status).bind(entry.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_waiting(&self, service_type: &str, date: NaiveDate) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "SELECT * FROM waitlist_entries WHERE service_type = ? AND requested_date = ? AND status = 'WAITING' ORDER BY created_at ASC"
        )
            .bind(service_type).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition(&self, id: &str, to: WaitlistStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE waitlist_entries SET status = ? WHERE id = ? AND status = 'WAITING'")
            .bind(to).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
