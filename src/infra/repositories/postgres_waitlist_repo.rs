use crate::domain::{
    models::waitlist::{WaitlistEntry, WaitlistStatus},
    ports::WaitlistRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::NaiveDate;

pub struct PostgresWaitlistRepo {
    pool: PgPool,
}

impl PostgresWaitlistRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistRepository for PostgresWaitlistRepo {
    async fn create(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "INSERT INTO waitlist_entries (id, client_id, client_name, client_email, client_phone, service_type, requested_date, requested_time, duration_min, pets, special_instructions, priority, estimated_wait_min, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING *"
        )
            .bind(&entry.id).bind(&entry.client_id).bind(&entry.client_name).bind(&entry.client_email)
            .bind(&entry.client_phone).bind(&entry.service_type).bind(entry.requested_date).bind(entry.requested_time)
            .bind(entry.duration_min).bind(&entry.pets).bind(&entry.special_instructions)
            .bind(entry.priority).bind(entry.estimated_wait_min).bind(entry.status).bind(entry.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_waiting(&self, service_type: &str, date: NaiveDate) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "SELECT * FROM waitlist_entries WHERE service_type = $1 AND requested_date = $2 AND status = 'WAITING' ORDER BY created_at ASC"
        )
            .bind(service_type).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition(&self, id: &str, to: WaitlistStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE waitlist_entries SET status = $1 WHERE id = $2 AND status = 'WAITING'")
            .bind(to).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
