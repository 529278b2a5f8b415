use crate::domain::{models::audit::AuditEvent, ports::AuditLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAuditRepo {
    pool: PgPool,
}

impl PostgresAuditRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditRepo {
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_events (id, action, user_id, resource_type, resource_id, details, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(&event.id).bind(&event.action).bind(&event.user_id).bind(&event.resource_type)
            .bind(&event.resource_id).bind(&event.details).bind(event.created_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_by_resource(&self, resource_type: &str, resource_id: &str) -> Result<Vec<AuditEvent>, AppError> {
        sqlx::query_as::<_, AuditEvent>(
            "SELECT * FROM audit_events WHERE resource_type = $1 AND resource_id = $2 ORDER BY created_at DESC"
        )
            .bind(resource_type).bind(resource_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
