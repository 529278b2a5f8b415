use petsit_backend::{
    api::router::create_router,
    background::start_background_worker,
    config::Config,
    domain::models::booking::{Booking, BookingStatus, NewBookingParams},
    domain::services::audit_trail::AuditTrailService,
    infra::repositories::{
        sqlite_audit_repo::SqliteAuditRepo,
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_job_repo::SqliteJobRepo,
        sqlite_waitlist_repo::SqliteWaitlistRepo,
    },
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use axum::Router;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            business_timezone: "UTC".to_string(),
            business_open_hour: 8,
            business_close_hour: 20,
            slot_interval_min: 30,
            waitlist_match_window_min: 0,
            reschedule_commit_retries: 3,
        };

        let audit_repo = Arc::new(SqliteAuditRepo::new(pool.clone()));

        let state = Arc::new(AppState {
            config,
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            waitlist_repo: Arc::new(SqliteWaitlistRepo::new(pool.clone())),
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            audit_trail: AuditTrailService::new(audit_repo.clone()),
            audit_repo,
        });

        // Start Background Worker
        let worker_state = state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Seeds a confirmed booking directly through the repository. Booking
    /// creation is outside the change engine's API surface, so tests plant
    /// their fixtures at the storage layer.
    pub async fn seed_booking(
        &self,
        sitter_id: &str,
        scheduled_at: DateTime<Utc>,
        duration_min: i32,
        price: &str,
    ) -> Booking {
        let mut booking = Booking::new(NewBookingParams {
            client_id: "client-fixture".to_string(),
            sitter_id: Some(sitter_id.to_string()),
            service_type: "dog-walk".to_string(),
            scheduled_at,
            duration_min,
            price: price.to_string(),
        });
        booking.status = BookingStatus::Approved;

        self.state
            .booking_repo
            .create(&booking)
            .await
            .expect("Failed to seed booking")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
