use std::sync::Arc;
use crate::domain::ports::{
    AuditLogRepository, BookingRepository, JobRepository, WaitlistRepository,
};
use crate::domain::services::audit_trail::AuditTrailService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub waitlist_repo: Arc<dyn WaitlistRepository>,
    pub audit_repo: Arc<dyn AuditLogRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub audit_trail: AuditTrailService,
}
