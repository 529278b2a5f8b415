use std::sync::Arc;

use tracing::warn;

use crate::domain::models::audit::AuditEvent;
use crate::domain::ports::AuditLogRepository;

/// Fire-and-forget audit recorder. A failed write is logged and dropped;
/// the business operation that produced the event has already committed.
#[derive(Clone)]
pub struct AuditTrailService {
    repo: Arc<dyn AuditLogRepository>,
}

impl AuditTrailService {
    pub fn new(repo: Arc<dyn AuditLogRepository>) -> Self {
        Self { repo }
    }

    pub fn record(&self, event: AuditEvent) {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record(&event).await {
                warn!(
                    action = %event.action,
                    resource_id = %event.resource_id,
                    "Failed to record audit event: {:?}", e
                );
            }
        });
    }
}
