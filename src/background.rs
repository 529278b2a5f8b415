use std::sync::Arc;
use std::time::Duration;
use serde_json::json;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};

use crate::domain::models::audit::AuditEvent;
use crate::domain::models::booking::{Booking, BookingStatus, NewBookingParams};
use crate::domain::models::job::{Job, JOB_WAITLIST_PROMOTE};
use crate::domain::models::waitlist::WaitlistStatus;
use crate::domain::services::waitlist::{select_promotion, FreedSlot};
use crate::error::AppError;
use crate::state::AppState;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    loop {
        match state.job_repo.find_pending(10).await {
            Ok(jobs) => {
                for job in jobs {
                    let span = info_span!(
                        "background_job",
                        job_id = %job.id,
                        job_type = %job.job_type,
                        booking_id = %job.payload.booking_id
                    );

                    let state = state.clone();

                    async move {
                        info!("Processing job: {}", job.job_type);
                        match process_job(&state, &job).await {
                            Ok(_) => {
                                info!("Job completed successfully");
                                if let Err(e) = state.job_repo.update_status(&job.id, "COMPLETED", None).await {
                                    error!("Failed to mark job as completed: {:?}", e);
                                }
                            }
                            Err(e) => {
                                let err_msg = format!("{}", e);
                                error!("Job failed with error: {}", err_msg);
                                if let Err(up_err) = state.job_repo.update_status(&job.id, "FAILED", Some(err_msg)).await {
                                    error!("Failed to mark job as failed: {:?}", up_err);
                                }
                            }
                        }
                    }
                        .instrument(span)
                        .await;
                }
            }
            Err(e) => error!("Failed to fetch pending jobs: {:?}", e),
        }
        sleep(Duration::from_secs(5)).await;
    }
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    match job.job_type.as_str() {
        JOB_WAITLIST_PROMOTE => promote_into_freed_slot(state, &job.payload.booking_id).await,
        other => Err(AppError::InternalWithMsg(format!("Unknown job type {}", other))),
    }
}

/// Fills the slot freed by a cancelled booking from the waitlist. The
/// WAITING -> PROMOTED transition is status-guarded, so a racing promotion
/// or client cancellation wins and this run becomes a no-op.
async fn promote_into_freed_slot(state: &Arc<AppState>, booking_id: &str) -> Result<(), AppError> {
    let cancelled = state.booking_repo.find_by_id(booking_id).await?
        .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))?;

    if cancelled.status != BookingStatus::Cancelled {
        info!("Booking {} is not cancelled; skipping promotion", booking_id);
        return Ok(());
    }

    let schedule = state.config.schedule_policy();
    let local = cancelled.scheduled_at.with_timezone(&schedule.timezone);
    let slot = FreedSlot {
        service_type: cancelled.service_type.clone(),
        date: local.date_naive(),
        time: local.time(),
    };

    let entries = state.waitlist_repo.list_waiting(&slot.service_type, slot.date).await?;
    let chosen = match select_promotion(&slot, entries, state.config.waitlist_match_window_min) {
        Some(entry) => entry,
        None => {
            info!("No waitlist match for freed {} slot on {}", slot.service_type, slot.date);
            return Ok(());
        }
    };

    if !state.waitlist_repo.transition(&chosen.id, WaitlistStatus::Promoted).await? {
        info!("Waitlist entry {} already terminal; nothing to promote", chosen.id);
        return Ok(());
    }

    // The promoted booking takes the freed slot: the cancelled booking's
    // sitter and price, the entry's client and duration. It starts as
    // PENDING so an admin confirms it before the sitter is committed.
    let booking = Booking::new(NewBookingParams {
        client_id: chosen.client_id.clone(),
        sitter_id: cancelled.sitter_id.clone(),
        service_type: chosen.service_type.clone(),
        scheduled_at: cancelled.scheduled_at,
        duration_min: chosen.duration_min,
        price: cancelled.price.clone(),
    });
    let created = state.booking_repo.create(&booking).await?;

    state.audit_trail.record(AuditEvent::new(
        "waitlist_promoted",
        "system",
        "waitlist_entry",
        &chosen.id,
        json!({
            "booking_id": created.id,
            "scheduled_at": created.scheduled_at,
            "freed_by": booking_id,
        }),
    ));

    info!("Promoted waitlist entry {} into booking {}", chosen.id, created.id);
    Ok(())
}
