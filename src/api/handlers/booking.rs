use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::ActorId;
use crate::api::dtos::requests::{CancelBookingRequest, CancellationQuoteParams, RescheduleBookingRequest};
use crate::api::dtos::responses::{CancellationResponse, CancelledBookingResponse};
use crate::domain::models::audit::AuditEvent;
use crate::domain::models::booking::{Booking, BookingStatus, RescheduleRecord};
use crate::domain::models::job::{Job, JOB_WAITLIST_PROMOTE};
use crate::domain::services::availability::{slot_status, AvailabilityStatus};
use crate::domain::services::policy::{assess_cancellation, assess_reschedule, CancellationScope};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

/// Resolves a `date` + `time` pair (HH:MM or RFC3339) to a UTC instant via
/// the business timezone.
pub fn parse_target_time(tz: &Tz, date: &str, time: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let time = if time.contains('T') {
        let dt = DateTime::parse_from_rfc3339(time)
            .map_err(|_| AppError::Validation("Invalid ISO time format".into()))?;
        dt.with_timezone(tz).time()
    } else {
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?
    };

    tz.from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))
        .map(|dt| dt.with_timezone(&Utc))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}

pub async fn cancellation_quote(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Query(params): Query<CancellationQuoteParams>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    let scope = params.scope.unwrap_or(CancellationScope::Single);
    let now = Utc::now();
    let assessment = assess_cancellation(&booking, scope, now)?;

    // A series quote breaks the refund down per future visit, each
    // computed from its own scheduled time.
    let mut series = Vec::new();
    if scope == CancellationScope::Series && assessment.eligible {
        if let Some(series_id) = booking.recurring_series_id.as_deref() {
            for member in state.booking_repo.list_future_in_series(series_id, now).await? {
                let quote = assess_cancellation(&member, CancellationScope::Single, now)?;
                series.push(json!({
                    "booking_id": member.id,
                    "scheduled_at": member.scheduled_at,
                    "refund_rate": quote.refund_rate,
                    "refund_amount": quote.refund_amount,
                }));
            }
        }
    }

    Ok(Json(json!({
        "eligible": assessment.eligible,
        "reasons": assessment.reasons,
        "refund_rate": assessment.refund_rate,
        "refund_amount": assessment.refund_amount,
        "scope": scope,
        "series": series,
    })))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    ActorId(actor): ActorId,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    let scope = payload.scope.unwrap_or(CancellationScope::Single);
    let assessment = assess_cancellation(&booking, scope, Utc::now())?;
    if !assessment.eligible {
        return Err(AppError::Ineligible(assessment.reasons));
    }

    let targets = if scope == CancellationScope::Series {
        let series_id = booking.recurring_series_id.clone()
            .ok_or(AppError::DataIntegrity(format!("Recurring booking {} has no series id", booking.id)))?;
        let members = state.booking_repo.list_future_in_series(&series_id, Utc::now()).await?;
        if members.is_empty() { vec![booking] } else { members }
    } else {
        vec![booking]
    };

    let mut cancelled = Vec::new();
    let mut total_refund = Decimal::ZERO;

    for target in targets {
        let outcome = cancel_one(&state, target, &actor, payload.reason.as_deref()).await?;
        total_refund += outcome.refund_amount;
        cancelled.push(outcome);
    }

    info!("Cancelled {} booking(s), scope {:?}", cancelled.len(), scope);
    Ok(Json(CancellationResponse { cancelled, total_refund }))
}

/// Cancels a single booking with a version-guarded commit. On a version
/// conflict the snapshot is re-read and re-assessed before retrying, so a
/// booking completed or cancelled by a concurrent actor is refused rather
/// than overwritten.
async fn cancel_one(
    state: &Arc<AppState>,
    mut booking: Booking,
    actor: &str,
    reason: Option<&str>,
) -> Result<CancelledBookingResponse, AppError> {
    for attempt in 0..=state.config.reschedule_commit_retries {
        let now = Utc::now();
        let assessment = assess_cancellation(&booking, CancellationScope::Single, now)?;
        if !assessment.eligible {
            return Err(AppError::Ineligible(assessment.reasons));
        }

        let mut update = booking.clone();
        update.status = BookingStatus::Cancelled;
        update.last_modified = Some(now);
        update.last_modified_by = Some(actor.to_string());
        update.modification_reason = reason.map(|r| r.to_string());

        match state.booking_repo.update_if_version(&update, booking.version).await? {
            Some(saved) => {
                state.audit_trail.record(AuditEvent::new(
                    "booking_cancelled",
                    actor,
                    "booking",
                    &saved.id,
                    json!({
                        "refund_rate": assessment.refund_rate,
                        "refund_amount": assessment.refund_amount,
                        "reason": reason,
                    }),
                ));

                // Hand the freed slot to the waitlist worker.
                let job = Job::new(JOB_WAITLIST_PROMOTE, saved.id.clone(), Utc::now());
                state.job_repo.create(&job).await?;

                info!("Booking cancelled: {} (refund rate {}%)", saved.id, assessment.refund_rate);
                return Ok(CancelledBookingResponse {
                    booking: saved,
                    refund_rate: assessment.refund_rate,
                    refund_amount: assessment.refund_amount,
                });
            }
            None => {
                warn!("Version conflict cancelling booking {} (attempt {})", booking.id, attempt + 1);
                booking = state.booking_repo.find_by_id(&booking.id).await?
                    .ok_or(AppError::NotFound("Booking disappeared during cancellation".into()))?;
            }
        }
    }

    Err(AppError::Conflict("Booking was modified concurrently; please retry".into()))
}

pub async fn reschedule_preview(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    let schedule = state.config.schedule_policy();
    let proposed = parse_target_time(&schedule.timezone, &payload.date, &payload.time)?;
    let assessment = assess_reschedule(&booking, proposed, &payload.reason, Utc::now(), &schedule);

    let availability = match booking.sitter_id.as_deref() {
        None => AvailabilityStatus::Available,
        Some(sitter_id) => {
            let window_end = proposed + Duration::minutes(booking.duration_min as i64);
            match state.booking_repo.list_by_sitter_range(sitter_id, proposed, window_end).await {
                Ok(existing) => {
                    let others: Vec<Booking> = existing.into_iter().filter(|b| b.id != booking.id).collect();
                    slot_status(&others, proposed, booking.duration_min)
                }
                Err(e) => {
                    warn!("Could not fetch sitter commitments for preview: {:?}", e);
                    AvailabilityStatus::Unknown
                }
            }
        }
    };

    Ok(Json(json!({
        "eligible": assessment.eligible,
        "reasons": assessment.reasons,
        "surcharge": assessment.surcharge,
        "availability": availability,
    })))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    ActorId(actor): ActorId,
    Path(booking_id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state.config.schedule_policy();
    let proposed = parse_target_time(&schedule.timezone, &payload.date, &payload.time)?;

    // Availability is re-checked inside the retry loop: losing the version
    // race means someone else committed, and the slot picture may have
    // changed under us.
    for attempt in 0..=state.config.reschedule_commit_retries {
        let booking = state.booking_repo.find_by_id(&booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let now = Utc::now();
        let assessment = assess_reschedule(&booking, proposed, &payload.reason, now, &schedule);
        if !assessment.eligible {
            return Err(AppError::Ineligible(assessment.reasons));
        }

        if let Some(sitter_id) = booking.sitter_id.as_deref() {
            let window_end = proposed + Duration::minutes(booking.duration_min as i64);
            let existing = state.booking_repo
                .list_by_sitter_range(sitter_id, proposed, window_end)
                .await
                .map_err(|e| {
                    warn!("Could not verify sitter availability: {:?}", e);
                    AppError::Unavailable("Could not verify sitter availability".into())
                })?;

            let others: Vec<Booking> = existing.into_iter().filter(|b| b.id != booking.id).collect();
            if slot_status(&others, proposed, booking.duration_min) == AvailabilityStatus::Conflict {
                return Err(AppError::Conflict("Sitter already has a booking in the requested window".into()));
            }
        }

        let mut update = booking.clone();
        update.scheduled_at = proposed;
        update.end_at = proposed + Duration::minutes(booking.duration_min as i64);
        update.reschedule_history.0.push(RescheduleRecord {
            original_date: booking.scheduled_at,
            new_date: proposed,
            reason: payload.reason.clone(),
            changed_at: now,
            changed_by: actor.clone(),
        });
        update.last_modified = Some(now);
        update.last_modified_by = Some(actor.clone());
        update.modification_reason = Some(payload.reason.clone());

        match state.booking_repo.update_if_version(&update, booking.version).await? {
            Some(saved) => {
                state.audit_trail.record(AuditEvent::new(
                    "booking_rescheduled",
                    &actor,
                    "booking",
                    &saved.id,
                    json!({
                        "from": booking.scheduled_at,
                        "to": proposed,
                        "surcharge": assessment.surcharge,
                        "reason": payload.reason,
                    }),
                ));

                info!("Rescheduled booking {} to {}", saved.id, proposed);
                return Ok(Json(json!({
                    "booking": saved,
                    "surcharge": assessment.surcharge,
                })));
            }
            None => {
                warn!("Version conflict rescheduling booking {} (attempt {})", booking_id, attempt + 1);
            }
        }
    }

    Err(AppError::Conflict("Booking was modified concurrently; please retry".into()))
}

pub async fn booking_audit(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    let events = state.audit_repo.list_by_resource("booking", &booking_id).await?;
    Ok(Json(events))
}
