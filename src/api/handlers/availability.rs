use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{AvailabilityCheckParams, SlotQueryParams};
use crate::api::dtos::responses::{AvailabilityResponse, SlotsResponse};
use crate::domain::services::availability::{enumerate_slots, slot_status, AvailabilityStatus};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tracing::warn;

/// Point check for one candidate window. A failed snapshot fetch is
/// reported as `unknown` — the caller decides whether that blocks; it is
/// never silently treated as available.
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(sitter_id): Path<String>,
    Query(params): Query<AvailabilityCheckParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.duration <= 0 {
        return Err(AppError::Validation("duration must be positive".into()));
    }

    let start = DateTime::parse_from_rfc3339(&params.start)
        .map_err(|_| AppError::Validation("Invalid start time (RFC3339 expected)".into()))?
        .with_timezone(&Utc);
    let end = start + Duration::minutes(params.duration as i64);

    let status = match state.booking_repo.list_by_sitter_range(&sitter_id, start, end).await {
        Ok(existing) => slot_status(&existing, start, params.duration),
        Err(e) => {
            warn!("Could not fetch commitments for sitter {}: {:?}", sitter_id, e);
            AvailabilityStatus::Unknown
        }
    };

    Ok(Json(AvailabilityResponse { status }))
}

/// Enumerates conflict-free slots for one day at the configured
/// granularity. Unlike the point check, this endpoint cannot answer
/// without the commitment snapshot, so a failed fetch is a 503.
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(sitter_id): Path<String>,
    Query(params): Query<SlotQueryParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.duration <= 0 {
        return Err(AppError::Validation("duration must be positive".into()));
    }

    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let schedule = state.config.schedule_policy();
    let tz = schedule.timezone;

    let day_start = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .ok_or(AppError::Validation("Invalid date in business timezone".into()))?
        .with_timezone(&Utc);
    let day_end = tz.from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
        .single()
        .ok_or(AppError::Validation("Invalid date in business timezone".into()))?
        .with_timezone(&Utc);

    let existing = state.booking_repo
        .list_by_sitter_range(&sitter_id, day_start, day_end + Duration::minutes(params.duration as i64))
        .await
        .map_err(|e| {
            warn!("Could not fetch commitments for sitter {}: {:?}", sitter_id, e);
            AppError::Unavailable("Could not fetch sitter commitments".into())
        })?;

    let slots = enumerate_slots(&schedule, date, params.duration, &existing);

    Ok(Json(SlotsResponse {
        date: params.date,
        duration_min: params.duration,
        slots,
    }))
}
