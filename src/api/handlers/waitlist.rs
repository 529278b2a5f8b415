use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::ActorId;
use crate::api::dtos::requests::{JoinWaitlistRequest, WaitlistQueryParams};
use crate::domain::models::audit::AuditEvent;
use crate::domain::models::waitlist::{NewWaitlistParams, WaitlistEntry, WaitlistStatus};
use crate::domain::services::waitlist::rank;
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tracing::info;

pub async fn join_waitlist(
    State(state): State<Arc<AppState>>,
    ActorId(actor): ActorId,
    Json(payload): Json<JoinWaitlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.duration_min <= 0 {
        return Err(AppError::Validation("duration_min must be positive".into()));
    }
    if payload.client_name.trim().is_empty() || payload.client_email.trim().is_empty() {
        return Err(AppError::Validation("Client name and email are required".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    let priority = payload.priority.unwrap_or(0);

    // Advisory only: entries already waiting with equal-or-higher priority
    // are served first, and equal priority breaks ties by age.
    let ahead = state.waitlist_repo
        .list_waiting(&payload.service_type, date)
        .await?
        .iter()
        .filter(|e| e.priority >= priority)
        .count() as i32;
    let estimated_wait_min = ahead * payload.duration_min;

    let entry = WaitlistEntry::new(NewWaitlistParams {
        client_id: payload.client_id,
        client_name: payload.client_name,
        client_email: payload.client_email,
        client_phone: payload.client_phone,
        service_type: payload.service_type,
        requested_date: date,
        requested_time: time,
        duration_min: payload.duration_min,
        pets: payload.pets.unwrap_or_default(),
        special_instructions: payload.special_instructions,
        priority,
        estimated_wait_min,
    });

    let created = state.waitlist_repo.create(&entry).await?;

    state.audit_trail.record(AuditEvent::new(
        "waitlist_joined",
        &actor,
        "waitlist_entry",
        &created.id,
        json!({
            "service_type": created.service_type,
            "requested_date": created.requested_date,
            "priority": created.priority,
        }),
    ));

    info!("Waitlist entry created: {} ({} ahead)", created.id, ahead);
    Ok(Json(created))
}

pub async fn list_waitlist(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WaitlistQueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let entries = state.waitlist_repo.list_waiting(&params.service_type, date).await?;
    Ok(Json(rank(entries)))
}

pub async fn get_waitlist_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.waitlist_repo.find_by_id(&entry_id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;
    Ok(Json(entry))
}

/// Removal is idempotent: cancelling an entry that is already promoted or
/// cancelled returns it unchanged.
pub async fn remove_from_waitlist(
    State(state): State<Arc<AppState>>,
    ActorId(actor): ActorId,
    Path(entry_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.waitlist_repo.find_by_id(&entry_id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;

    if entry.status.is_terminal() {
        return Ok(Json(entry));
    }

    let transitioned = state.waitlist_repo.transition(&entry_id, WaitlistStatus::Cancelled).await?;
    if transitioned {
        state.audit_trail.record(AuditEvent::new(
            "waitlist_removed",
            &actor,
            "waitlist_entry",
            &entry_id,
            json!({}),
        ));
        info!("Waitlist entry cancelled: {}", entry_id);
    }

    let entry = state.waitlist_repo.find_by_id(&entry_id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;
    Ok(Json(entry))
}
