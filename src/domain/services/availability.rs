use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::slot::TimeSlot;
use crate::domain::services::policy::SchedulePolicy;

/// `Unknown` is produced at the I/O boundary when the commitment snapshot
/// cannot be fetched. The pure checks below only ever answer
/// available/conflict; callers must not collapse `Unknown` into either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Conflict,
    Unknown,
}

/// Checks a candidate `[start, start+duration)` window against a sitter's
/// existing commitments. Touching endpoints are not a conflict.
pub fn slot_status(existing: &[Booking], start: DateTime<Utc>, duration_min: i32) -> AvailabilityStatus {
    let candidate = TimeSlot::new(start, start + Duration::minutes(duration_min as i64));

    let conflict = existing
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .any(|b| candidate.overlaps(&TimeSlot::new(b.scheduled_at, b.end_at)));

    if conflict {
        AvailabilityStatus::Conflict
    } else {
        AvailabilityStatus::Available
    }
}

/// Enumerates conflict-free candidate slots for one day. Candidate starts
/// sit on the configured granularity (`slot_interval_min`) from the opening
/// hour through the closing hour inclusive, in the policy timezone. Slots
/// whose local wall time does not exist on that date (DST gap) are skipped.
pub fn enumerate_slots(
    schedule: &SchedulePolicy,
    date: NaiveDate,
    duration_min: i32,
    existing: &[Booking],
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    if duration_min <= 0 || schedule.slot_interval_min == 0 {
        return slots;
    }

    let mut cursor = schedule.open_hour * 60;
    let last_start = schedule.close_hour * 60 + 59;

    while cursor <= last_start {
        let hour = cursor / 60;
        let minute = cursor % 60;

        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            if let Some(local) = schedule
                .timezone
                .from_local_datetime(&date.and_time(time))
                .single()
            {
                let start = local.with_timezone(&Utc);
                if slot_status(existing, start, duration_min) == AvailabilityStatus::Available {
                    slots.push(TimeSlot::new(
                        start,
                        start + Duration::minutes(duration_min as i64),
                    ));
                }
            }
        }

        cursor += schedule.slot_interval_min;
    }

    slots
}
