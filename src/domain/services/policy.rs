use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::models::booking::{Booking, BookingStatus};
use crate::error::AppError;

/// Flat fee added when the new time is less than 24 hours away.
pub const LAST_MINUTE_FEE_CENTS: i64 = 500;
/// Flat fee added when the new time falls outside business hours.
pub const OFF_HOURS_FEE_CENTS: i64 = 1000;

pub const MIN_NOTICE_HOURS: i64 = 2;
pub const MIN_MOVE_DISTANCE_HOURS: i64 = 1;

#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    pub timezone: Tz,
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_interval_min: u32,
}

impl SchedulePolicy {
    /// Business hours apply to the start instant's local hour-of-day,
    /// inclusive on both ends.
    pub fn within_business_hours(&self, at: DateTime<Utc>) -> bool {
        let hour = at.with_timezone(&self.timezone).hour();
        hour >= self.open_hour && hour <= self.close_hour
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationScope {
    Single,
    Series,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationAssessment {
    pub eligible: bool,
    pub reasons: Vec<String>,
    pub refund_rate: u32,
    pub refund_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescheduleAssessment {
    pub eligible: bool,
    pub reasons: Vec<String>,
    pub surcharge: Decimal,
}

/// Refund rate as a function of notice before the visit:
/// 24h or more -> 100%, 2h up to 24h -> 50%, under 2h -> 0%.
/// Comparisons are exact, so the 24h and 2h boundaries land in the
/// more generous bracket.
pub fn refund_rate(notice: Duration) -> u32 {
    if notice >= Duration::hours(24) {
        100
    } else if notice >= Duration::hours(MIN_NOTICE_HOURS) {
        50
    } else {
        0
    }
}

/// A price that does not parse is a data fault, never a free booking.
pub fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| AppError::DataIntegrity(format!("Unparseable booking price: {:?}", raw)))
}

pub fn refund_amount(price: Decimal, rate: u32) -> Decimal {
    price * Decimal::from(rate) / Decimal::ONE_HUNDRED
}

pub fn assess_cancellation(
    booking: &Booking,
    scope: CancellationScope,
    now: DateTime<Utc>,
) -> Result<CancellationAssessment, AppError> {
    let mut reasons = Vec::new();

    match booking.status {
        BookingStatus::Cancelled => reasons.push("Booking is already cancelled".to_string()),
        BookingStatus::Completed => reasons.push("Booking is already completed".to_string()),
        _ => {}
    }

    if scope == CancellationScope::Series && !booking.is_recurring {
        reasons.push("Booking is not part of a recurring series".to_string());
    }

    let price = parse_price(&booking.price)?;
    let rate = refund_rate(booking.scheduled_at - now);

    Ok(CancellationAssessment {
        eligible: reasons.is_empty(),
        reasons,
        refund_rate: rate,
        refund_amount: refund_amount(price, rate),
    })
}

pub fn assess_reschedule(
    booking: &Booking,
    proposed: DateTime<Utc>,
    reason: &str,
    now: DateTime<Utc>,
    schedule: &SchedulePolicy,
) -> RescheduleAssessment {
    let mut reasons = Vec::new();

    match booking.status {
        BookingStatus::Cancelled => reasons.push("Booking is already cancelled".to_string()),
        BookingStatus::Completed => reasons.push("Booking is already completed".to_string()),
        _ => {}
    }

    if proposed - now < Duration::hours(MIN_NOTICE_HOURS) {
        reasons.push(format!(
            "New time must be at least {} hours from now",
            MIN_NOTICE_HOURS
        ));
    }

    if reason.trim().is_empty() {
        reasons.push("A reason for the change is required".to_string());
    }

    let moved_by = (proposed - booking.scheduled_at).abs();
    if moved_by <= Duration::hours(MIN_MOVE_DISTANCE_HOURS) {
        reasons.push(format!(
            "New time must differ from the current time by more than {} hour",
            MIN_MOVE_DISTANCE_HOURS
        ));
    }

    let in_hours = schedule.within_business_hours(proposed);
    if !in_hours {
        reasons.push(format!(
            "New time is outside business hours ({}:00-{}:00)",
            schedule.open_hour, schedule.close_hour
        ));
    }

    // Advisory pricing. Computed even for ineligible requests so a quote
    // can show the would-be fee next to the refusal reasons.
    let mut surcharge = Decimal::ZERO;
    if proposed - now < Duration::hours(24) {
        surcharge += Decimal::new(LAST_MINUTE_FEE_CENTS, 2);
    }
    if !in_hours {
        surcharge += Decimal::new(OFF_HOURS_FEE_CENTS, 2);
    }

    RescheduleAssessment {
        eligible: reasons.is_empty(),
        reasons,
        surcharge,
    }
}
