use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::models::booking::Booking;
use crate::domain::models::slot::TimeSlot;
use crate::domain::services::availability::AvailabilityStatus;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub status: AvailabilityStatus,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: String,
    pub duration_min: i32,
    pub slots: Vec<TimeSlot>,
}

#[derive(Serialize)]
pub struct CancelledBookingResponse {
    pub booking: Booking,
    pub refund_rate: u32,
    pub refund_amount: Decimal,
}

#[derive(Serialize)]
pub struct CancellationResponse {
    pub cancelled: Vec<CancelledBookingResponse>,
    pub total_refund: Decimal,
}
