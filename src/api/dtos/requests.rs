use serde::Deserialize;

use crate::domain::services::policy::CancellationScope;

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub scope: Option<CancellationScope>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleBookingRequest {
    pub date: String,
    pub time: String,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct CancellationQuoteParams {
    pub scope: Option<CancellationScope>,
}

#[derive(Deserialize)]
pub struct AvailabilityCheckParams {
    pub start: String,
    pub duration: i32,
}

#[derive(Deserialize)]
pub struct SlotQueryParams {
    pub date: String,
    pub duration: i32,
}

#[derive(Deserialize)]
pub struct JoinWaitlistRequest {
    pub client_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_type: String,
    pub date: String,
    pub time: String,
    pub duration_min: i32,
    pub pets: Option<Vec<String>>,
    pub special_instructions: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Deserialize)]
pub struct WaitlistQueryParams {
    pub service_type: String,
    pub date: String,
}
