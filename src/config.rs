use std::env;

use chrono_tz::Tz;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub business_timezone: String,
    pub business_open_hour: u32,
    pub business_close_hour: u32,
    pub slot_interval_min: u32,
    pub waitlist_match_window_min: i64,
    pub reschedule_commit_retries: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            business_timezone: env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            business_open_hour: env::var("BUSINESS_OPEN_HOUR").unwrap_or_else(|_| "8".to_string()).parse().expect("BUSINESS_OPEN_HOUR must be a number"),
            business_close_hour: env::var("BUSINESS_CLOSE_HOUR").unwrap_or_else(|_| "20".to_string()).parse().expect("BUSINESS_CLOSE_HOUR must be a number"),
            slot_interval_min: env::var("SLOT_INTERVAL_MIN").unwrap_or_else(|_| "30".to_string()).parse().expect("SLOT_INTERVAL_MIN must be a number"),
            waitlist_match_window_min: env::var("WAITLIST_MATCH_WINDOW_MIN").unwrap_or_else(|_| "0".to_string()).parse().expect("WAITLIST_MATCH_WINDOW_MIN must be a number"),
            reschedule_commit_retries: env::var("RESCHEDULE_COMMIT_RETRIES").unwrap_or_else(|_| "3".to_string()).parse().expect("RESCHEDULE_COMMIT_RETRIES must be a number"),
        }
    }

    /// The slice of config the scheduling engine works from.
    pub fn schedule_policy(&self) -> crate::domain::services::policy::SchedulePolicy {
        let tz: Tz = self.business_timezone.parse().unwrap_or(chrono_tz::UTC);
        crate::domain::services::policy::SchedulePolicy {
            timezone: tz,
            open_hour: self.business_open_hour,
            close_hour: self.business_close_hour,
            slot_interval_min: self.slot_interval_min,
        }
    }
}
