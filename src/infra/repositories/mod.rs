pub mod postgres_audit_repo;
pub mod postgres_booking_repo;
pub mod postgres_job_repo;
pub mod postgres_waitlist_repo;
pub mod sqlite_audit_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_job_repo;
pub mod sqlite_waitlist_repo;
