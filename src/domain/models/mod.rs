pub mod auth;
pub mod blocked_period;
pub mod calendar_date;
pub mod family;
pub mod notification;
pub mod proposal;
pub mod schedule_event;
pub mod user;
