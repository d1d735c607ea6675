pub mod blocked_period;
pub mod calendar;
pub mod cron;
pub mod event;
pub mod family;
pub mod health;
pub mod proposal;
