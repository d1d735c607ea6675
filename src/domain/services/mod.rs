pub mod availability;
pub mod calendar;
pub mod event_service;
pub mod notifications;
pub mod proposal_generator;
pub mod proposal_service;
pub mod reminder_service;
