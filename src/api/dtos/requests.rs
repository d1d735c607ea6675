use serde::Deserialize;
use crate::domain::models::schedule_event::{Location, Party};

#[derive(Deserialize)]
pub struct CreateBlockedPeriodRequest {
    pub start_date: String,
    pub end_date: String,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub date: String,
    pub party: Party,
    pub location: Option<Location>,
    pub location_label: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub date: Option<String>,
    pub party: Option<Party>,
    pub location: Option<Location>,
    pub location_label: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct EventRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct ProposalListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub week_start: String,
}

#[derive(Deserialize)]
pub struct WeeklyTriggerQuery {
    pub week_start: Option<String>,
}
