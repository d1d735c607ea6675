use std::collections::BTreeMap;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::{
    calendar_date::CalendarDate,
    family::ParentRole,
    schedule_event::{Location, NewScheduleEvent, ScheduleEvent},
};
use crate::error::AppError;

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDay {
    pub date: CalendarDate,
    pub parent: ParentRole,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "approved" => Ok(ProposalStatus::Approved),
            other => Err(AppError::Validation(format!("Unknown proposal status '{}'", other))),
        }
    }
}

impl TryFrom<String> for ProposalStatus {
    type Error = AppError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

pub type ApprovalMap = BTreeMap<String, DateTime<Utc>>;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WeekProposal {
    pub id: String,
    pub family_id: String,
    #[sqlx(try_from = "String")]
    pub week_start: CalendarDate,
    pub days: Json<Vec<ProposalDay>>,
    pub approvals: Json<ApprovalMap>,
    #[sqlx(try_from = "String")]
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeekProposal {
    pub fn new(family_id: String, week_start: CalendarDate, days: Vec<ProposalDay>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            family_id,
            week_start,
            days: Json(days),
            approvals: Json(ApprovalMap::new()),
            status: ProposalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_approved_by_all(&self, member_ids: &[String]) -> bool {
        !member_ids.is_empty() && member_ids.iter().all(|id| self.approvals.0.contains_key(id))
    }

    /// One event per proposal day, attributed to `created_by`.
    pub fn to_events(&self, created_by: &str) -> Vec<ScheduleEvent> {
        self.days.0.iter().map(|day| {
            ScheduleEvent::new(self.family_id.clone(), created_by.to_string(), NewScheduleEvent {
                date: day.date.clone(),
                party: day.parent.into(),
                location: day.location,
                location_label: None,
                title: None,
                notes: None,
                start_time: None,
                end_time: None,
            })
        }).collect()
    }
}
