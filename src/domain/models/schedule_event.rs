use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::{calendar_date::CalendarDate, family::ParentRole};
use crate::error::AppError;

/// Who has the children for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    ParentA,
    ParentB,
    Together,
}

impl Party {
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::ParentA => "parent_a",
            Party::ParentB => "parent_b",
            Party::Together => "together",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Party::ParentA => "Parent A",
            Party::ParentB => "Parent B",
            Party::Together => "Together",
        }
    }

    /// Roles whose blocked periods an event for this party must respect.
    pub fn roles(&self) -> &'static [ParentRole] {
        match self {
            Party::ParentA => &[ParentRole::ParentA],
            Party::ParentB => &[ParentRole::ParentB],
            Party::Together => &[ParentRole::ParentA, ParentRole::ParentB],
        }
    }
}

impl From<ParentRole> for Party {
    fn from(role: ParentRole) -> Self {
        match role {
            ParentRole::ParentA => Party::ParentA,
            ParentRole::ParentB => Party::ParentB,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent_a" => Ok(Party::ParentA),
            "parent_b" => Ok(Party::ParentB),
            "together" => Ok(Party::Together),
            other => Err(AppError::Validation(format!("Unknown party '{}'", other))),
        }
    }
}

impl TryFrom<String> for Party {
    type Error = AppError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    ParentAHome,
    ParentBHome,
    School,
    Other,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::ParentAHome => "parent_a_home",
            Location::ParentBHome => "parent_b_home",
            Location::School => "school",
            Location::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Location::ParentAHome => "Parent A's home",
            Location::ParentBHome => "Parent B's home",
            Location::School => "School",
            Location::Other => "Other",
        }
    }

    /// Where the generator places the children on a parent's day.
    pub fn default_for(role: ParentRole) -> Self {
        match role {
            ParentRole::ParentA => Location::ParentAHome,
            ParentRole::ParentB => Location::ParentBHome,
        }
    }
}

impl FromStr for Location {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent_a_home" => Ok(Location::ParentAHome),
            "parent_b_home" => Ok(Location::ParentBHome),
            "school" => Ok(Location::School),
            "other" => Ok(Location::Other),
            other => Err(AppError::Validation(format!("Unknown location '{}'", other))),
        }
    }
}

impl TryFrom<String> for Location {
    type Error = AppError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleEvent {
    pub id: String,
    pub family_id: String,
    #[sqlx(try_from = "String")]
    pub date: CalendarDate,
    #[sqlx(try_from = "String")]
    pub party: Party,
    #[sqlx(try_from = "String")]
    pub location: Location,
    pub location_label: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewScheduleEvent {
    pub date: CalendarDate,
    pub party: Party,
    pub location: Location,
    pub location_label: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl ScheduleEvent {
    pub fn new(family_id: String, created_by: String, params: NewScheduleEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            family_id,
            date: params.date,
            party: params.party,
            location: params.location,
            location_label: params.location_label,
            title: params.title,
            notes: params.notes,
            start_time: params.start_time,
            end_time: params.end_time,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn location_display(&self) -> &str {
        match (&self.location, self.location_label.as_deref()) {
            (Location::Other, Some(label)) => label,
            (location, _) => location.label(),
        }
    }
}
