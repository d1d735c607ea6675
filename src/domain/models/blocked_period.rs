use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::{calendar_date::CalendarDate, family::ParentRole};
use crate::error::AppError;

/// A parent's unavailability window, both ends inclusive. Never edited in
/// place; a change is a delete followed by a new period.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BlockedPeriod {
    pub id: String,
    pub family_id: String,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub parent_role: ParentRole,
    #[sqlx(try_from = "String")]
    pub start_date: CalendarDate,
    #[sqlx(try_from = "String")]
    pub end_date: CalendarDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BlockedPeriod {
    pub fn new(
        family_id: String,
        user_id: String,
        parent_role: ParentRole,
        start_date: CalendarDate,
        end_date: CalendarDate,
        note: Option<String>,
    ) -> Result<Self, AppError> {
        if start_date > end_date {
            return Err(AppError::Validation("start_date must not be after end_date".into()));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            family_id,
            user_id,
            parent_role,
            start_date,
            end_date,
            note,
            created_at: Utc::now(),
        })
    }
}
