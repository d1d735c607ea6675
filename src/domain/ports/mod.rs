use crate::domain::models::{
    blocked_period::BlockedPeriod,
    calendar_date::CalendarDate,
    family::{Family, ParentRoles},
    notification::Notification,
    proposal::{ProposalStatus, WeekProposal},
    schedule_event::ScheduleEvent,
    user::UserProfile,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait FamilyRepository: Send + Sync {
    async fn create(&self, family: &Family) -> Result<Family, AppError>;
    async fn add_member(&self, family_id: &str, user_id: &str) -> Result<(), AppError>;
    /// Loads the family with `member_ids` in join order.
    async fn find_by_id(&self, id: &str) -> Result<Option<Family>, AppError>;
    async fn list_active(&self) -> Result<Vec<Family>, AppError>;
    async fn resolve_parent_roles(&self, member_ids: &[String]) -> Result<ParentRoles, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, AppError>;
}

#[async_trait]
pub trait BlockedPeriodRepository: Send + Sync {
    async fn create(&self, period: &BlockedPeriod) -> Result<BlockedPeriod, AppError>;
    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<BlockedPeriod>, AppError>;
    async fn list_by_family(&self, family_id: &str) -> Result<Vec<BlockedPeriod>, AppError>;
    async fn delete(&self, family_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScheduleEventRepository: Send + Sync {
    async fn create(&self, event: &ScheduleEvent) -> Result<ScheduleEvent, AppError>;
    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<ScheduleEvent>, AppError>;
    async fn list_by_family(&self, family_id: &str) -> Result<Vec<ScheduleEvent>, AppError>;
    async fn list_by_range(&self, family_id: &str, start: &CalendarDate, end: &CalendarDate) -> Result<Vec<ScheduleEvent>, AppError>;
    async fn update(&self, event: &ScheduleEvent) -> Result<ScheduleEvent, AppError>;
    async fn delete(&self, family_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Inserts unless a pending proposal already exists for the same
    /// family and week. Returns `None` when nothing was inserted.
    async fn insert_if_absent(&self, proposal: &WeekProposal) -> Result<Option<WeekProposal>, AppError>;
    async fn find_pending(&self, family_id: &str, week_start: &CalendarDate) -> Result<Option<WeekProposal>, AppError>;
    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<WeekProposal>, AppError>;
    async fn list_by_family(&self, family_id: &str, status: Option<ProposalStatus>) -> Result<Vec<WeekProposal>, AppError>;
    /// Merges one approval into a pending proposal and returns the row as
    /// written. `None` if the proposal is missing or no longer pending.
    async fn record_approval(&self, proposal_id: &str, user_id: &str, approved_at: DateTime<Utc>) -> Result<Option<WeekProposal>, AppError>;
    /// In one transaction: flips the proposal from pending to approved with
    /// its final approval map, then replaces every event on each of the
    /// proposal's dates with `events`. Returns `false` without touching
    /// anything if the proposal was no longer pending.
    async fn commit_approved(&self, proposal: &WeekProposal, events: &[ScheduleEvent]) -> Result<bool, AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(&self, recipients: &[String], notification: &Notification) -> Result<(), AppError>;
}
