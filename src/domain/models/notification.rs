use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProposalCreated,
    ProposalApprovedBy,
    ScheduleApplied,
    ConflictAttempt,
    DailyReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ProposalCreated => "proposal_created",
            NotificationKind::ProposalApprovedBy => "proposal_approved_by",
            NotificationKind::ScheduleApplied => "schedule_applied",
            NotificationKind::ConflictAttempt => "conflict_attempt",
            NotificationKind::DailyReminder => "daily_reminder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub family_id: String,
    pub title: String,
    pub body: String,
}
