use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use tera::Context;
use tracing::{error, info, warn};
use crate::domain::models::{
    calendar_date::CalendarDate,
    family::Family,
    notification::NotificationKind,
    proposal::{ProposalDay, ProposalStatus, WeekProposal, DAYS_PER_WEEK},
};
use crate::domain::ports::{BlockedPeriodRepository, FamilyRepository, ProposalRepository, UserRepository};
use crate::domain::services::notifications::NotificationDispatcher;
use crate::domain::services::proposal_generator::generate_week_proposal;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    PlanExcluded,
    NotEnoughMembers,
    UnresolvedParentRoles,
    NoDays,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(WeekProposal),
    AlreadyPending(WeekProposal),
    Skipped(SkipReason),
}

#[derive(Debug)]
pub enum ApprovalOutcome {
    /// Approval stored; other members still need to approve.
    Recorded(WeekProposal),
    /// This approval completed the set and the week is on the calendar.
    Committed(WeekProposal),
    /// The proposal was already approved before this call.
    AlreadyApproved(WeekProposal),
}

#[derive(Debug, Default, Serialize)]
pub struct WeeklyRunSummary {
    pub week_start: String,
    pub families_processed: usize,
    pub proposals_created: usize,
    pub already_pending: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives a week proposal from absent to pending to approved.
pub struct ProposalService {
    families: Arc<dyn FamilyRepository>,
    users: Arc<dyn UserRepository>,
    blocks: Arc<dyn BlockedPeriodRepository>,
    proposals: Arc<dyn ProposalRepository>,
    dispatcher: NotificationDispatcher,
}

impl ProposalService {
    pub fn new(
        families: Arc<dyn FamilyRepository>,
        users: Arc<dyn UserRepository>,
        blocks: Arc<dyn BlockedPeriodRepository>,
        proposals: Arc<dyn ProposalRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self { families, users, blocks, proposals, dispatcher }
    }

    /// Runs the generator without persisting anything.
    pub async fn preview(&self, family: &Family, week_start: &CalendarDate) -> Result<Vec<ProposalDay>, AppError> {
        ensure_monday(week_start)?;
        let roles = self.families.resolve_parent_roles(&family.member_ids).await?;
        let blocks = self.blocks.list_by_family(&family.id).await?;
        generate_week_proposal(&roles, &blocks, week_start)
    }

    pub async fn create_weekly_proposal(&self, family_id: &str, week_start: &CalendarDate) -> Result<CreateOutcome, AppError> {
        ensure_monday(week_start)?;

        let family = self.families.find_by_id(family_id).await?
            .ok_or(AppError::NotFound(format!("Family {} not found", family_id)))?;

        if !family.active {
            return Ok(CreateOutcome::Skipped(SkipReason::Inactive));
        }
        if !family.plan.includes_proposals() {
            return Ok(CreateOutcome::Skipped(SkipReason::PlanExcluded));
        }
        if family.member_ids.len() < 2 {
            return Ok(CreateOutcome::Skipped(SkipReason::NotEnoughMembers));
        }

        if let Some(existing) = self.proposals.find_pending(&family.id, week_start).await? {
            return Ok(CreateOutcome::AlreadyPending(existing));
        }

        let roles = self.families.resolve_parent_roles(&family.member_ids).await?;
        if roles.pair().is_none() {
            return Ok(CreateOutcome::Skipped(SkipReason::UnresolvedParentRoles));
        }

        let blocks = self.blocks.list_by_family(&family.id).await?;
        let days = generate_week_proposal(&roles, &blocks, week_start)?;
        if days.is_empty() {
            return Ok(CreateOutcome::Skipped(SkipReason::NoDays));
        }

        let proposal = WeekProposal::new(family.id.clone(), week_start.clone(), days);
        let Some(created) = self.proposals.insert_if_absent(&proposal).await? else {
            // Lost the race to a concurrent trigger for the same week.
            let existing = self.proposals.find_pending(&family.id, week_start).await?
                .ok_or(AppError::InternalWithMsg("Pending proposal vanished after conflict".into()))?;
            return Ok(CreateOutcome::AlreadyPending(existing));
        };

        info!(family_id = %family.id, proposal_id = %created.id, week_start = %week_start, "Created week proposal");

        let mut ctx = Context::new();
        ctx.insert("week_start", week_start.as_str());
        self.dispatcher.send(&family.member_ids, NotificationKind::ProposalCreated, &family.id, &ctx).await;

        Ok(CreateOutcome::Created(created))
    }

    /// Proposal creation for every active family. One family's failure is
    /// logged and counted; it never stops the rest.
    pub async fn run_weekly_cycle(&self, week_start: &CalendarDate) -> Result<WeeklyRunSummary, AppError> {
        ensure_monday(week_start)?;

        let families = self.families.list_active().await?;
        let mut summary = WeeklyRunSummary {
            week_start: week_start.to_string(),
            families_processed: families.len(),
            ..Default::default()
        };

        for family in families {
            match self.create_weekly_proposal(&family.id, week_start).await {
                Ok(CreateOutcome::Created(_)) => summary.proposals_created += 1,
                Ok(CreateOutcome::AlreadyPending(existing)) => {
                    info!(family_id = %family.id, proposal_id = %existing.id, "Pending proposal already exists, skipping");
                    summary.already_pending += 1;
                }
                Ok(CreateOutcome::Skipped(reason)) => {
                    info!(family_id = %family.id, ?reason, "Skipped family");
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(family_id = %family.id, "Failed to create week proposal: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            week_start = %week_start,
            processed = summary.families_processed,
            created = summary.proposals_created,
            "Weekly proposal run finished"
        );
        Ok(summary)
    }

    pub async fn approve(&self, family: &Family, proposal_id: &str, user_id: &str) -> Result<ApprovalOutcome, AppError> {
        if !family.is_member(user_id) {
            return Err(AppError::Forbidden("Not a member of this family".into()));
        }

        let proposal = self.proposals.find_by_id(&family.id, proposal_id).await?
            .ok_or(AppError::NotFound("Proposal not found".into()))?;

        if proposal.status == ProposalStatus::Approved {
            return Ok(ApprovalOutcome::AlreadyApproved(proposal));
        }

        let Some(updated) = self.proposals.record_approval(&proposal.id, user_id, Utc::now()).await? else {
            return self.already_approved(family, proposal_id).await;
        };

        info!(family_id = %family.id, proposal_id = %updated.id, user_id = %user_id, "Recorded proposal approval");

        if !updated.is_approved_by_all(&family.member_ids) {
            let approver = self.display_name(user_id).await;
            let mut ctx = Context::new();
            ctx.insert("week_start", updated.week_start.as_str());
            ctx.insert("approver", &approver);
            self.dispatcher.send(&family.members_except(user_id), NotificationKind::ProposalApprovedBy, &family.id, &ctx).await;
            return Ok(ApprovalOutcome::Recorded(updated));
        }

        // By convention committed events are attributed to the first member.
        let creator = family.member_ids.first()
            .ok_or(AppError::InternalWithMsg("Family has no members".into()))?;
        let events = updated.to_events(creator);

        if !self.proposals.commit_approved(&updated, &events).await? {
            // A concurrent approval committed first.
            return self.already_approved(family, proposal_id).await;
        }

        info!(family_id = %family.id, proposal_id = %updated.id, week_start = %updated.week_start, "Proposal approved and applied to calendar");

        let mut ctx = Context::new();
        ctx.insert("week_start", updated.week_start.as_str());
        self.dispatcher.send(&family.member_ids, NotificationKind::ScheduleApplied, &family.id, &ctx).await;

        let mut committed = updated;
        committed.status = ProposalStatus::Approved;
        Ok(ApprovalOutcome::Committed(committed))
    }

    async fn already_approved(&self, family: &Family, proposal_id: &str) -> Result<ApprovalOutcome, AppError> {
        let current = self.proposals.find_by_id(&family.id, proposal_id).await?
            .ok_or(AppError::NotFound("Proposal not found".into()))?;

        if current.status != ProposalStatus::Approved {
            return Err(AppError::InternalWithMsg(format!("Proposal {} is neither pending nor approved", proposal_id)));
        }
        Ok(ApprovalOutcome::AlreadyApproved(current))
    }

    async fn display_name(&self, user_id: &str) -> String {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.display_name,
            Ok(None) => user_id.to_string(),
            Err(e) => {
                warn!("Failed to load profile {}: {}", user_id, e);
                user_id.to_string()
            }
        }
    }
}

/// The week must start on a Monday and end on a representable Sunday.
fn ensure_monday(week_start: &CalendarDate) -> Result<(), AppError> {
    if !week_start.is_monday()? {
        return Err(AppError::Validation(format!("week_start {} is not a Monday", week_start)));
    }
    week_start.add_days(DAYS_PER_WEEK as i64 - 1)?;
    Ok(())
}
