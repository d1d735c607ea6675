use crate::domain::models::blocked_period::BlockedPeriod;
use crate::domain::models::calendar_date::CalendarDate;
use crate::domain::models::family::{ParentRole, ParentRoles};
use crate::domain::models::proposal::{ProposalDay, DAYS_PER_WEEK};
use crate::domain::models::schedule_event::Location;
use crate::domain::services::availability::is_user_blocked;
use crate::error::AppError;

/// Builds the seven-day custody assignment for the week starting at
/// `week_start` (a Monday).
///
/// For each day, a parent who is blocked loses the day to the other parent.
/// When neither or both are blocked the day alternates by index: even days go
/// to parent A, odd days to parent B. The both-blocked case therefore still
/// hands the day to a blocked parent.
///
/// Returns an empty list when either role slot is unresolved; callers treat
/// that as "nothing to propose". Output depends only on the inputs.
pub fn generate_week_proposal(
    roles: &ParentRoles,
    blocks: &[BlockedPeriod],
    week_start: &CalendarDate,
) -> Result<Vec<ProposalDay>, AppError> {
    let Some(parents) = roles.pair() else {
        return Ok(Vec::new());
    };

    let mut days = Vec::with_capacity(DAYS_PER_WEEK);
    for index in 0..DAYS_PER_WEEK {
        let date = week_start.add_days(index as i64)?;
        let a_blocked = is_user_blocked(&date, &parents.parent_a, blocks);
        let b_blocked = is_user_blocked(&date, &parents.parent_b, blocks);

        let parent = match (a_blocked, b_blocked) {
            (true, false) => ParentRole::ParentB,
            (false, true) => ParentRole::ParentA,
            _ => alternate(index),
        };

        days.push(ProposalDay {
            date,
            parent,
            location: Location::default_for(parent),
        });
    }

    Ok(days)
}

fn alternate(index: usize) -> ParentRole {
    if index % 2 == 0 {
        ParentRole::ParentA
    } else {
        ParentRole::ParentB
    }
}
