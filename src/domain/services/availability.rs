use crate::domain::models::blocked_period::BlockedPeriod;
use crate::domain::models::calendar_date::CalendarDate;
use crate::domain::models::family::ParentRole;
use crate::domain::models::schedule_event::Party;

/// `start <= date <= end`, compared as fixed-width date strings.
pub fn is_date_in_block(date: &CalendarDate, start: &CalendarDate, end: &CalendarDate) -> bool {
    date.is_within(start, end)
}

/// Is `user_id` unavailable on `date` according to their own periods?
pub fn is_user_blocked(date: &CalendarDate, user_id: &str, blocks: &[BlockedPeriod]) -> bool {
    blocks
        .iter()
        .any(|b| b.user_id == user_id && is_date_in_block(date, &b.start_date, &b.end_date))
}

/// First period that keeps `party` from having the children on `date`.
/// `Together` needs both parents, so either parent's period counts.
pub fn get_blocker_for_date<'a>(
    date: &CalendarDate,
    party: Party,
    blocks: &'a [BlockedPeriod],
) -> Option<&'a BlockedPeriod> {
    let roles: &[ParentRole] = party.roles();
    blocks
        .iter()
        .find(|b| roles.contains(&b.parent_role) && is_date_in_block(date, &b.start_date, &b.end_date))
}
