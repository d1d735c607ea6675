pub mod sqlite_family_repo;
pub mod sqlite_user_repo;
pub mod sqlite_blocked_period_repo;
pub mod sqlite_schedule_event_repo;
pub mod sqlite_proposal_repo;

pub mod postgres_family_repo;
pub mod postgres_user_repo;
pub mod postgres_blocked_period_repo;
pub mod postgres_schedule_event_repo;
pub mod postgres_proposal_repo;
