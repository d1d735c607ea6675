use std::sync::Arc;
use crate::domain::ports::{
    BlockedPeriodRepository, FamilyRepository, NotificationService, ProposalRepository,
    ScheduleEventRepository, UserRepository,
};
use crate::domain::services::{
    event_service::EventService,
    notifications::{NotificationDispatcher, NotificationTemplates},
    proposal_service::ProposalService,
    reminder_service::ReminderService,
};
use crate::config::Config;
use crate::error::AppError;

/// Storage backends, one per aggregate.
pub struct Repositories {
    pub family_repo: Arc<dyn FamilyRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub blocked_period_repo: Arc<dyn BlockedPeriodRepository>,
    pub event_repo: Arc<dyn ScheduleEventRepository>,
    pub proposal_repo: Arc<dyn ProposalRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub family_repo: Arc<dyn FamilyRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub blocked_period_repo: Arc<dyn BlockedPeriodRepository>,
    pub event_repo: Arc<dyn ScheduleEventRepository>,
    pub proposal_repo: Arc<dyn ProposalRepository>,
    pub proposal_service: Arc<ProposalService>,
    pub event_service: Arc<EventService>,
    pub reminder_service: Arc<ReminderService>,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories, notifier: Arc<dyn NotificationService>) -> Result<Self, AppError> {
        let templates = Arc::new(NotificationTemplates::new()?);
        let dispatcher = NotificationDispatcher::new(notifier, templates);

        let proposal_service = Arc::new(ProposalService::new(
            repos.family_repo.clone(),
            repos.user_repo.clone(),
            repos.blocked_period_repo.clone(),
            repos.proposal_repo.clone(),
            dispatcher.clone(),
        ));
        let event_service = Arc::new(EventService::new(
            repos.event_repo.clone(),
            repos.blocked_period_repo.clone(),
            repos.user_repo.clone(),
            dispatcher.clone(),
        ));
        let reminder_service = Arc::new(ReminderService::new(
            repos.family_repo.clone(),
            repos.event_repo.clone(),
            dispatcher,
        ));

        Ok(Self {
            config,
            family_repo: repos.family_repo,
            user_repo: repos.user_repo,
            blocked_period_repo: repos.blocked_period_repo,
            event_repo: repos.event_repo,
            proposal_repo: repos.proposal_repo,
            proposal_service,
            event_service,
            reminder_service,
        })
    }
}
