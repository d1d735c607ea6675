use std::sync::Arc;
use chrono::NaiveTime;
use tera::Context;
use tracing::{info, warn};
use crate::domain::models::{
    calendar_date::CalendarDate,
    family::Family,
    notification::NotificationKind,
    schedule_event::{Location, NewScheduleEvent, Party, ScheduleEvent},
};
use crate::domain::ports::{BlockedPeriodRepository, ScheduleEventRepository, UserRepository};
use crate::domain::services::availability::get_blocker_for_date;
use crate::domain::services::notifications::NotificationDispatcher;
use crate::error::AppError;

/// Partial edit of an event. `None` leaves a field as it is.
#[derive(Default)]
pub struct ScheduleEventChanges {
    pub date: Option<CalendarDate>,
    pub party: Option<Party>,
    pub location: Option<Location>,
    pub location_label: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Direct, user-driven event writes. Every write that sets a date or party
/// is checked against current blocked periods first.
pub struct EventService {
    events: Arc<dyn ScheduleEventRepository>,
    blocks: Arc<dyn BlockedPeriodRepository>,
    users: Arc<dyn UserRepository>,
    dispatcher: NotificationDispatcher,
}

impl EventService {
    pub fn new(
        events: Arc<dyn ScheduleEventRepository>,
        blocks: Arc<dyn BlockedPeriodRepository>,
        users: Arc<dyn UserRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self { events, blocks, users, dispatcher }
    }

    pub async fn create(&self, family: &Family, actor_id: &str, params: NewScheduleEvent) -> Result<ScheduleEvent, AppError> {
        validate_details(params.location, params.location_label.as_deref(), params.start_time.as_deref(), params.end_time.as_deref())?;
        self.ensure_available(family, actor_id, &params.date, params.party).await?;

        let event = ScheduleEvent::new(family.id.clone(), actor_id.to_string(), params);
        let created = self.events.create(&event).await?;
        info!(family_id = %family.id, event_id = %created.id, date = %created.date, "Created schedule event");
        Ok(created)
    }

    pub async fn update(&self, family: &Family, actor_id: &str, event_id: &str, changes: ScheduleEventChanges) -> Result<ScheduleEvent, AppError> {
        let existing = self.events.find_by_id(&family.id, event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let mut event = existing.clone();
        if let Some(date) = changes.date { event.date = date; }
        if let Some(party) = changes.party { event.party = party; }
        if let Some(location) = changes.location {
            event.location = location;
            if location != Location::Other {
                event.location_label = None;
            }
        }
        if let Some(label) = changes.location_label { event.location_label = Some(label); }
        if let Some(title) = changes.title { event.title = Some(title); }
        if let Some(notes) = changes.notes { event.notes = Some(notes); }
        if let Some(start) = changes.start_time { event.start_time = Some(start); }
        if let Some(end) = changes.end_time { event.end_time = Some(end); }

        validate_details(event.location, event.location_label.as_deref(), event.start_time.as_deref(), event.end_time.as_deref())?;

        if event.date != existing.date || event.party != existing.party {
            self.ensure_available(family, actor_id, &event.date, event.party).await?;
        }

        let updated = self.events.update(&event).await?;
        info!(family_id = %family.id, event_id = %updated.id, "Updated schedule event");
        Ok(updated)
    }

    /// Rejects `party` on `date` if a blocked period covers it and lets the
    /// blocking parent know someone tried.
    async fn ensure_available(&self, family: &Family, actor_id: &str, date: &CalendarDate, party: Party) -> Result<(), AppError> {
        let blocks = self.blocks.list_by_family(&family.id).await?;
        let Some(blocker) = get_blocker_for_date(date, party, &blocks) else {
            return Ok(());
        };

        let blocker_name = self.display_name(&blocker.user_id).await;
        warn!(family_id = %family.id, date = %date, blocked_by = %blocker.user_id, "Rejected event on blocked date");

        if blocker.user_id != actor_id {
            let mut ctx = Context::new();
            ctx.insert("actor", &self.display_name(actor_id).await);
            ctx.insert("party", party.label());
            ctx.insert("date", date.as_str());
            self.dispatcher.send(&[blocker.user_id.clone()], NotificationKind::ConflictAttempt, &family.id, &ctx).await;
        }

        Err(AppError::BlockedDate {
            blocker_id: blocker.user_id.clone(),
            message: format!(
                "{} is blocked by {} ({}) from {} to {}",
                date,
                blocker_name,
                blocker.parent_role.label(),
                blocker.start_date,
                blocker.end_date
            ),
        })
    }

    async fn display_name(&self, user_id: &str) -> String {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.display_name,
            _ => user_id.to_string(),
        }
    }
}

fn validate_details(location: Location, label: Option<&str>, start: Option<&str>, end: Option<&str>) -> Result<(), AppError> {
    if location == Location::Other && label.is_none_or(|l| l.trim().is_empty()) {
        return Err(AppError::Validation("location_label is required when location is 'other'".into()));
    }

    let start = start.map(parse_time).transpose()?;
    let end = end.map(parse_time).transpose()?;
    if let (Some(s), Some(e)) = (start, end) && e <= s {
        return Err(AppError::Validation("end_time must be after start_time".into()));
    }
    Ok(())
}

fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time '{}', expected HH:MM", value)))
}
