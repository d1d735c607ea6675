use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tera::Context;
use tracing::{error, info};
use crate::domain::models::{
    calendar_date::CalendarDate,
    family::Family,
    notification::NotificationKind,
    schedule_event::ScheduleEvent,
};
use crate::domain::ports::{FamilyRepository, ScheduleEventRepository};
use crate::domain::services::notifications::NotificationDispatcher;
use crate::error::AppError;

#[derive(Debug, Default, Serialize)]
pub struct ReminderRunSummary {
    pub families_processed: usize,
    pub reminders_sent: usize,
    pub failed: usize,
}

/// Evening reminder of the next day's assignments.
pub struct ReminderService {
    families: Arc<dyn FamilyRepository>,
    events: Arc<dyn ScheduleEventRepository>,
    dispatcher: NotificationDispatcher,
}

impl ReminderService {
    pub fn new(
        families: Arc<dyn FamilyRepository>,
        events: Arc<dyn ScheduleEventRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self { families, events, dispatcher }
    }

    pub async fn run_daily_reminders(&self, now: DateTime<Utc>) -> Result<ReminderRunSummary, AppError> {
        let families = self.families.list_active().await?;
        let mut summary = ReminderRunSummary::default();

        for family in families.into_iter().filter(|f| f.member_ids.len() >= 2) {
            summary.families_processed += 1;
            match self.remind_family(&family, now).await {
                Ok(true) => summary.reminders_sent += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(family_id = %family.id, "Failed to send daily reminder: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(processed = summary.families_processed, sent = summary.reminders_sent, "Daily reminder run finished");
        Ok(summary)
    }

    async fn remind_family(&self, family: &Family, now: DateTime<Utc>) -> Result<bool, AppError> {
        let tomorrow = CalendarDate::from_naive(tomorrow_in(&family.timezone, now))?;
        let events = self.events.list_by_range(&family.id, &tomorrow, &tomorrow).await?;
        if events.is_empty() {
            return Ok(false);
        }

        let mut ctx = Context::new();
        ctx.insert("date", tomorrow.as_str());
        ctx.insert("summary", &summarize(&events));
        self.dispatcher.send(&family.member_ids, NotificationKind::DailyReminder, &family.id, &ctx).await;
        Ok(true)
    }
}

/// The local calendar day after `now` in the family's timezone. Unknown
/// zones fall back to UTC.
pub fn tomorrow_in(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
    let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
    now.with_timezone(&tz).date_naive() + Duration::days(1)
}

fn summarize(events: &[ScheduleEvent]) -> String {
    events
        .iter()
        .map(|e| {
            let mut line = format!("{} at {}", e.party.label(), e.location_display());
            if let Some(start) = &e.start_time {
                line.push_str(&format!(" from {}", start));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("; ")
}
