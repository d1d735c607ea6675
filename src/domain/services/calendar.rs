use chrono::Duration;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};
use crate::domain::models::{family::Family, schedule_event::ScheduleEvent};
use crate::error::AppError;

/// Generates an iCalendar (.ics) feed of a family's schedule, one all-day
/// entry per event.
pub fn generate_family_ics(family: &Family, events: &[ScheduleEvent]) -> Result<String, AppError> {
    let mut calendar = Calendar::new();

    for event in events {
        let summary = match &event.title {
            Some(title) => format!("{}: {}", event.party.label(), title),
            None => event.party.label().to_string(),
        };

        let mut description = format!("{} ({})", event.location_display(), family.name);
        if let (Some(start), Some(end)) = (&event.start_time, &event.end_time) {
            description.push_str(&format!(", {}-{}", start, end));
        }
        if let Some(notes) = &event.notes {
            description.push('\n');
            description.push_str(notes);
        }

        let date = event.date.to_naive()?;
        let ical_event = IcalEvent::new()
            .summary(&summary)
            .description(&description)
            .location(event.location_display())
            .starts(date)
            .ends(date + Duration::days(1))
            .uid(&event.id)
            .done();

        calendar.push(ical_event);
    }

    Ok(calendar.to_string())
}
