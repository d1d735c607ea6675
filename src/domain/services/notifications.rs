use std::sync::Arc;
use tera::{Context, Tera};
use tracing::{debug, warn};
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::ports::NotificationService;
use crate::error::AppError;

const TEMPLATES: &[(NotificationKind, &str, &str)] = &[
    (
        NotificationKind::ProposalCreated,
        "New schedule proposal",
        "A custody schedule for the week of {{ week_start }} is ready. Please review and approve it.",
    ),
    (
        NotificationKind::ProposalApprovedBy,
        "{{ approver }} approved the schedule",
        "{{ approver }} approved the schedule for the week of {{ week_start }}. It is waiting for your approval.",
    ),
    (
        NotificationKind::ScheduleApplied,
        "Schedule confirmed",
        "Everyone approved. The schedule for the week of {{ week_start }} is now on the calendar.",
    ),
    (
        NotificationKind::ConflictAttempt,
        "Blocked date requested",
        "{{ actor }} tried to schedule {{ party }} on {{ date }}, which falls in your blocked period.",
    ),
    (
        NotificationKind::DailyReminder,
        "Tomorrow's schedule",
        "Tomorrow ({{ date }}): {{ summary }}",
    ),
];

/// Title and body templates for every notification kind, compiled once.
pub struct NotificationTemplates {
    tera: Tera,
}

impl NotificationTemplates {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        for (kind, title, body) in TEMPLATES {
            tera.add_raw_template(&title_name(*kind), title)
                .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
            tera.add_raw_template(&body_name(*kind), body)
                .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
        }
        Ok(Self { tera })
    }

    pub fn render(&self, kind: NotificationKind, family_id: &str, context: &Context) -> Result<Notification, AppError> {
        let title = self.tera.render(&title_name(kind), context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;
        let body = self.tera.render(&body_name(kind), context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

        Ok(Notification {
            kind,
            family_id: family_id.to_string(),
            title,
            body,
        })
    }
}

fn title_name(kind: NotificationKind) -> String {
    format!("{}.title", kind.as_str())
}

fn body_name(kind: NotificationKind) -> String {
    format!("{}.body", kind.as_str())
}

/// Renders and hands notifications to the sink. Never fails: render and
/// delivery errors are logged and dropped.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationService>,
    templates: Arc<NotificationTemplates>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationService>, templates: Arc<NotificationTemplates>) -> Self {
        Self { sink, templates }
    }

    pub async fn send(&self, recipients: &[String], kind: NotificationKind, family_id: &str, context: &Context) {
        if recipients.is_empty() {
            debug!("No recipients for {} notification, skipping", kind.as_str());
            return;
        }

        let notification = match self.templates.render(kind, family_id, context) {
            Ok(n) => n,
            Err(e) => {
                warn!(family_id = %family_id, "Failed to render {} notification: {}", kind.as_str(), e);
                return;
            }
        };

        if let Err(e) = self.sink.notify(recipients, &notification).await {
            warn!(family_id = %family_id, "Failed to dispatch {} notification: {}", kind.as_str(), e);
        }
    }
}
