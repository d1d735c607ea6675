use crate::domain::models::notification::Notification;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A notification waiting for the delivery worker.
#[derive(Debug, Clone)]
pub struct OutboundNotification {
    pub recipients: Vec<String>,
    pub notification: Notification,
}

/// Hands notifications to the background worker and returns immediately.
pub struct QueuedNotifier {
    sender: UnboundedSender<OutboundNotification>,
}

impl QueuedNotifier {
    pub fn new() -> (Self, UnboundedReceiver<OutboundNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationService for QueuedNotifier {
    async fn notify(&self, recipients: &[String], notification: &Notification) -> Result<(), AppError> {
        self.sender
            .send(OutboundNotification {
                recipients: recipients.to_vec(),
                notification: notification.clone(),
            })
            .map_err(|_| AppError::InternalWithMsg("Notification worker has shut down".into()))
    }
}
