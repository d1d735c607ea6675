use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, info_span, Instrument};
use crate::domain::ports::NotificationService;
use crate::infra::notify::queued_notifier::OutboundNotification;

/// Drains the notification queue until every sender is dropped.
pub async fn start_notification_worker(
    mut receiver: UnboundedReceiver<OutboundNotification>,
    sink: Arc<dyn NotificationService>,
) {
    info!("Starting notification delivery worker...");

    while let Some(outbound) = receiver.recv().await {
        let span = info_span!(
            "notification_delivery",
            kind = %outbound.notification.kind.as_str(),
            family_id = %outbound.notification.family_id,
            recipients = outbound.recipients.len()
        );

        async {
            match sink.notify(&outbound.recipients, &outbound.notification).await {
                Ok(_) => info!("Notification delivered"),
                Err(e) => error!("Notification delivery failed: {}", e),
            }
        }
            .instrument(span)
            .await;
    }

    info!("Notification queue closed, worker exiting");
}
