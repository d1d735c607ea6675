use crate::domain::models::notification::Notification;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

/// Delivers notifications to the push gateway over HTTP.
pub struct HttpPushService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPushService {
    pub fn new(api_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct PushPayload<'a> {
    recipients: &'a [String],
    kind: &'a str,
    title: &'a str,
    body: &'a str,
    family_id: &'a str,
}

#[async_trait]
impl NotificationService for HttpPushService {
    async fn notify(&self, recipients: &[String], notification: &Notification) -> Result<(), AppError> {
        let payload = PushPayload {
            recipients,
            kind: notification.kind.as_str(),
            title: &notification.title,
            body: &notification.body,
            family_id: &notification.family_id,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Push service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Push service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
