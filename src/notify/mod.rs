use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::models::Reminder;
use crate::services::reminders::notification_body;

/// Delivers a "reminder due" notification somewhere a person will see it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> Result<(), AppError>;
}

/// Writes due reminders to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<(), AppError> {
        info!(
            "Reminder due! {} (deadline {}, {})",
            notification_body(reminder),
            reminder.deadline,
            reminder.intensity
        );
        Ok(())
    }
}

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _reminder: &Reminder) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub title: &'static str,
    pub body: String,
    pub reminder_id: &'a str,
    pub deadline: &'a str,
    pub intensity: &'a str,
}

impl<'a> WebhookPayload<'a> {
    pub fn new(reminder: &'a Reminder) -> Self {
        Self {
            title: "Reminder Due!",
            body: notification_body(reminder),
            reminder_id: &reminder.id,
            deadline: &reminder.deadline,
            intensity: reminder.intensity.as_str(),
        }
    }
}

/// POSTs a JSON payload per due reminder to a fixed URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload::new(reminder))
            .send()
            .await
            .map_err(|e| AppError::Notify(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notify(format!("webhook returned {}: {}", status, body)));
        }
        Ok(())
    }
}
