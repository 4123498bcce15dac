//! Notification delivery.
//!
//! Reminders and admin notices go out through a [`NotificationSender`].
//! Two channels exist: the webhook notifier forwards the JSON payload to an
//! external notification function, the e-mail notifier talks SMTP directly.

pub mod email;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::NotificationConfig;
use crate::models::Notification;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

// =============================================================================
// Notification Result
// =============================================================================

/// Result of a notification delivery attempt
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResult {
    /// Whether the notification was delivered successfully
    pub success: bool,
    /// HTTP status code (if applicable)
    pub http_status: Option<u16>,
    /// Error message (if failed)
    pub error_message: Option<String>,
}

impl NotificationResult {
    /// Creates a successful result
    pub fn success(http_status: Option<u16>) -> Self {
        Self {
            success: true,
            http_status,
            error_message: None,
        }
    }

    /// Creates a failed result
    pub fn failure(error_message: String, http_status: Option<u16>) -> Self {
        Self {
            success: false,
            http_status,
            error_message: Some(error_message),
        }
    }
}

// =============================================================================
// Notification Sender Trait
// =============================================================================

/// A delivery channel for notifications.
///
/// Delivery failures are reported through [`NotificationResult`], not as
/// errors, so one bad recipient never aborts a batch.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> NotificationResult;
}

// =============================================================================
// Sender Factory
// =============================================================================

/// Picks the delivery channel for reminders: the webhook when one is
/// configured, SMTP otherwise
pub fn create_sender(
    config: &NotificationConfig,
    service_api_key: Option<&str>,
) -> Arc<dyn NotificationSender> {
    match config.webhook_url {
        Some(ref url) => {
            log::info!("Reminders will be delivered through webhook {}", url);
            Arc::new(WebhookNotifier::new(
                url.clone(),
                service_api_key.map(str::to_string),
                config.webhook_secret.clone(),
            ))
        }
        None => {
            log::info!("Reminders will be delivered over SMTP");
            Arc::new(EmailNotifier::new(
                config.smtp.clone(),
                config.admin_email.clone(),
            ))
        }
    }
}
