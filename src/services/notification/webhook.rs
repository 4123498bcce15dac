//! Webhook notification sender.
//!
//! POSTs the notification as JSON to the notification function, authenticated
//! with the service key. Optionally signs the body with HMAC-SHA256.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{NotificationResult, NotificationSender};
use crate::models::Notification;

type HmacSha256 = Hmac<Sha256>;

/// Upper bound for a single delivery, so a stuck endpoint cannot stall a batch
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Webhook notification sender
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
    signing_secret: Option<String>,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier
    pub fn new(url: String, bearer_token: Option<String>, signing_secret: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::error!("Failed to configure HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            url,
            bearer_token,
            signing_secret,
        }
    }

    /// Generates HMAC-SHA256 signature for webhook payload
    pub fn generate_signature(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> NotificationResult {
        let body = match serde_json::to_vec(notification) {
            Ok(b) => b,
            Err(e) => {
                return NotificationResult::failure(
                    format!("Failed to serialize payload: {}", e),
                    None,
                )
            }
        };

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");

        if let Some(ref token) = self.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        if let Some(ref secret) = self.signing_secret {
            let timestamp = Utc::now().timestamp().to_string();
            let signature = Self::generate_signature(secret, &timestamp, &body);
            request = request
                .header("X-Stackd-Timestamp", timestamp)
                .header("X-Stackd-Signature", format!("sha256={}", signature));
        }

        match request.body(body).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    NotificationResult::success(Some(status))
                } else {
                    let error_body = response.text().await.unwrap_or_default();
                    let error_msg = if error_body.is_empty() {
                        format!("HTTP {}", status)
                    } else {
                        format!("HTTP {}: {}", status, error_body)
                    };
                    NotificationResult::failure(error_msg, Some(status))
                }
            }
            Err(e) => {
                let error_msg = if e.is_timeout() {
                    "Request timed out".to_string()
                } else if e.is_connect() {
                    "Connection failed".to_string()
                } else {
                    format!("Request failed: {}", e)
                };
                NotificationResult::failure(error_msg, None)
            }
        }
    }
}
