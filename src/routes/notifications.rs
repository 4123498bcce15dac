//! Notification delivery endpoint, called by the booking flow and by remote
//! reminder jobs.
//!
//! - POST /api/notifications - Deliver a `booking`, `promo_used` or
//!   `booking_reminder` notification

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::ServiceAuth;
use crate::error::{AppError, AppResult};
use crate::models::Notification;
use crate::services::NotificationSender;

/// POST /api/notifications
pub async fn send_notification(
    sender: web::Data<dyn NotificationSender>,
    _auth: ServiceAuth,
    body: web::Json<Notification>,
) -> AppResult<HttpResponse> {
    let notification = body.into_inner();
    log::info!("Received {} notification", notification.kind());

    let result = sender.send(&notification).await;
    if !result.success {
        let message = result
            .error_message
            .unwrap_or_else(|| "unknown delivery error".to_string());
        log::error!("Failed to deliver {} notification: {}", notification.kind(), message);
        return Err(AppError::Notification(message));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Configure notification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/notifications", web::post().to(send_notification));
}
