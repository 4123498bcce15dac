//! Reminder job trigger.
//!
//! - POST /api/reminders/run - Run the booking reminder job once

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::ServiceAuth;
use crate::reminders::ReminderScheduler;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRemindersResponse {
    pub success: bool,
    pub reminders_count: u32,
}

#[derive(Serialize)]
pub struct RunRemindersError {
    pub error: String,
}

/// POST /api/reminders/run
///
/// Returns 200 with the number of reminders sent, even when some bookings
/// failed. Returns 500 only when the candidate query could not run.
pub async fn run_reminders(
    scheduler: web::Data<ReminderScheduler>,
    _auth: ServiceAuth,
) -> HttpResponse {
    match scheduler.run().await {
        Ok(summary) => HttpResponse::Ok().json(RunRemindersResponse {
            success: true,
            reminders_count: summary.reminders_sent,
        }),
        Err(e) => HttpResponse::InternalServerError().json(RunRemindersError {
            error: e.to_string(),
        }),
    }
}

/// Configure reminder routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/reminders/run", web::post().to(run_reminders));
}
