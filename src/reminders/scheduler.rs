//! The booking reminder job.
//!
//! Each run picks the bookings that start roughly 72 hours from now, sends
//! the guest one reminder, and stamps `reminder_sent_at` so later runs skip
//! the booking. Runs can be triggered at any cadence without external
//! deduplication:
//!
//! 1. a coarse store query by calendar date (cheap, over-inclusive),
//! 2. an exact in-memory check of the scheduled instant against the window,
//! 3. the persisted marker, written only if still null.
//!
//! Every candidate is processed on its own; a failure is logged and counted
//! and the batch moves on. A booking whose delivery failed stays unmarked and
//! is picked up again by the next run that still has it in the window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::clock::Clock;
use super::window::ReminderWindow;
use crate::config::ReminderConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, Notification, ReminderNotice};
use crate::services::{BookingStore, NotificationSender};

/// What happened to a single candidate booking
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderOutcome {
    /// Delivered and marked
    Sent,
    /// Matched the date query but starts outside the window
    OutsideWindow { hours_until: f64 },
    /// The guest has no e-mail address on file
    MissingEmail,
    /// Delivery failed; the booking stays eligible
    DispatchFailed { error: String },
    /// Delivered, but a concurrent run had already written the marker
    AlreadyReminded,
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Bookings delivered and marked on this run
    pub reminders_sent: u32,
    pub candidates: u32,
    pub outside_window: u32,
    pub missing_email: u32,
    pub already_reminded: u32,
    /// Delivery failures plus bookings that errored while being processed
    pub failed: u32,
}

impl RunSummary {
    fn record(&mut self, result: &AppResult<ReminderOutcome>) {
        match result {
            Ok(ReminderOutcome::Sent) => self.reminders_sent += 1,
            Ok(ReminderOutcome::OutsideWindow { .. }) => self.outside_window += 1,
            Ok(ReminderOutcome::MissingEmail) => self.missing_email += 1,
            Ok(ReminderOutcome::AlreadyReminded) => self.already_reminded += 1,
            Ok(ReminderOutcome::DispatchFailed { .. }) | Err(_) => self.failed += 1,
        }
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn BookingStore>,
    sender: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
    lead: Duration,
    tolerance: Duration,
    /// Serializes runs started from this process
    run_lock: Mutex<()>,
}

impl ReminderScheduler {
    /// Creates a scheduler with the default 72h ± 1h window
    pub fn new(
        store: Arc<dyn BookingStore>,
        sender: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(store, sender, clock, &ReminderConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn BookingStore>,
        sender: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        config: &ReminderConfig,
    ) -> Self {
        Self {
            store,
            sender,
            clock,
            lead: Duration::hours(config.lead_hours),
            tolerance: Duration::hours(config.tolerance_hours),
            run_lock: Mutex::new(()),
        }
    }

    /// Window for a run starting at `now`
    pub fn window_at(&self, now: DateTime<Utc>) -> ReminderWindow {
        ReminderWindow::new(now, self.lead, self.tolerance)
    }

    /// Runs the job once.
    ///
    /// Fails only when the candidate query itself fails; in that case nothing
    /// was sent or written. Per-booking problems are absorbed into the summary.
    pub async fn run(&self) -> AppResult<RunSummary> {
        let _guard = self.run_lock.lock().await;

        let now = self.clock.now();
        let window = self.window_at(now);
        let [start_date, end_date] = window.candidate_dates();

        log::info!(
            "Checking for bookings on {} and {} (window {} .. {})",
            start_date,
            end_date,
            window.start.format("%Y-%m-%d %H:%M UTC"),
            window.end.format("%Y-%m-%d %H:%M UTC"),
        );

        let candidates = self
            .store
            .query_reminder_candidates(window.candidate_dates(), BookingStatus::Completed)
            .await
            .map_err(|e| {
                log::error!("Failed to query reminder candidates: {}", e);
                e
            })?;

        let mut summary = RunSummary {
            candidates: candidates.len() as u32,
            ..Default::default()
        };

        log::info!("Found {} candidate booking(s)", summary.candidates);

        for booking in &candidates {
            let result = self.process_booking(booking, &window).await;
            if let Err(ref e) = result {
                log::error!("Error processing booking {}: {}", booking.id, e);
            }
            summary.record(&result);
        }

        log::info!(
            "Reminder run completed: {} sent, {} outside window, {} without email, {} already reminded, {} failed",
            summary.reminders_sent,
            summary.outside_window,
            summary.missing_email,
            summary.already_reminded,
            summary.failed,
        );

        Ok(summary)
    }

    /// Handles one candidate: fine filter, address lookup, delivery, marker
    pub async fn process_booking(
        &self,
        booking: &Booking,
        window: &ReminderWindow,
    ) -> AppResult<ReminderOutcome> {
        let scheduled_at = booking.scheduled_at();
        let hours_until = window.hours_until(scheduled_at);

        if !window.contains(scheduled_at) {
            log::debug!(
                "Booking {} outside window ({:.2}h away)",
                booking.id,
                hours_until
            );
            return Ok(ReminderOutcome::OutsideWindow { hours_until });
        }

        let guest_email = match self.store.resolve_user_email(booking.user_id).await? {
            Some(email) => email,
            None => {
                log::warn!(
                    "No email for user {} (booking {})",
                    booking.user_id,
                    booking.id
                );
                return Ok(ReminderOutcome::MissingEmail);
            }
        };

        let notification = Notification::BookingReminder(ReminderNotice {
            guest_email: guest_email.clone(),
            experience_name: booking.experience_name.clone(),
            vendor_name: booking.vendor_name.clone(),
            date: booking.booking_date,
            time: booking.display_time(),
            guests: booking.guests,
        });

        let result = self.sender.send(&notification).await;
        if !result.success {
            let error = result
                .error_message
                .unwrap_or_else(|| "unknown delivery error".to_string());
            log::warn!("Reminder failed for booking {}: {}", booking.id, error);
            return Ok(ReminderOutcome::DispatchFailed { error });
        }

        let marked = self
            .store
            .mark_reminded(booking.id, window.now)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "reminder delivered but not recorded, it may be sent again: {}",
                    e
                ))
            })?;

        if !marked {
            log::warn!(
                "Booking {} was marked by a concurrent run; reminder may have been sent twice",
                booking.id
            );
            return Ok(ReminderOutcome::AlreadyReminded);
        }

        log::info!(
            "Reminder sent for booking {} to {} ({:.2}h ahead)",
            booking.id,
            guest_email,
            hours_until
        );

        Ok(ReminderOutcome::Sent)
    }
}
