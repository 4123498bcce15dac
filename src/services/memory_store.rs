use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::BookingStore;
use crate::error::AppResult;
use crate::models::{Booking, BookingStatus};

/// Booking store kept in process memory. Used by tests and local dry runs.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<Vec<Booking>>,
    emails: Mutex<HashMap<Uuid, Option<String>>>,
    marks: AtomicUsize,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.bookings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(booking);
    }

    /// Registers a guest. `None` models an account without an address.
    pub fn insert_user(&self, user_id: Uuid, email: Option<&str>) {
        self.emails
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id, email.map(str::to_string));
    }

    pub fn get(&self, booking_id: Uuid) -> Option<Booking> {
        self.bookings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
    }

    /// Number of markers written so far
    pub fn mark_count(&self) -> usize {
        self.marks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn query_reminder_candidates(
        &self,
        dates: [NaiveDate; 2],
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        let bookings = self.bookings.lock().unwrap_or_else(|e| e.into_inner());

        Ok(bookings
            .iter()
            .filter(|b| dates.contains(&b.booking_date))
            .filter(|b| b.status == status)
            .filter(|b| b.reminder_sent_at.is_none())
            .cloned()
            .collect())
    }

    async fn mark_reminded(&self, booking_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let mut bookings = self.bookings.lock().unwrap_or_else(|e| e.into_inner());

        match bookings
            .iter_mut()
            .find(|b| b.id == booking_id && b.reminder_sent_at.is_none())
        {
            Some(booking) => {
                booking.reminder_sent_at = Some(at);
                self.marks.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn resolve_user_email(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let emails = self.emails.lock().unwrap_or_else(|e| e.into_inner());

        Ok(emails
            .get(&user_id)
            .cloned()
            .flatten()
            .filter(|e| !e.trim().is_empty()))
    }
}
