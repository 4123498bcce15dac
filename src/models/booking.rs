use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    /// Paid and confirmed. The only state that receives reminders.
    Completed,
    Cancelled,
    Refunded,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// A guest's reservation for an experience
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    pub status: BookingStatus,
    /// Set once when the reminder went out. Never overwritten.
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub experience_name: String,
    pub vendor_name: Option<String>,
    pub guests: i32,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Instant the experience starts. Date and time carry no zone and are read
    /// as UTC; a missing time means midnight.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        let time = self.booking_time.unwrap_or(NaiveTime::MIN);
        NaiveDateTime::new(self.booking_date, time).and_utc()
    }

    /// `booking_time` as shown to guests (`HH:MM`)
    pub fn display_time(&self) -> Option<String> {
        self.booking_time.map(|t| t.format("%H:%M").to_string())
    }
}

/// Input for inserting a booking (used by seeding and tests)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    pub status: BookingStatus,
    pub experience_name: String,
    pub vendor_name: Option<String>,
    pub guests: i32,
}
