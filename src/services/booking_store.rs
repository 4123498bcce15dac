//! Booking persistence used by the reminder job.
//!
//! The job only needs three things from storage: the coarse candidate query,
//! the completion marker, and the guest's e-mail address. They are expressed
//! as the [`BookingStore`] trait so the job can run against PostgreSQL in
//! production and against [`InMemoryBookingStore`](super::InMemoryBookingStore)
//! in tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, CreateBooking};

/// Storage operations the reminder job depends on
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings dated on either of `dates`, in `status`, with no reminder sent yet
    async fn query_reminder_candidates(
        &self,
        dates: [NaiveDate; 2],
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>>;

    /// Sets `reminder_sent_at` if it is still null.
    ///
    /// Returns `false` when the marker was already present (another run got
    /// there first) or the booking no longer exists.
    async fn mark_reminded(&self, booking_id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// E-mail address of the owning guest, if one is on file
    async fn resolve_user_email(&self, user_id: Uuid) -> AppResult<Option<String>>;
}

const BOOKING_COLUMNS: &str = "id, user_id, booking_date, booking_time, status, reminder_sent_at, \
     experience_name, vendor_name, guests, created_at";

/// PostgreSQL-backed booking store
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a booking by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    /// Creates a booking
    pub async fn create(&self, input: CreateBooking) -> AppResult<Booking> {
        if input.guests < 1 {
            return Err(AppError::Validation(
                "A booking needs at least one guest".to_string(),
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (
                user_id, booking_date, booking_time, status,
                experience_name, vendor_name, guests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(input.user_id)
        .bind(input.booking_date)
        .bind(input.booking_time)
        .bind(input.status.to_string())
        .bind(&input.experience_name)
        .bind(&input.vendor_name)
        .bind(input.guests)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound(format!("User {} not found", input.user_id));
                }
            }
            AppError::Database(e)
        })?;

        Ok(booking)
    }

    /// Creates a guest account and returns its ID
    pub async fn create_user(&self, email: Option<&str>) -> AppResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as("INSERT INTO users (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn query_reminder_candidates(
        &self,
        dates: [NaiveDate; 2],
        status: BookingStatus,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE booking_date = ANY($1)
              AND status = $2
              AND reminder_sent_at IS NULL
            ORDER BY booking_date, booking_time NULLS FIRST
            "#,
            BOOKING_COLUMNS
        ))
        .bind(dates.to_vec())
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn mark_reminded(&self, booking_id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET reminder_sent_at = $2
            WHERE id = $1 AND reminder_sent_at IS NULL
            "#,
        )
        .bind(booking_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn resolve_user_email(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let email: Option<Option<String>> =
            sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(email.flatten().filter(|e| !e.trim().is_empty()))
    }
}
