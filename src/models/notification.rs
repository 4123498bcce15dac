use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Notification payload accepted by the notification endpoint and produced by
/// the reminder job. Serialized as `{"type": "...", ...camelCase fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// New booking, sent to the admin inbox
    Booking(BookingNotice),
    /// Promo code redeemed, sent to the admin inbox
    PromoUsed(PromoUsedNotice),
    /// Pre-arrival reminder, sent to the guest
    BookingReminder(ReminderNotice),
}

impl Notification {
    /// Wire name of the notification type
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Booking(_) => "booking",
            Notification::PromoUsed(_) => "promo_used",
            Notification::BookingReminder(_) => "booking_reminder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingNotice {
    pub experience_name: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub guests: i32,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoUsedNotice {
    pub promo_code: String,
    pub experience_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub original_amount: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotice {
    pub guest_email: String,
    pub experience_name: String,
    pub vendor_name: Option<String>,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub guests: i32,
}
