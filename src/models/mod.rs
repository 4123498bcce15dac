pub mod booking;
pub mod notification;

pub use booking::{Booking, BookingStatus, CreateBooking};
pub use notification::{BookingNotice, Notification, PromoUsedNotice, ReminderNotice};
