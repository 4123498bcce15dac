pub mod booking_store;
pub mod memory_store;
pub mod notification;

pub use booking_store::{BookingStore, PgBookingStore};
pub use memory_store::InMemoryBookingStore;
pub use notification::{
    create_sender, EmailNotifier, NotificationResult, NotificationSender, WebhookNotifier,
};
