//! Booking reminder job: window computation, the scheduler itself, and the
//! periodic worker that drives it.

pub mod clock;
pub mod scheduler;
pub mod window;
pub mod worker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use scheduler::{ReminderOutcome, ReminderScheduler, RunSummary};
pub use window::ReminderWindow;
