use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::scheduler::{ReminderScheduler, RunSummary};

/// Spawns the periodic reminder loop.
///
/// The first run starts immediately. Ticks missed while a run is still in
/// progress are skipped rather than bunched up.
pub fn spawn(scheduler: Arc<ReminderScheduler>, period: Duration) -> JoinHandle<()> {
    log::info!("Starting reminder worker (every {}s)", period.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_once(&scheduler).await;
        }
    })
}

/// Runs the job once and logs the outcome. A failed run never ends the loop.
pub async fn run_once(scheduler: &ReminderScheduler) -> Option<RunSummary> {
    match scheduler.run().await {
        Ok(summary) => Some(summary),
        Err(e) => {
            log::error!("Reminder run failed: {}", e);
            None
        }
    }
}
