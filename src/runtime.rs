//! Fixed-cadence tick scheduler.
//!
//! The replay clock is driven by a timer task, decoupled from whatever
//! renders the result: the core never sleeps on behalf of a UI. The task
//! only advances sessions that are in automatic mode and running; stopping
//! the session simply means the next interval finds nothing to do.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::replay::{Mode, ReplaySession};

/// Spawn the tick driver. Runs until the process exits; there is no
/// cancellation for in-flight ticks.
pub fn spawn_ticker(
    session: Arc<Mutex<ReplaySession>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_ms = interval.as_millis() as u64, "tick driver started");
        loop {
            ticker.tick().await;
            let mut session = session.lock().await;
            if session.mode() == Mode::Automatic && session.running() {
                session.tick();
            }
        }
    })
}
