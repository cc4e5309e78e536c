use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::ledger::{CycleLedger, TickOutcome};

/// Burns one cycle per interval until the grant is used up.
pub struct UptimeAccountant {
    ledger: Arc<CycleLedger>,
    interval: Duration,
}

impl UptimeAccountant {
    pub fn new(ledger: Arc<CycleLedger>, interval: Duration) -> Self {
        Self { ledger, interval }
    }

    /// Returns once the grant is exhausted or the ledger stops counting.
    pub async fn run(self) -> TickOutcome {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let granted = self.ledger.granted();

        loop {
            ticker.tick().await;

            match self.ledger.tick().await {
                TickOutcome::Continue { burned } => {
                    debug!("Burned cycles: {}/{}", burned, granted);
                }
                outcome @ TickOutcome::Exhausted { burned } => {
                    warn!("Allowed uptime reached ({}/{} cycles), shutting down", burned, granted);
                    return outcome;
                }
                TickOutcome::Halted => return TickOutcome::Halted,
            }
        }
    }
}
