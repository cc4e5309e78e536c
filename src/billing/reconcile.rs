use std::time::Duration;
use tracing::{error, info, warn};

use super::carryover::CarryoverStore;
use super::client::BillingAuthority;
use super::error::BillingError;
use super::ledger::{CycleLedger, ShutdownCause};
use crate::shared::models::StartupPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReport {
    /// Billing acknowledged the cycles.
    Reported { burned: u64 },
    /// Billing did not acknowledge; the cycles were persisted as carryover.
    Deferred { burned: u64 },
    /// Another caller already claimed this run's report.
    AlreadyClaimed,
}

/// Reports the carryover of earlier runs and fetches this run's grant.
///
/// The local record is cleared only after billing accepted the startup call.
/// Any error here must stop the process.
pub async fn reconcile_startup(
    store: &CarryoverStore,
    billing: &dyn BillingAuthority,
) -> Result<StartupPayload, BillingError> {
    let carryover = store.total().await?;
    if carryover > 0 {
        info!("Reporting {} cycles left unreported by a previous run", carryover);
    }

    let payload = billing.startup(carryover).await?;

    let cleared = store.clear().await?;
    if cleared > 0 {
        info!("Cleared {} carryover records", cleared);
    }

    Ok(payload)
}

/// Reports this run's burned cycles, at most once per process.
///
/// The RPC gets `grace` to finish. On failure or timeout the amount is
/// written to the carryover store for the next startup to settle.
pub async fn report_shutdown(
    ledger: &CycleLedger,
    cause: ShutdownCause,
    store: &CarryoverStore,
    billing: &dyn BillingAuthority,
    grace: Duration,
) -> Result<ShutdownReport, BillingError> {
    let Some(burned) = ledger.begin_shutdown(cause).await else {
        return Ok(ShutdownReport::AlreadyClaimed);
    };

    info!("Reporting {} burned cycles ({:?})", burned, cause);

    let failure = match tokio::time::timeout(grace, billing.shutdown(burned)).await {
        Ok(Ok(())) => {
            ledger.mark_reported().await;
            return Ok(ShutdownReport::Reported { burned });
        }
        Ok(Err(e)) => e,
        Err(_) => BillingError::Timeout(grace),
    };

    warn!("Shutdown report failed: {}", failure);
    if let Err(e) = store.record(burned).await {
        error!("Could not persist {} unreported cycles: {}", burned, e);
        return Err(e);
    }

    Ok(ShutdownReport::Deferred { burned })
}
