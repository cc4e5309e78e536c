use anyhow::{anyhow, Result};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::billing::{
    report_shutdown, BillingAuthority, CarryoverStore, CycleLedger, ShutdownCause, ShutdownReport, TickOutcome,
};

/// Why the agent stopped serving.
#[derive(Debug)]
pub enum StopReason {
    Signal,
    Exhausted,
    /// The uptime accountant ended before the grant ran out.
    AccountantFailed(String),
    /// The REST API stopped on its own.
    ServerExited(String),
}

impl StopReason {
    pub fn cause(&self) -> ShutdownCause {
        match self {
            StopReason::Exhausted => ShutdownCause::Exhausted,
            _ => ShutdownCause::Signal,
        }
    }
}

/// Resolves on the first termination signal, the end of the grant, or the
/// death of either background task.
pub async fn wait_for_stop(
    signals: &mut UnboundedReceiver<()>,
    accountant: &mut JoinHandle<TickOutcome>,
    server: &mut JoinHandle<Result<()>>,
) -> StopReason {
    tokio::select! {
        Some(()) = signals.recv() => {
            info!("Termination signal received, shutting down");
            StopReason::Signal
        }
        joined = accountant => match joined {
            Ok(TickOutcome::Exhausted { .. }) => StopReason::Exhausted,
            Ok(other) => {
                error!("Uptime accountant stopped early: {:?}", other);
                StopReason::AccountantFailed(format!("accountant stopped with {:?}", other))
            }
            Err(e) => {
                error!("Uptime accountant failed: {}", e);
                StopReason::AccountantFailed(e.to_string())
            }
        },
        joined = server => {
            let reason = match joined {
                Ok(Ok(())) => "REST API exited unexpectedly".to_string(),
                Ok(Err(e)) => format!("REST API failed: {}", e),
                Err(e) => format!("REST API task failed: {}", e),
            };
            error!("{}", reason);
            StopReason::ServerExited(reason)
        }
    }
}

/// Reports burned cycles for `reason` and decides the process outcome.
///
/// `grace` bounds the billing RPC, `deadline` bounds the whole report
/// including the carryover write. Cycles are reported even when the agent
/// stopped abnormally; the error is returned afterwards.
pub async fn settle(
    reason: &StopReason,
    ledger: &CycleLedger,
    store: &CarryoverStore,
    billing: &dyn BillingAuthority,
    grace: Duration,
    deadline: Duration,
) -> Result<ShutdownReport> {
    let report = tokio::time::timeout(deadline, report_shutdown(ledger, reason.cause(), store, billing, grace))
        .await
        .map_err(|_| {
            error!("Shutdown report did not finish within {:?}", deadline);
            anyhow!("shutdown report timed out after {:?}", deadline)
        })?
        .map_err(|e| {
            error!("Burned cycles could not be reported or saved: {}", e);
            anyhow::Error::new(e).context("shutdown reporting failed")
        })?;

    match report {
        ShutdownReport::Reported { burned } => info!("Reported {} burned cycles", burned),
        ShutdownReport::Deferred { burned } => warn!("{} burned cycles saved for the next startup", burned),
        ShutdownReport::AlreadyClaimed => {}
    }

    match reason {
        StopReason::AccountantFailed(msg) | StopReason::ServerExited(msg) => {
            Err(anyhow!("agent stopped abnormally: {}", msg))
        }
        StopReason::Signal | StopReason::Exhausted => Ok(report),
    }
}
