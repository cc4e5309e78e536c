mod accountant;
mod carryover;
mod client;
mod error;
mod ledger;
mod reconcile;

#[cfg(test)]
pub mod scripted;

pub use accountant::UptimeAccountant;
pub use carryover::CarryoverStore;
pub use client::{BillingAuthority, BillingClient};
pub use ledger::{AccountingPhase, CycleLedger, LedgerSnapshot, ShutdownCause, TickOutcome};
pub use reconcile::{reconcile_startup, report_shutdown, ShutdownReport};
