use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountingPhase {
    Active,
    ExhaustedShutdown,
    SignalShutdown,
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    Exhausted,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue { burned: u64 },
    Exhausted { burned: u64 },
    /// The ledger is already shutting down; nothing was counted.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub granted_cycles: u64,
    pub burned_cycles: u64,
    pub phase: AccountingPhase,
}

#[derive(Debug)]
struct LedgerState {
    burned: u64,
    phase: AccountingPhase,
    report_claimed: bool,
}

/// Cycles granted for this run and cycles burned so far.
///
/// Increment-and-compare happens under one lock, so readers never observe a
/// burned count whose exhaustion has not been recorded.
#[derive(Debug)]
pub struct CycleLedger {
    granted: u64,
    state: Mutex<LedgerState>,
}

impl CycleLedger {
    pub fn new(granted: u64) -> Self {
        Self {
            granted,
            state: Mutex::new(LedgerState {
                burned: 0,
                phase: AccountingPhase::Active,
                report_claimed: false,
            }),
        }
    }

    pub fn granted(&self) -> u64 {
        self.granted
    }

    pub async fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock().await;
        if state.phase != AccountingPhase::Active {
            return TickOutcome::Halted;
        }

        state.burned += 1;
        if state.burned >= self.granted {
            state.phase = AccountingPhase::ExhaustedShutdown;
            TickOutcome::Exhausted { burned: state.burned }
        } else {
            TickOutcome::Continue { burned: state.burned }
        }
    }

    /// Freezes the counter and claims the one shutdown report of this run.
    /// Returns the cycles to report, or `None` if the report was already claimed.
    pub async fn begin_shutdown(&self, cause: ShutdownCause) -> Option<u64> {
        let mut state = self.state.lock().await;
        if state.report_claimed {
            return None;
        }
        state.report_claimed = true;

        if state.phase == AccountingPhase::Active {
            state.phase = match cause {
                ShutdownCause::Exhausted => AccountingPhase::ExhaustedShutdown,
                ShutdownCause::Signal => AccountingPhase::SignalShutdown,
            };
        }
        Some(state.burned)
    }

    /// The billing authority accepted the report; nothing is owed any more.
    pub async fn mark_reported(&self) {
        let mut state = self.state.lock().await;
        state.phase = AccountingPhase::Reported;
        state.burned = 0;
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock().await;
        LedgerSnapshot {
            granted_cycles: self.granted,
            burned_cycles: state.burned,
            phase: state.phase,
        }
    }
}
