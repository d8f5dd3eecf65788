//! Treasury ledger and status log
//!
//! Both are owned by a single agent instance and only mutated by it.

pub mod state;
pub mod status_log;

pub use state::{ReservePosition, TreasuryState, YieldPosition, MONEY_SCALE};
pub use status_log::{AgentAction, Severity, StatusEntry, StatusLog, STATUS_LOG_CAPACITY};
