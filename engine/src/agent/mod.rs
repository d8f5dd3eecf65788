//! Treasury Agent
//!
//! The agent owns the treasury ledger and its status log, drives the external
//! gateway, and serializes every operation through a single phase guard.

pub mod clock;
pub mod core;
pub mod payroll;
pub mod phase;

pub use self::core::{ScheduleSummary, TreasuryAgent};
pub use clock::{is_payment_day, Clock, FixedClock, SystemClock};
pub use payroll::{
    EntryOutcome, PaymentFailure, PaymentResult, PayrollReport, INSUFFICIENT_BALANCE,
    INVALID_AMOUNT, RESOLUTION_FAILED,
};
pub use phase::{AgentPhase, CycleOutcome};
