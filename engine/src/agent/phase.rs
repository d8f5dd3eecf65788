//! Agent phase and reentrancy guard
//!
//! An agent is either `Idle` or `Running` exactly one operation. Entering
//! `Running` goes through `PhaseGuard::acquire`, which fails if another
//! operation already holds the phase. The guard returns the agent to `Idle`
//! when dropped, so every exit path (success, error, panic unwind, a caller
//! dropping the future mid-await) releases it.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

use super::payroll::PayrollReport;
use crate::treasury::AgentAction;

/// What the agent is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "action", rename_all = "snake_case")]
pub enum AgentPhase {
    Idle,
    Running(AgentAction),
}

/// Terminal outcome of a single cycle invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The cycle ran to the end. Carries the payroll report when payments ran.
    Completed { payroll: Option<PayrollReport> },

    /// Yield refresh failed and the cycle stopped
    Failed { reason: String },

    /// Another operation was running; nothing was touched
    Rejected,
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// Holds the agent in `Running` until dropped
#[derive(Debug)]
pub(crate) struct PhaseGuard<'a> {
    phase: &'a Mutex<AgentPhase>,
}

impl<'a> PhaseGuard<'a> {
    /// Move `Idle -> Running(action)`, or return `None` if already running
    pub(crate) fn acquire(phase: &'a Mutex<AgentPhase>, action: AgentAction) -> Option<Self> {
        let mut current = phase.lock().unwrap_or_else(PoisonError::into_inner);
        match *current {
            AgentPhase::Idle => {
                *current = AgentPhase::Running(action);
                Some(Self { phase })
            }
            AgentPhase::Running(_) => None,
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        let mut current = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        *current = AgentPhase::Idle;
    }
}
