//! Bounded status log
//!
//! Every decision the agent makes lands here, newest last. Once the log is
//! full the oldest entry is evicted. Entries are mirrored to `tracing` so a
//! headless deployment gets the same audit trail in its log output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{error, info, warn};

/// Number of entries the log retains
pub const STATUS_LOG_CAPACITY: usize = 50;

/// Severity of a status entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.pad("info"),
            Severity::Success => f.pad("success"),
            Severity::Warning => f.pad("warning"),
            Severity::Error => f.pad("error"),
        }
    }
}

/// Operation that produced a status entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    CheckYield,
    Rebalance,
    ExecutePayroll,
    RunCycle,
}

impl AgentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentAction::CheckYield => "check_yield",
            AgentAction::Rebalance => "rebalance",
            AgentAction::ExecutePayroll => "execute_payroll",
            AgentAction::RunCycle => "run_cycle",
        }
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single status log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AgentAction>,
}

/// Bounded, insertion-ordered status log
#[derive(Debug, Clone)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
}

impl StatusLog {
    /// Create an empty log with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(STATUS_LOG_CAPACITY)
    }

    /// Create an empty log holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&mut self, entry: StatusEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Append a timestamped entry and mirror it to the tracing subscriber
    pub fn record(
        &mut self,
        severity: Severity,
        action: Option<AgentAction>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let tag = action.map(|a| a.as_str()).unwrap_or("-");

        match severity {
            Severity::Info | Severity::Success => info!(action = tag, %severity, "{}", message),
            Severity::Warning => warn!(action = tag, "{}", message),
            Severity::Error => error!(action = tag, "{}", message),
        }

        self.push(StatusEntry {
            timestamp: Utc::now(),
            message,
            severity,
            action,
        });
    }

    /// Copy of all entries, oldest first
    pub fn snapshot(&self) -> Vec<StatusEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_is_empty() {
        let log = StatusLog::new();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), STATUS_LOG_CAPACITY);
    }

    #[test]
    fn test_record_keeps_fields() {
        let mut log = StatusLog::new();
        log.record(Severity::Warning, Some(AgentAction::Rebalance), "reserve low");

        let entries = log.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "reserve low");
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[0].action, Some(AgentAction::Rebalance));
    }

    #[test]
    fn test_eviction_keeps_most_recent_in_order() {
        let mut log = StatusLog::new();
        for i in 0..60 {
            log.record(Severity::Info, None, format!("event {}", i));
        }

        let entries = log.snapshot();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries.first().unwrap().message, "event 10");
        assert_eq!(entries.last().unwrap().message, "event 59");
        for (offset, entry) in entries.iter().enumerate() {
            assert_eq!(entry.message, format!("event {}", offset + 10));
        }
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut log = StatusLog::with_capacity(3);
        log.record(Severity::Info, None, "first");

        let mut copy = log.snapshot();
        copy.clear();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_entry_serialization() {
        let mut log = StatusLog::new();
        log.record(Severity::Success, Some(AgentAction::CheckYield), "ok");
        let json = serde_json::to_string(&log.snapshot()[0]).unwrap();
        assert!(json.contains(r#""severity":"success""#));
        assert!(json.contains(r#""action":"check_yield""#));
    }
}
