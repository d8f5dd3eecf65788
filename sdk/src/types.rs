//! Payroll, quote and yield types shared with gateways and presentation layers

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a payroll entry
///
/// The agent never changes this field on a caller's entry. Callers apply
/// transitions from the report returned by a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single payment owed to a recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub id: String,

    /// Human-readable name (e.g. `alice.eth`) or a raw address
    pub recipient: String,

    /// Amount in stable units
    pub amount: Decimal,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: PaymentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<String>,
}

impl PayrollEntry {
    /// Create a new pending entry
    pub fn new(
        id: impl Into<String>,
        recipient: impl Into<String>,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            recipient: recipient.into(),
            amount,
            due_date,
            status: PaymentStatus::Pending,
            resolved_address: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }
}

/// Quote returned by a swap venue
///
/// Amounts are integer base units of their respective tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_amount: u128,
    pub output_amount: u128,
    pub input_token: String,
    pub output_token: String,

    /// Expected slippage as a percentage (0.5 = 0.5%)
    pub slippage_pct: Decimal,
}

/// Result of a yield refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldInfo {
    /// Annualized yield percentage
    pub rate: Decimal,

    /// Gateway that reported the rate
    pub source: String,

    pub last_updated: DateTime<Utc>,
}
