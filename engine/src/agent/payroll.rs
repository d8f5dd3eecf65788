//! Payroll batch execution
//!
//! Entries are paid one at a time, in order. Each entry either yields a
//! transaction id or a failure reason; one failed entry never stops the
//! batch. The reserve is debited only after the gateway confirms a transfer.

use rust_decimal::{Decimal, RoundingStrategy};
use sdk::errors::TreasuryError;
use sdk::types::{PaymentStatus, PayrollEntry};
use sdk::units::to_base_units;
use serde::Serialize;

use super::core::{short_hex, TreasuryAgent};
use crate::treasury::{AgentAction, Severity};

pub const RESOLUTION_FAILED: &str = "resolution failed";
pub const INSUFFICIENT_BALANCE: &str = "insufficient balance";
pub const INVALID_AMOUNT: &str = "invalid amount";

/// A payment that did not go through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentFailure {
    pub recipient: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PaymentResult {
    Paid { tx_id: String },
    Failed { reason: String },
}

/// Per-entry outcome, in batch order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub entry_id: String,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<String>,
    #[serde(flatten)]
    pub result: PaymentResult,
}

/// Result of one payroll batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PayrollReport {
    /// Transaction ids of successful payments
    pub successful: Vec<String>,

    pub failed: Vec<PaymentFailure>,

    pub outcomes: Vec<EntryOutcome>,
}

impl PayrollReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Write each outcome back onto the matching roster entry
    ///
    /// Paid entries become `Completed` and remember the address they were
    /// paid to; failed entries become `Failed`. Entries not in the report
    /// are left alone.
    pub fn apply_to(&self, roster: &mut [PayrollEntry]) {
        for outcome in &self.outcomes {
            let Some(entry) = roster.iter_mut().find(|e| e.id == outcome.entry_id) else {
                continue;
            };
            match &outcome.result {
                PaymentResult::Paid { .. } => {
                    entry.status = PaymentStatus::Completed;
                    entry.resolved_address = outcome.resolved_address.clone();
                }
                PaymentResult::Failed { .. } => entry.status = PaymentStatus::Failed,
            }
        }
    }

    fn push(&mut self, entry: &PayrollEntry, resolved: Option<String>, result: PaymentResult) {
        match &result {
            PaymentResult::Paid { tx_id } => self.successful.push(tx_id.clone()),
            PaymentResult::Failed { reason } => self.failed.push(PaymentFailure {
                recipient: entry.recipient.clone(),
                reason: reason.clone(),
            }),
        }
        self.outcomes.push(EntryOutcome {
            entry_id: entry.id.clone(),
            recipient: entry.recipient.clone(),
            resolved_address: resolved,
            result,
        });
    }
}

impl TreasuryAgent {
    /// Pay every entry in `entries`, topping up the reserve first
    pub(super) async fn execute_batch(&self, entries: &[PayrollEntry]) -> PayrollReport {
        self.record(
            Severity::Info,
            Some(AgentAction::ExecutePayroll),
            format!(
                "Starting payroll execution for {} recipients...",
                entries.len()
            ),
        );

        if let Err(e) = self.rebalance_step().await {
            self.record(
                Severity::Warning,
                Some(AgentAction::ExecutePayroll),
                format!("Proceeding with existing reserve after rebalance failure: {}", e),
            );
        }

        let mut report = PayrollReport::default();
        for entry in entries {
            let (resolved, result) = match self.pay_entry(entry).await {
                Ok((address, tx_id)) => {
                    self.record(
                        Severity::Success,
                        Some(AgentAction::ExecutePayroll),
                        format!(
                            "Paid {} to {}. TX: {}...",
                            entry.amount,
                            entry.recipient,
                            short_hex(&tx_id)
                        ),
                    );
                    (Some(address), PaymentResult::Paid { tx_id })
                }
                Err((address, reason)) => {
                    self.record(
                        Severity::Error,
                        Some(AgentAction::ExecutePayroll),
                        format!("Payment to {} failed: {}", entry.recipient, reason),
                    );
                    (address, PaymentResult::Failed { reason })
                }
            };
            report.push(entry, resolved, result);
        }

        let paid = report.successful.len();
        let total = entries.len();
        if paid > 0 {
            self.record(
                Severity::Success,
                Some(AgentAction::ExecutePayroll),
                format!("Payroll completed: {}/{} payments successful", paid, total),
            );
        } else {
            self.record(
                Severity::Error,
                Some(AgentAction::ExecutePayroll),
                format!("Payroll failed: 0/{} payments successful", total),
            );
        }

        report
    }

    /// Resolve, check, transfer and debit one entry
    ///
    /// On failure returns the address (if resolution got that far) and a reason.
    async fn pay_entry(
        &self,
        entry: &PayrollEntry,
    ) -> Result<(String, String), (Option<String>, String)> {
        let decimals = self.tokens.reserve_decimals;
        let amount = entry
            .amount
            .round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
        if amount <= Decimal::ZERO {
            return Err((None, INVALID_AMOUNT.to_string()));
        }
        let base_units =
            to_base_units(amount, decimals).ok_or((None, INVALID_AMOUNT.to_string()))?;

        self.record(
            Severity::Info,
            Some(AgentAction::ExecutePayroll),
            format!("Resolving {}...", entry.recipient),
        );
        let address = match self.call(self.gateway.resolve_name(&entry.recipient)).await {
            Ok(Some(address)) if !address.is_empty() => address,
            Ok(_) => return Err((None, RESOLUTION_FAILED.to_string())),
            Err(e) => return Err((None, e.to_string())),
        };
        self.record(
            Severity::Success,
            Some(AgentAction::ExecutePayroll),
            format!("Resolved {} → {}...", entry.recipient, short_hex(&address)),
        );

        if self.reserve_value() < amount {
            return Err((Some(address), INSUFFICIENT_BALANCE.to_string()));
        }

        let tx_id = match self.call(self.gateway.transfer(&address, base_units)).await {
            Ok(tx_id) => tx_id,
            Err(e) => return Err((Some(address), e.to_string())),
        };

        // Only this operation mutates the ledger, so the balance checked above
        // still holds here.
        if let Err(e) = self.ledger().state.debit_reserve(amount) {
            let reason = match e {
                TreasuryError::InsufficientFunds { .. } => INSUFFICIENT_BALANCE.to_string(),
                other => other.to_string(),
            };
            return Err((Some(address), reason));
        }

        Ok((address, tx_id))
    }
}
