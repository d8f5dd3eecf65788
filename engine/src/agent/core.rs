//! Agent Core
//!
//! This module implements the treasury agent that orchestrates each cycle:
//!
//! 1. Refresh the vault yield and accrue one day of growth
//! 2. Ask the rebalance policy whether the reserve needs topping up
//! 3. Swap yield asset into the reserve if so
//! 4. On the payment day, pay every pending payroll entry
//! 5. Record each decision in the bounded status log
//!
//! # Failure handling
//!
//! - Yield refresh failure fails the cycle; nothing is mutated
//! - Rebalance failure is logged and the cycle continues
//! - A failed payroll entry never stops the rest of the batch
//!
//! Inside a cycle errors only surface through the status log. The manual
//! operations (`check_yield`, `rebalance`, `execute_payroll`) return them.
//!
//! # Serialization
//!
//! Every public operation takes the same phase guard, so at most one
//! operation mutates the ledger at a time. The ledger lock is never held
//! across a gateway call.

use chrono::Utc;
use rust_decimal::Decimal;
use sdk::errors::TreasuryError;
use sdk::gateway::{GatewayError, TreasuryGateway};
use sdk::types::{PayrollEntry, YieldInfo};
use sdk::units::{from_base_units, to_base_units};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::clock::{is_payment_day, Clock, SystemClock};
use super::payroll::PayrollReport;
use super::phase::{AgentPhase, CycleOutcome, PhaseGuard};
use crate::config::{AgentConfig, Config, TokenConfig};
use crate::policy::{RebalanceAction, RebalanceDecision, RebalancePolicy};
use crate::treasury::{AgentAction, Severity, StatusEntry, StatusLog, TreasuryState};

/// Characters of a transaction id or address shown in status messages
const SHORT_HEX_LEN: usize = 10;

/// Ledger and log, mutated together under one lock
#[derive(Debug)]
pub(super) struct Ledger {
    pub(super) state: TreasuryState,
    pub(super) log: StatusLog,
}

/// Totals from a scheduled run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSummary {
    pub cycles_run: usize,
    pub completed: usize,
    pub failed: usize,
    pub rejected: usize,

    /// Roster with payroll outcomes applied
    pub roster: Vec<PayrollEntry>,
}

/// Treasury agent that owns the ledger and drives the gateway
pub struct TreasuryAgent {
    /// External services
    pub(super) gateway: Arc<dyn TreasuryGateway>,

    /// Decision parameters, fixed for the agent's lifetime
    pub(super) config: Arc<AgentConfig>,

    /// Token addresses and precision
    pub(super) tokens: TokenConfig,

    pub(super) policy: RebalancePolicy,

    pub(super) clock: Arc<dyn Clock>,

    ledger: Mutex<Ledger>,

    phase: Mutex<AgentPhase>,
}

impl TreasuryAgent {
    /// Create a new agent with an opening ledger
    pub fn new(
        gateway: Arc<dyn TreasuryGateway>,
        config: Arc<AgentConfig>,
        tokens: TokenConfig,
        initial: TreasuryState,
    ) -> Self {
        Self {
            gateway,
            config,
            tokens,
            policy: RebalancePolicy::new(),
            clock: Arc::new(SystemClock),
            ledger: Mutex::new(Ledger {
                state: initial,
                log: StatusLog::new(),
            }),
            phase: Mutex::new(AgentPhase::Idle),
        }
    }

    /// Create an agent from a loaded configuration
    pub fn from_config(config: &Config, gateway: Arc<dyn TreasuryGateway>) -> Self {
        Self::new(
            gateway,
            Arc::new(config.agent.clone()),
            config.tokens.clone(),
            config.treasury.initial_state(),
        )
    }

    /// Replace the calendar source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Copy of the status log, oldest entry first
    pub fn status_log(&self) -> Vec<StatusEntry> {
        self.ledger().log.snapshot()
    }

    /// Copy of the current ledger
    pub fn treasury_state(&self) -> TreasuryState {
        self.ledger().state.clone()
    }

    pub fn phase(&self) -> AgentPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Whether the agent's clock says today is the payment day
    pub fn is_payment_day(&self) -> bool {
        is_payment_day(self.clock.today(), self.config.payment_day)
    }

    /// Fetch the current yield and accrue one day of growth
    ///
    /// # Errors
    ///
    /// `ReentrancyRejected` if another operation is running, `YieldSource`
    /// if the rate lookup fails. The ledger is untouched on error.
    pub async fn check_yield(&self) -> Result<YieldInfo, TreasuryError> {
        let _guard = self.begin(AgentAction::CheckYield)?;
        self.refresh_yield().await
    }

    /// Top the reserve up to the floor if needed
    ///
    /// Returns the swap transaction id, or `None` when no swap was required
    /// or the yield asset cannot cover the shortfall yet.
    pub async fn rebalance(&self) -> Result<Option<String>, TreasuryError> {
        let _guard = self.begin(AgentAction::Rebalance)?;
        self.rebalance_step().await
    }

    /// Pay a batch of entries, provided today is the payment day
    ///
    /// The batch is processed exactly as given; callers pass pending entries.
    /// On any other day nothing is paid and the report is empty.
    pub async fn execute_payroll(
        &self,
        entries: &[PayrollEntry],
    ) -> Result<PayrollReport, TreasuryError> {
        let _guard = self.begin(AgentAction::ExecutePayroll)?;

        if !self.is_payment_day() {
            self.record(
                Severity::Info,
                Some(AgentAction::ExecutePayroll),
                format!(
                    "Not payment day (day {}). Skipping execution.",
                    self.config.payment_day
                ),
            );
            return Ok(PayrollReport::default());
        }

        Ok(self.execute_batch(entries).await)
    }

    /// Run one full agent cycle
    ///
    /// Never returns an error: failures are recorded in the status log and
    /// summarized in the returned outcome.
    pub async fn run_cycle(&self, entries: &[PayrollEntry]) -> CycleOutcome {
        let Some(_guard) = PhaseGuard::acquire(&self.phase, AgentAction::RunCycle) else {
            self.record(
                Severity::Warning,
                Some(AgentAction::RunCycle),
                "Agent cycle already running. Skipping.",
            );
            return CycleOutcome::Rejected;
        };

        self.record(
            Severity::Info,
            Some(AgentAction::RunCycle),
            "Starting agent cycle...",
        );

        match self.cycle_steps(entries).await {
            Ok(payroll) => {
                self.record(
                    Severity::Success,
                    Some(AgentAction::RunCycle),
                    "Agent cycle completed successfully!",
                );
                CycleOutcome::Completed { payroll }
            }
            Err(e) => {
                self.record(
                    Severity::Error,
                    Some(AgentAction::RunCycle),
                    format!("Agent cycle failed: {}", e),
                );
                CycleOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run cycles on a fixed interval
    ///
    /// The first cycle starts immediately. Stops after `max_cycles` cycles
    /// (when given), or once `shutdown` becomes `true` or its sender is dropped.
    /// Payroll outcomes are applied to the roster between cycles so an entry
    /// is never paid twice.
    pub async fn run_scheduled(
        &self,
        roster: Vec<PayrollEntry>,
        interval: Duration,
        max_cycles: Option<usize>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ScheduleSummary {
        let mut summary = ScheduleSummary {
            roster,
            ..ScheduleSummary::default()
        };

        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.run_cycle(&summary.roster).await;
            summary.cycles_run += 1;
            match &outcome {
                CycleOutcome::Completed { payroll } => {
                    summary.completed += 1;
                    if let Some(report) = payroll {
                        report.apply_to(&mut summary.roster);
                    }
                }
                CycleOutcome::Failed { .. } => summary.failed += 1,
                CycleOutcome::Rejected => summary.rejected += 1,
            }

            if max_cycles.is_some_and(|max| summary.cycles_run >= max) {
                break;
            }
        }

        info!(
            "Scheduled run finished: {} cycles ({} completed, {} failed, {} rejected)",
            summary.cycles_run, summary.completed, summary.failed, summary.rejected
        );
        summary
    }

    async fn cycle_steps(
        &self,
        entries: &[PayrollEntry],
    ) -> Result<Option<PayrollReport>, TreasuryError> {
        self.refresh_yield().await?;

        if let Err(e) = self.rebalance_step().await {
            debug!("Continuing cycle after rebalance failure: {}", e);
        }

        if !self.is_payment_day() {
            return Ok(None);
        }

        let pending: Vec<PayrollEntry> = entries
            .iter()
            .filter(|e| e.is_pending())
            .cloned()
            .collect();
        if pending.is_empty() {
            self.record(
                Severity::Info,
                Some(AgentAction::ExecutePayroll),
                "Payment day, but no pending payroll entries.",
            );
            return Ok(None);
        }

        Ok(Some(self.execute_batch(&pending).await))
    }

    pub(super) async fn refresh_yield(&self) -> Result<YieldInfo, TreasuryError> {
        self.record(
            Severity::Info,
            Some(AgentAction::CheckYield),
            format!("Checking yields from {} vault...", self.gateway.name()),
        );

        match self.call(self.gateway.yield_rate()).await {
            Ok(rate) => {
                let value = {
                    let mut ledger = self.ledger();
                    let value = ledger.state.accrue_daily_yield(rate);
                    ledger.log.record(
                        Severity::Success,
                        Some(AgentAction::CheckYield),
                        format!("Vault APY: {}% | yield value updated to {}", rate, value),
                    );
                    value
                };
                debug!("Yield asset revalued to {}", value);

                Ok(YieldInfo {
                    rate,
                    source: self.gateway.name().to_string(),
                    last_updated: Utc::now(),
                })
            }
            Err(e) => {
                let err = TreasuryError::YieldSource(e);
                self.record(
                    Severity::Error,
                    Some(AgentAction::CheckYield),
                    format!("Failed to check yields: {}", err),
                );
                Err(err)
            }
        }
    }

    pub(super) async fn rebalance_step(&self) -> Result<Option<String>, TreasuryError> {
        self.record(
            Severity::Info,
            Some(AgentAction::Rebalance),
            "Checking if rebalancing is needed...",
        );

        let (decision, reserve, threshold) = {
            let ledger = self.ledger();
            (
                self.policy.decide(&ledger.state, &self.config),
                ledger.state.reserve().value,
                self.policy.threshold_value(&ledger.state, &self.config),
            )
        };

        match decision {
            RebalanceDecision::Sufficient => {
                if reserve < threshold {
                    debug!(
                        "Reserve {} is under the proportional threshold {}; floor {} is met",
                        reserve, threshold, self.config.min_reserve
                    );
                }
                self.record(
                    Severity::Info,
                    Some(AgentAction::Rebalance),
                    "Reserve balance sufficient. No rebalancing needed.",
                );
                Ok(None)
            }
            RebalanceDecision::InsufficientYield { needed, available } => {
                self.record(
                    Severity::Warning,
                    Some(AgentAction::Rebalance),
                    format!(
                        "Insufficient yield balance for rebalancing (need {}, have {}). Waiting for yield.",
                        needed, available
                    ),
                );
                Ok(None)
            }
            RebalanceDecision::Convert(action) => {
                self.record(
                    Severity::Warning,
                    Some(AgentAction::Rebalance),
                    format!(
                        "Reserve below floor. Swapping {} worth of yield asset...",
                        action.value
                    ),
                );

                match self.swap(&action).await {
                    Ok(tx_id) => Ok(Some(tx_id)),
                    Err(e) => {
                        self.record(
                            Severity::Error,
                            Some(AgentAction::Rebalance),
                            format!("Rebalancing failed: {}", e),
                        );
                        Err(e)
                    }
                }
            }
        }
    }

    /// Quote, check and execute a conversion, then fold it into the ledger
    async fn swap(&self, action: &RebalanceAction) -> Result<String, TreasuryError> {
        let amount_in = to_base_units(action.units, self.tokens.yield_decimals).ok_or_else(|| {
            TreasuryError::Amount(format!("{} yield units out of range", action.units))
        })?;

        let quote = self
            .call(self.gateway.swap_quote(
                amount_in,
                &self.tokens.yield_token,
                &self.tokens.reserve_token,
            ))
            .await
            .map_err(TreasuryError::Swap)?;

        if quote.slippage_pct > self.config.max_slippage_pct {
            return Err(TreasuryError::SlippageExceeded {
                quoted: quote.slippage_pct,
                limit: self.config.max_slippage_pct,
            });
        }

        let reserve_in = from_base_units(quote.output_amount, self.tokens.reserve_decimals)
            .ok_or_else(|| {
                TreasuryError::Amount(format!("quote output {} out of range", quote.output_amount))
            })?;

        let tx_id = self
            .call(self.gateway.execute_swap(&quote))
            .await
            .map_err(TreasuryError::Swap)?;

        let mut ledger = self.ledger();
        ledger.state.apply_swap(action.value, action.units, reserve_in)?;
        ledger.log.record(
            Severity::Success,
            Some(AgentAction::Rebalance),
            format!(
                "Rebalancing complete! Swapped {} of yield asset for {} reserve. TX: {}...",
                action.value,
                reserve_in,
                short_hex(&tx_id)
            ),
        );

        Ok(tx_id)
    }

    /// Await a gateway call, bounded by the configured timeout
    pub(super) async fn call<T, F>(&self, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match self.config.gateway_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
                .await
                .unwrap_or(Err(GatewayError::Timeout)),
            None => call.await,
        }
    }

    fn begin(&self, action: AgentAction) -> Result<PhaseGuard<'_>, TreasuryError> {
        PhaseGuard::acquire(&self.phase, action).ok_or_else(|| {
            self.record(
                Severity::Warning,
                Some(action),
                "Another treasury operation is running. Skipping.",
            );
            TreasuryError::ReentrancyRejected
        })
    }

    pub(super) fn record(
        &self,
        severity: Severity,
        action: Option<AgentAction>,
        message: impl Into<String>,
    ) {
        self.ledger().log.record(severity, action, message);
    }

    pub(super) fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn reserve_value(&self) -> Decimal {
        self.ledger().state.reserve().value
    }
}

pub(super) fn short_hex(hex: &str) -> &str {
    hex.get(..SHORT_HEX_LEN).unwrap_or(hex)
}
