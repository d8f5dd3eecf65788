//! Shared fixtures for agent integration tests

#![allow(dead_code)]

use autocfo_engine::agent::{FixedClock, TreasuryAgent};
use autocfo_engine::config::Config;
use autocfo_engine::gateway::SimulatedGateway;
use autocfo_engine::treasury::{Severity, StatusEntry, TreasuryState};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sdk::types::PayrollEntry;
use std::sync::Arc;

/// Configured payment day is the 25th
pub fn payment_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()
}

pub fn ordinary_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 3).unwrap()
}

pub fn simulated_gateway() -> SimulatedGateway {
    let config = Config::default_config();
    SimulatedGateway::new(&config.simulation, &config.tokens)
}

pub fn agent(gateway: Arc<SimulatedGateway>, state: TreasuryState, today: NaiveDate) -> TreasuryAgent {
    let config = Config::default_config();
    TreasuryAgent::new(gateway, Arc::new(config.agent), config.tokens, state)
        .with_clock(Arc::new(FixedClock(today)))
}

pub fn demo_state() -> TreasuryState {
    Config::default_config().treasury.initial_state()
}

pub fn state(yield_value: Decimal, reserve: Decimal) -> TreasuryState {
    TreasuryState::new(yield_value, yield_value, Decimal::new(65, 1), reserve)
}

pub fn entry(id: &str, recipient: &str, amount: Decimal) -> PayrollEntry {
    PayrollEntry::new(id, recipient, amount, payment_day())
}

pub fn count(log: &[StatusEntry], severity: Severity, needle: &str) -> usize {
    log.iter()
        .filter(|e| e.severity == severity && e.message.contains(needle))
        .count()
}
