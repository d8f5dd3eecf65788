use autocfo_engine::agent::{FixedClock, TreasuryAgent};
use autocfo_engine::config::{AgentConfig, Config};
use autocfo_engine::gateway::SimulatedGateway;
use autocfo_engine::policy::{RebalanceDecision, RebalancePolicy};
use autocfo_engine::treasury::{AgentAction, Severity, StatusLog, TreasuryState, STATUS_LOG_CAPACITY};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sdk::types::PayrollEntry;
use sdk::units::from_base_units;
use std::sync::Arc;

/// Stable-unit amount with up to two decimal places
fn money(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

#[derive(Debug, Clone)]
enum LedgerOp {
    Accrue(Decimal),
    Swap(Decimal),
    Debit(Decimal),
}

fn ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (0..=2000i64).prop_map(|bp| LedgerOp::Accrue(Decimal::new(bp, 2))),
        money(50_000_000).prop_map(LedgerOp::Swap),
        money(50_000_000).prop_map(LedgerOp::Debit),
    ]
}

proptest! {
    // total always equals the sum of both positions, and failed operations
    // leave the ledger untouched
    #[test]
    fn test_total_is_always_balanced(
        yield_value in money(100_000_000),
        reserve in money(100_000_000),
        ops in proptest::collection::vec(ledger_op(), 0..40),
    ) {
        let mut state = TreasuryState::new(yield_value, yield_value, Decimal::new(65, 1), reserve);
        prop_assert!(state.is_balanced());

        for op in ops {
            let before = state.clone();
            let result = match op {
                LedgerOp::Accrue(rate) => {
                    state.accrue_daily_yield(rate);
                    Ok(())
                }
                LedgerOp::Swap(value) => state.apply_swap(value, value, value),
                LedgerOp::Debit(amount) => state.debit_reserve(amount),
            };

            if result.is_err() {
                prop_assert_eq!(&state, &before);
            }
            prop_assert!(state.is_balanced());
            prop_assert!(state.reserve().value >= Decimal::ZERO);
            prop_assert!(state.yield_asset().value >= Decimal::ZERO);
        }
    }

    // A 1:1 swap moves value between positions without changing the total
    #[test]
    fn test_swap_conserves_total(
        yield_value in money(100_000_000),
        reserve in money(100_000_000),
        fraction in 0..=100u32,
    ) {
        let mut state = TreasuryState::new(yield_value, yield_value, Decimal::new(5, 0), reserve);
        let value = (yield_value * Decimal::from(fraction) / Decimal::ONE_HUNDRED).round_dp(2);
        let total = state.total();

        state.apply_swap(value, value, value).unwrap();

        prop_assert_eq!(state.total(), total);
        prop_assert_eq!(state.reserve().value, reserve + value);
    }

    // Conversions cover the shortfall exactly, never partially
    #[test]
    fn test_policy_covers_exact_shortfall(
        yield_value in money(10_000_000),
        reserve in money(10_000_000),
        min_reserve in money(10_000_000),
    ) {
        let state = TreasuryState::new(yield_value, yield_value, Decimal::new(65, 1), reserve);
        let config = AgentConfig { min_reserve, ..AgentConfig::default() };

        match RebalancePolicy::new().decide(&state, &config) {
            RebalanceDecision::Sufficient => prop_assert!(reserve >= min_reserve),
            RebalanceDecision::Convert(action) => {
                prop_assert!(reserve < min_reserve);
                prop_assert_eq!(action.value, min_reserve - reserve);
                prop_assert!(action.value <= yield_value);
            }
            RebalanceDecision::InsufficientYield { needed, available } => {
                prop_assert_eq!(needed, min_reserve - reserve);
                prop_assert!(available < needed);
            }
        }
    }

    // The log keeps the newest entries, oldest first
    #[test]
    fn test_log_keeps_most_recent(count in 0..200usize) {
        let mut log = StatusLog::new();
        for i in 0..count {
            log.record(Severity::Info, Some(AgentAction::CheckYield), format!("entry {}", i));
        }

        let entries = log.snapshot();
        prop_assert_eq!(entries.len(), count.min(STATUS_LOG_CAPACITY));

        let first_kept = count.saturating_sub(STATUS_LOG_CAPACITY);
        for (offset, entry) in entries.iter().enumerate() {
            prop_assert_eq!(&entry.message, &format!("entry {}", first_kept + offset));
        }
    }

    // Every entry of a batch lands in exactly one of the two lists
    #[test]
    fn test_batch_is_complete_and_disjoint(
        batch in proptest::collection::vec(
            (
                prop_oneof![
                    Just("alice.eth"),
                    Just("bob.eth"),
                    Just("charlie.eth"),
                    Just("nobody.eth"),
                ],
                -100i64..=300_000_000i64,
            ),
            0..12,
        ),
    ) {
        let config = Config::default_config();
        let gateway = Arc::new(SimulatedGateway::new(&config.simulation, &config.tokens));
        let payday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        let agent = TreasuryAgent::new(
            gateway.clone(),
            Arc::new(config.agent.clone()),
            config.tokens.clone(),
            config.treasury.initial_state(),
        )
        .with_clock(Arc::new(FixedClock(payday)));

        let entries: Vec<PayrollEntry> = batch
            .iter()
            .enumerate()
            .map(|(i, (name, cents))| {
                PayrollEntry::new(i.to_string(), *name, Decimal::new(*cents, 2), payday)
            })
            .collect();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let report = runtime.block_on(agent.execute_payroll(&entries)).unwrap();

        prop_assert_eq!(report.successful.len() + report.failed.len(), entries.len());
        prop_assert_eq!(report.outcomes.len(), entries.len());
        for (outcome, entry) in report.outcomes.iter().zip(&entries) {
            prop_assert_eq!(&outcome.entry_id, &entry.id);
        }
        prop_assert_eq!(gateway.transfers().len(), report.successful.len());

        let paid: Decimal = gateway
            .transfers()
            .iter()
            .map(|t| from_base_units(t.amount, 6).unwrap())
            .sum();
        let state = agent.treasury_state();
        prop_assert_eq!(state.reserve().value, Decimal::from(400_000u32) - paid);
        prop_assert!(state.is_balanced());
    }
}
