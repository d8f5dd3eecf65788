//! Rebalance policy
//!
//! Pure decision logic: given the ledger and the agent configuration, decide
//! whether value should move from the yield asset into the reserve.
//!
//! The absolute reserve floor is always checked first. A shortfall is covered
//! exactly, never partially and never with a surplus. The proportional
//! threshold (a fraction of total value) is reported alongside each decision
//! but never triggers a conversion on its own.
//!
//! The yield token trades 1:1 against the stable unit, so a conversion sells
//! exactly as many yield-token units as the stable value it must raise.

use rust_decimal::Decimal;

use crate::config::AgentConfig;
use crate::treasury::TreasuryState;

/// A conversion the agent should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceAction {
    /// Stable units the reserve is short by, and the value to sell
    pub value: Decimal,

    /// Yield-token units to sell
    pub units: Decimal,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebalanceDecision {
    /// Reserve is below the floor and the yield asset can cover it
    Convert(RebalanceAction),

    /// Reserve is at or above the floor
    Sufficient,

    /// Reserve is below the floor but the yield asset cannot cover the gap yet
    InsufficientYield { needed: Decimal, available: Decimal },
}

/// Rebalance decision logic
#[derive(Debug, Clone, Copy, Default)]
pub struct RebalancePolicy;

impl RebalancePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide what to do with the current ledger
    pub fn decide(&self, state: &TreasuryState, config: &AgentConfig) -> RebalanceDecision {
        let reserve = state.reserve().value;

        if reserve >= config.min_reserve {
            return RebalanceDecision::Sufficient;
        }

        let needed = config.min_reserve - reserve;
        let available = state.yield_asset().value;

        if available >= needed {
            RebalanceDecision::Convert(RebalanceAction {
                value: needed,
                units: needed,
            })
        } else {
            RebalanceDecision::InsufficientYield { needed, available }
        }
    }

    /// Reserve level implied by the proportional threshold
    pub fn threshold_value(&self, state: &TreasuryState, config: &AgentConfig) -> Decimal {
        state.total() * config.rebalance_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(min_reserve: Decimal) -> AgentConfig {
        AgentConfig {
            min_reserve,
            ..AgentConfig::default()
        }
    }

    fn state(yield_value: Decimal, reserve: Decimal) -> TreasuryState {
        TreasuryState::new(yield_value, yield_value, dec!(6.5), reserve)
    }

    #[test]
    fn test_sufficient_reserve() {
        let decision =
            RebalancePolicy::new().decide(&state(dec!(100), dec!(10000)), &config(dec!(10000)));
        assert_eq!(decision, RebalanceDecision::Sufficient);
    }

    #[test]
    fn test_exact_shortfall_is_converted() {
        let decision =
            RebalancePolicy::new().decide(&state(dec!(100000), dec!(5000)), &config(dec!(10000)));
        assert_eq!(
            decision,
            RebalanceDecision::Convert(RebalanceAction {
                value: dec!(5000),
                units: dec!(5000),
            })
        );
    }

    #[test]
    fn test_yield_exactly_covers_shortfall() {
        let decision =
            RebalancePolicy::new().decide(&state(dec!(5000), dec!(5000)), &config(dec!(10000)));
        assert!(matches!(decision, RebalanceDecision::Convert(ref a) if a.value == dec!(5000)));
    }

    #[test]
    fn test_insufficient_yield_never_partially_converts() {
        let decision =
            RebalancePolicy::new().decide(&state(dec!(4999), dec!(5000)), &config(dec!(10000)));
        assert_eq!(
            decision,
            RebalanceDecision::InsufficientYield {
                needed: dec!(5000),
                available: dec!(4999),
            }
        );
    }

    #[test]
    fn test_floor_dominates_proportional_threshold() {
        // Reserve is far below 10% of total but above the absolute floor
        let st = state(dec!(990000), dec!(10000));
        let cfg = config(dec!(10000));
        let policy = RebalancePolicy::new();

        assert!(policy.threshold_value(&st, &cfg) > st.reserve().value);
        assert_eq!(policy.decide(&st, &cfg), RebalanceDecision::Sufficient);
    }

    #[test]
    fn test_units_sold_one_to_one_after_accrual() {
        // Accrued value no longer matches the unit count
        let st = TreasuryState::new(dec!(100000), dec!(100017.808219), dec!(6.5), dec!(5000));
        let decision = RebalancePolicy::new().decide(&st, &config(dec!(10000)));
        assert_eq!(
            decision,
            RebalanceDecision::Convert(RebalanceAction {
                value: dec!(5000),
                units: dec!(5000),
            })
        );
    }
}
