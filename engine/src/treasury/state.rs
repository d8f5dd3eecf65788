//! Treasury ledger
//!
//! The ledger tracks the yield position, the stable reserve and their sum.
//! Fields are private so that every mutation goes through a method that
//! recomputes `total` before returning; a stale total is unrepresentable.

use rust_decimal::{Decimal, RoundingStrategy};
use sdk::errors::TreasuryError;
use serde::Serialize;

/// Precision of stable-unit values (the reserve token's smallest unit)
pub const MONEY_SCALE: u32 = 6;

const DAYS_PER_YEAR: u32 = 365;

/// Funds placed in the yield-bearing asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YieldPosition {
    /// Asset-native units held
    pub amount: Decimal,

    /// Valuation in stable units
    pub value: Decimal,

    /// Annualized yield percentage
    pub rate: Decimal,
}

/// Liquid stable reserve, pegged 1:1 to the stable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservePosition {
    pub amount: Decimal,
    pub value: Decimal,
}

/// Mutable ledger of treasury balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreasuryState {
    yield_asset: YieldPosition,
    reserve: ReservePosition,
    total: Decimal,
}

impl TreasuryState {
    /// Create a ledger from opening balances
    pub fn new(
        yield_amount: Decimal,
        yield_value: Decimal,
        yield_rate: Decimal,
        reserve_amount: Decimal,
    ) -> Self {
        let mut state = Self {
            yield_asset: YieldPosition {
                amount: yield_amount,
                value: yield_value,
                rate: yield_rate,
            },
            reserve: ReservePosition {
                amount: reserve_amount,
                value: reserve_amount,
            },
            total: Decimal::ZERO,
        };
        state.recompute_total();
        state
    }

    pub fn yield_asset(&self) -> &YieldPosition {
        &self.yield_asset
    }

    pub fn reserve(&self) -> &ReservePosition {
        &self.reserve
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Whether `total` equals the sum of both positions
    pub fn is_balanced(&self) -> bool {
        self.total == self.yield_asset.value + self.reserve.value
    }

    /// Record a new rate and accrue one day of yield at it.
    ///
    /// One call is one compounding period regardless of wall-clock time.
    /// Returns the new yield-asset value.
    pub fn accrue_daily_yield(&mut self, rate: Decimal) -> Decimal {
        let daily = rate / Decimal::ONE_HUNDRED / Decimal::from(DAYS_PER_YEAR);
        let grown = (self.yield_asset.value * (Decimal::ONE + daily))
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);

        self.yield_asset.rate = rate;
        self.yield_asset.value = grown;
        self.recompute_total();
        grown
    }

    /// Move value out of the yield asset and into the reserve after a swap.
    ///
    /// `value_out` and `units_out` leave the yield position; `reserve_in`
    /// stable units arrive in the reserve.
    pub fn apply_swap(
        &mut self,
        value_out: Decimal,
        units_out: Decimal,
        reserve_in: Decimal,
    ) -> Result<(), TreasuryError> {
        if value_out > self.yield_asset.value {
            return Err(TreasuryError::InsufficientFunds {
                needed: value_out,
                available: self.yield_asset.value,
            });
        }

        self.yield_asset.value -= value_out;
        self.yield_asset.amount = (self.yield_asset.amount - units_out).max(Decimal::ZERO);
        self.reserve.amount += reserve_in;
        self.reserve.value = self.reserve.amount;
        self.recompute_total();
        Ok(())
    }

    /// Take `amount` out of the reserve after a successful transfer
    pub fn debit_reserve(&mut self, amount: Decimal) -> Result<(), TreasuryError> {
        if amount > self.reserve.value {
            return Err(TreasuryError::InsufficientFunds {
                needed: amount,
                available: self.reserve.value,
            });
        }

        self.reserve.amount -= amount;
        self.reserve.value = self.reserve.amount;
        self.recompute_total();
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total = self.yield_asset.value + self.reserve.value;
    }
}
