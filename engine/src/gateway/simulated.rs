//! Simulated gateway
//!
//! An in-process stand-in for the vault, swap venue, name resolver and
//! transfer rail. Rates and prices are fixed by configuration, transaction ids
//! are random hashes, and individual operations can be made to fail so the
//! agent's error paths can be exercised without a network.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sdk::gateway::{GatewayError, Result, TreasuryGateway};
use sdk::types::SwapQuote;
use sdk::units::{from_base_units, to_base_units};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;
use uuid::Uuid;

use crate::config::{SimulationConfig, TokenConfig};

/// A transfer the simulated rail accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub to: String,
    pub amount: u128,
    pub tx_id: String,
}

/// Failures injected per operation
#[derive(Debug, Default)]
struct Faults {
    yield_rate: Option<GatewayError>,
    swap_quote: Option<GatewayError>,
    execute_swap: Option<GatewayError>,
    transfer: HashMap<String, GatewayError>,
    resolve: HashMap<String, GatewayError>,
}

/// Calls the simulated services have accepted
#[derive(Debug, Default)]
struct Journal {
    swaps: Vec<SwapQuote>,
    transfers: Vec<TransferRecord>,
    yield_lookups: usize,
}

/// In-process gateway with configurable behaviour
pub struct SimulatedGateway {
    yield_rate: Decimal,
    swap_price: Decimal,
    slippage_pct: Decimal,
    yield_decimals: u32,
    reserve_decimals: u32,
    names: BTreeMap<String, String>,
    latency: Option<Duration>,
    yield_hold: Option<Arc<Notify>>,
    faults: Mutex<Faults>,
    journal: Mutex<Journal>,
}

impl SimulatedGateway {
    /// Create a gateway from the `[simulation]` and `[tokens]` config sections
    pub fn new(simulation: &SimulationConfig, tokens: &TokenConfig) -> Self {
        Self {
            yield_rate: simulation.yield_rate,
            swap_price: simulation.swap_price,
            slippage_pct: simulation.slippage_pct,
            yield_decimals: tokens.yield_decimals,
            reserve_decimals: tokens.reserve_decimals,
            names: simulation.names.clone(),
            latency: None,
            yield_hold: None,
            faults: Mutex::new(Faults::default()),
            journal: Mutex::new(Journal::default()),
        }
    }

    pub fn with_yield_rate(mut self, rate: Decimal) -> Self {
        self.yield_rate = rate;
        self
    }

    pub fn with_swap_price(mut self, price: Decimal) -> Self {
        self.swap_price = price;
        self
    }

    pub fn with_slippage(mut self, slippage_pct: Decimal) -> Self {
        self.slippage_pct = slippage_pct;
        self
    }

    /// Register a name in the resolver
    pub fn with_name(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.names.insert(name.into(), address.into());
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every yield lookup wait for a notification before answering
    pub fn hold_yield_until(mut self, release: Arc<Notify>) -> Self {
        self.yield_hold = Some(release);
        self
    }

    pub fn fail_yield_rate(&self, error: Option<GatewayError>) {
        self.faults().yield_rate = error;
    }

    pub fn fail_swap_quote(&self, error: Option<GatewayError>) {
        self.faults().swap_quote = error;
    }

    pub fn fail_execute_swap(&self, error: Option<GatewayError>) {
        self.faults().execute_swap = error;
    }

    /// Make transfers to `address` fail with `error`
    pub fn fail_transfer_to(&self, address: impl Into<String>, error: GatewayError) {
        self.faults().transfer.insert(address.into(), error);
    }

    /// Make resolving `name` fail with `error` (rather than returning no address)
    pub fn fail_resolution_of(&self, name: impl Into<String>, error: GatewayError) {
        self.faults().resolve.insert(name.into(), error);
    }

    /// Swaps executed so far
    pub fn executed_swaps(&self) -> Vec<SwapQuote> {
        self.journal().swaps.clone()
    }

    /// Transfers executed so far
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.journal().transfers.clone()
    }

    pub fn yield_lookups(&self) -> usize {
        self.journal().yield_lookups
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Random 32-byte transaction hash
fn random_tx_id() -> String {
    format!("0x{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Whether `value` is already a 20-byte hex address
fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[async_trait]
impl TreasuryGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn yield_rate(&self) -> Result<Decimal> {
        if let Some(release) = &self.yield_hold {
            release.notified().await;
        }
        self.simulate_latency().await;

        if let Some(error) = self.faults().yield_rate.clone() {
            return Err(error);
        }
        self.journal().yield_lookups += 1;
        Ok(self.yield_rate)
    }

    async fn swap_quote(
        &self,
        amount_in: u128,
        token_in: &str,
        token_out: &str,
    ) -> Result<SwapQuote> {
        self.simulate_latency().await;

        if let Some(error) = self.faults().swap_quote.clone() {
            return Err(error);
        }

        let units = from_base_units(amount_in, self.yield_decimals).ok_or_else(|| {
            GatewayError::InvalidResponse(format!("input amount {} out of range", amount_in))
        })?;
        let output = units
            .checked_mul(self.swap_price)
            .and_then(|out| to_base_units(out, self.reserve_decimals))
            .ok_or_else(|| GatewayError::InvalidResponse("output amount overflow".to_string()))?;

        debug!("Quoted {} {} -> {} {}", amount_in, token_in, output, token_out);

        Ok(SwapQuote {
            input_amount: amount_in,
            output_amount: output,
            input_token: token_in.to_string(),
            output_token: token_out.to_string(),
            slippage_pct: self.slippage_pct,
        })
    }

    async fn execute_swap(&self, quote: &SwapQuote) -> Result<String> {
        self.simulate_latency().await;

        if let Some(error) = self.faults().execute_swap.clone() {
            return Err(error);
        }
        self.journal().swaps.push(quote.clone());
        Ok(random_tx_id())
    }

    async fn transfer(&self, to: &str, amount: u128) -> Result<String> {
        self.simulate_latency().await;

        if let Some(error) = self.faults().transfer.get(to).cloned() {
            return Err(error);
        }
        if amount == 0 {
            return Err(GatewayError::Reverted("zero-amount transfer".to_string()));
        }

        let tx_id = random_tx_id();
        self.journal().transfers.push(TransferRecord {
            to: to.to_string(),
            amount,
            tx_id: tx_id.clone(),
        });
        Ok(tx_id)
    }

    async fn resolve_name(&self, name: &str) -> Result<Option<String>> {
        self.simulate_latency().await;

        if let Some(error) = self.faults().resolve.get(name).cloned() {
            return Err(error);
        }
        if is_hex_address(name) {
            return Ok(Some(name.to_string()));
        }
        Ok(self.names.get(name).cloned())
    }
}
