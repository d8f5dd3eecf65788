//! Treasury Gateway Abstraction
//!
//! The agent never talks to a vault, swap venue, resolver or transfer rail
//! directly. It goes through the `TreasuryGateway` trait, which an external
//! collaborator implements for a concrete network. Gateway calls only return
//! values; all ledger mutation happens in the engine after a call resolves.
//!
//! Token amounts cross this boundary as integer base units (`u128`), the way
//! ERC-20 contracts express them. Converting to and from stable units is the
//! engine's job.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::SwapQuote;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur during gateway operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Contract reverted: {0}")]
    Reverted(String),

    #[error("Timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Gateway trait that every treasury backend must implement
#[async_trait]
pub trait TreasuryGateway: Send + Sync {
    /// Returns the name of the gateway (e.g., "simulated", "sepolia")
    fn name(&self) -> &str;

    /// Current annualized yield of the vault, as a percentage (6.5 = 6.5%)
    async fn yield_rate(&self) -> Result<Decimal>;

    /// Quote converting `amount_in` base units of `token_in` into `token_out`
    async fn swap_quote(
        &self,
        amount_in: u128,
        token_in: &str,
        token_out: &str,
    ) -> Result<SwapQuote>;

    /// Execute a previously quoted swap, returning the transaction id
    async fn execute_swap(&self, quote: &SwapQuote) -> Result<String>;

    /// Transfer `amount` base units of the reserve token, returning the transaction id
    async fn transfer(&self, to: &str, amount: u128) -> Result<String>;

    /// Resolve a human-readable name to a payable address
    ///
    /// Returns `Ok(None)` when the name has no address. That is a normal
    /// outcome, not an error.
    async fn resolve_name(&self, name: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        assert_eq!(GatewayError::Timeout.to_string(), "Timeout");
        assert_eq!(
            GatewayError::Reverted("STF".to_string()).to_string(),
            "Contract reverted: STF"
        );
    }
}
