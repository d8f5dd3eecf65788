//! Error types and handling
//!
//! This module provides the error types used throughout the AutoCFO engine.
//! All errors implement the `TreasuryErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Classified payroll outcomes (a recipient name that does not resolve, an
//! entry larger than the reserve) are not errors. They are reported as
//! failure reasons inside a payroll report instead.

use crate::gateway::GatewayError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Trait for treasury error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait TreasuryErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// addresses, amounts or raw gateway messages.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried on the next cycle. Non-recoverable
    /// errors typically require an operator to fix configuration.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Gateway**: Yield source, swap venue, transfer rail or resolver failures
/// - **Policy**: Slippage and funds checks
/// - **Scheduling**: Reentrancy
///
/// # Examples
///
/// ```
/// use sdk::errors::{TreasuryError, TreasuryErrorExt};
/// use sdk::gateway::GatewayError;
///
/// let error = TreasuryError::YieldSource(GatewayError::Timeout);
/// assert!(error.is_recoverable());
///
/// let fatal_error = TreasuryError::Config("payment_day must be 1-31".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TreasuryError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Gateway errors
    #[error("Yield source error: {0}")]
    YieldSource(#[source] GatewayError),

    #[error("Swap failed: {0}")]
    Swap(#[source] GatewayError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // Policy errors
    #[error("Slippage {quoted}% exceeds limit of {limit}%")]
    SlippageExceeded { quoted: Decimal, limit: Decimal },

    #[error("Amount conversion failed: {0}")]
    Amount(String),

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    // Scheduling errors
    #[error("Another treasury operation is already running")]
    ReentrancyRejected,

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreasuryErrorExt for TreasuryError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::YieldSource(_) => "Yield source unavailable. The next cycle will retry",
            Self::Swap(_) => "Swap venue rejected the conversion. Reserve left unchanged",
            Self::Gateway(_) => "External service call failed. Check your network",

            Self::SlippageExceeded { .. } => "Quoted slippage too high. Try again later",
            Self::Amount(_) => "Amount is out of range for the token",
            Self::InsufficientFunds { .. } => "Not enough funds. Wait for yield or top up",

            Self::ReentrancyRejected => "Wait for the running cycle to finish",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::Amount(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gateway_error_converts() {
        let err: TreasuryError = GatewayError::Network("connection reset".to_string()).into();
        assert!(matches!(err, TreasuryError::Gateway(_)));
        assert_eq!(err.to_string(), "Gateway error: Network error: connection reset");
    }

    #[test]
    fn test_slippage_message() {
        let err = TreasuryError::SlippageExceeded {
            quoted: dec!(2.5),
            limit: dec!(1),
        };
        assert_eq!(err.to_string(), "Slippage 2.5% exceeds limit of 1%");
        assert!(err.is_recoverable());
    }
}
