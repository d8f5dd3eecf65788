//! AutoCFO SDK
//!
//! Shared library providing traits and types for AutoCFO components.
//! This crate is used by the engine, by gateway implementations and by
//! presentation layers that display payroll and treasury data.

/// Error types and handling
pub mod errors;

/// Gateway trait for external treasury services
pub mod gateway;

/// Payroll, quote and yield types
pub mod types;

/// Token base-unit conversion
pub mod units;

// Re-export commonly used types
pub use errors::{TreasuryError, TreasuryErrorExt};
pub use gateway::{GatewayError, TreasuryGateway};
pub use types::{PaymentStatus, PayrollEntry, SwapQuote, YieldInfo};
