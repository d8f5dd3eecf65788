//! AutoCFO Engine Library
//!
//! This library provides the treasury agent, its ledger and policy, and the
//! simulated gateway. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Treasury ledger and status log
pub mod treasury;

/// Rebalance decision logic
pub mod policy;

/// Gateway implementations
pub mod gateway;

/// Treasury agent module
pub mod agent;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
