//! Gateway implementations
//!
//! The trait itself lives in the SDK so that backends can be built outside
//! the engine. This module holds the implementations the engine ships with.

pub mod simulated;

pub use simulated::{SimulatedGateway, TransferRecord};
