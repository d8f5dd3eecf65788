//! Configuration management
//!
//! This module handles loading, validation, and management of the AutoCFO configuration.
//! Configuration is stored in TOML format at ~/.autocfo/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **agent**: Payment day, reserve floor, rebalance threshold, slippage and timeout limits
//! - **treasury**: Opening balances of the yield position and the reserve
//! - **tokens**: Token addresses and decimals used for swaps and transfers
//! - **simulation**: Behaviour of the built-in simulated gateway (optional)
//!
//! Monetary values are written as quoted decimal strings so they never pass
//! through a binary float.
//!
//! # Examples
//!
//! ```no_run
//! use autocfo_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Payment day: {}", config.agent.payment_day);
//! println!("Reserve floor: {}", config.agent.min_reserve);
//! # Ok(())
//! # }
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sdk::errors::TreasuryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::treasury::TreasuryState;

/// Largest token precision the base-unit conversion supports
const MAX_TOKEN_DECIMALS: u32 = 28;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Agent decision parameters
    #[serde(default)]
    pub agent: AgentConfig,

    /// Opening treasury balances
    #[serde(default)]
    pub treasury: TreasuryConfig,

    /// Token addresses and precision
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Simulated gateway behaviour
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Agent decision parameters
///
/// Read-only after startup. The agent holds it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Day of month on which pending payroll entries are paid (1-31)
    #[serde(default = "default_payment_day")]
    pub payment_day: u32,

    /// Reserve floor in stable units
    #[serde(default = "default_min_reserve")]
    pub min_reserve: Decimal,

    /// Fraction of total value reported as the proportional rebalance trigger (0-1)
    #[serde(default = "default_rebalance_threshold")]
    pub rebalance_threshold: Decimal,

    /// Largest quoted slippage, in percent, a rebalance swap will accept
    #[serde(default = "default_max_slippage_pct")]
    pub max_slippage_pct: Decimal,

    /// Optional upper bound on any single gateway call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            payment_day: default_payment_day(),
            min_reserve: default_min_reserve(),
            rebalance_threshold: default_rebalance_threshold(),
            max_slippage_pct: default_max_slippage_pct(),
            gateway_timeout_secs: None,
        }
    }
}

/// Opening treasury balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryConfig {
    /// Yield asset held, in asset-native units
    #[serde(default = "default_yield_amount")]
    pub yield_amount: Decimal,

    /// Stable-unit valuation of the yield asset
    #[serde(default = "default_yield_amount")]
    pub yield_value: Decimal,

    /// Last known annualized yield percentage
    #[serde(default = "default_yield_rate")]
    pub yield_rate: Decimal,

    /// Reserve held, in stable units
    #[serde(default = "default_reserve_amount")]
    pub reserve_amount: Decimal,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            yield_amount: default_yield_amount(),
            yield_value: default_yield_amount(),
            yield_rate: default_yield_rate(),
            reserve_amount: default_reserve_amount(),
        }
    }
}

impl TreasuryConfig {
    /// Build the opening ledger
    pub fn initial_state(&self) -> TreasuryState {
        TreasuryState::new(
            self.yield_amount,
            self.yield_value,
            self.yield_rate,
            self.reserve_amount,
        )
    }
}

/// Token addresses and precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Address of the yield-bearing token
    #[serde(default = "default_yield_token")]
    pub yield_token: String,

    #[serde(default = "default_yield_decimals")]
    pub yield_decimals: u32,

    /// Address of the stable reserve token
    #[serde(default = "default_reserve_token")]
    pub reserve_token: String,

    #[serde(default = "default_reserve_decimals")]
    pub reserve_decimals: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            yield_token: default_yield_token(),
            yield_decimals: default_yield_decimals(),
            reserve_token: default_reserve_token(),
            reserve_decimals: default_reserve_decimals(),
        }
    }
}

/// Simulated gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Yield rate the simulated vault reports
    #[serde(default = "default_yield_rate")]
    pub yield_rate: Decimal,

    /// Stable units received per unit of yield asset
    #[serde(default = "default_swap_price")]
    pub swap_price: Decimal,

    /// Slippage the simulated venue quotes, in percent
    #[serde(default = "default_simulated_slippage")]
    pub slippage_pct: Decimal,

    /// Name directory (e.g. "alice.eth" = "0x...")
    #[serde(default = "default_name_directory")]
    pub names: BTreeMap<String, String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            yield_rate: default_yield_rate(),
            swap_price: default_swap_price(),
            slippage_pct: default_simulated_slippage(),
            names: default_name_directory(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_payment_day() -> u32 {
    25
}

fn default_min_reserve() -> Decimal {
    dec!(10000)
}

fn default_rebalance_threshold() -> Decimal {
    dec!(0.1)
}

fn default_max_slippage_pct() -> Decimal {
    dec!(1.0)
}

fn default_yield_amount() -> Decimal {
    dec!(600000)
}

fn default_yield_rate() -> Decimal {
    dec!(6.5)
}

fn default_reserve_amount() -> Decimal {
    dec!(400000)
}

fn default_yield_token() -> String {
    "0x0000000000000000000000000000000000000003".to_string()
}

fn default_yield_decimals() -> u32 {
    18
}

fn default_reserve_token() -> String {
    "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".to_string()
}

fn default_reserve_decimals() -> u32 {
    6
}

fn default_swap_price() -> Decimal {
    Decimal::ONE
}

fn default_simulated_slippage() -> Decimal {
    dec!(0.5)
}

fn default_name_directory() -> BTreeMap<String, String> {
    [
        ("alice.eth", "0x00000000000000000000000000000000000a11ce"),
        ("bob.eth", "0x0000000000000000000000000000000000000b0b"),
        ("charlie.eth", "0x00000000000000000000000000000000c4a21e00"),
    ]
    .into_iter()
    .map(|(name, address)| (name.to_string(), address.to_string()))
    .collect()
}

impl Config {
    /// Load configuration from the default location (~/.autocfo/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, TreasuryError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, TreasuryError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| TreasuryError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, TreasuryError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| TreasuryError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, TreasuryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TreasuryError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default_config();
        config.validate()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| TreasuryError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| TreasuryError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.autocfo/config.toml)
    fn default_config_path() -> Result<PathBuf, TreasuryError> {
        let home = dirs::home_dir().ok_or_else(|| {
            TreasuryError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".autocfo").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig::default(),
            agent: AgentConfig::default(),
            treasury: TreasuryConfig::default(),
            tokens: TokenConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `TreasuryError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<(), TreasuryError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(TreasuryError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if !(1..=31).contains(&self.agent.payment_day) {
            return Err(TreasuryError::Config(
                "payment_day must be between 1 and 31".to_string(),
            ));
        }
        if self.agent.min_reserve.is_sign_negative() {
            return Err(TreasuryError::Config(
                "min_reserve must not be negative".to_string(),
            ));
        }
        if self.agent.rebalance_threshold < Decimal::ZERO
            || self.agent.rebalance_threshold > Decimal::ONE
        {
            return Err(TreasuryError::Config(
                "rebalance_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.agent.max_slippage_pct.is_sign_negative() {
            return Err(TreasuryError::Config(
                "max_slippage_pct must not be negative".to_string(),
            ));
        }
        if self.agent.gateway_timeout_secs == Some(0) {
            return Err(TreasuryError::Config(
                "gateway_timeout_secs must be at least 1 when set".to_string(),
            ));
        }

        let balances = [
            ("yield_amount", self.treasury.yield_amount),
            ("yield_value", self.treasury.yield_value),
            ("reserve_amount", self.treasury.reserve_amount),
        ];
        for (field, value) in balances {
            if value.is_sign_negative() {
                return Err(TreasuryError::Config(format!(
                    "treasury.{} must not be negative",
                    field
                )));
            }
        }

        if self.tokens.yield_token.trim().is_empty() || self.tokens.reserve_token.trim().is_empty()
        {
            return Err(TreasuryError::Config(
                "token addresses must not be empty".to_string(),
            ));
        }
        if self.tokens.yield_decimals > MAX_TOKEN_DECIMALS
            || self.tokens.reserve_decimals > MAX_TOKEN_DECIMALS
        {
            return Err(TreasuryError::Config(format!(
                "token decimals must be at most {}",
                MAX_TOKEN_DECIMALS
            )));
        }

        if self.simulation.swap_price <= Decimal::ZERO {
            return Err(TreasuryError::Config(
                "simulation.swap_price must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
