//! CLI interface for AutoCFO
//!
//! This module provides the command-line interface using clap's derive API.
//! Each command maps to one agent operation.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AutoCFO treasury agent
///
/// Keeps a stable reserve topped up from a yield-bearing position and pays
/// payroll on the configured day of the month.
#[derive(Parser, Debug)]
#[command(name = "autocfo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one full agent cycle
    Cycle {
        /// Payroll roster file (TOML)
        #[arg(long, value_name = "PATH")]
        payroll: Option<PathBuf>,
    },

    /// Run agent cycles on an interval until Ctrl-C
    Run {
        /// Seconds between cycles
        #[arg(long, default_value = "86400")]
        interval_secs: u64,

        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<usize>,

        /// Payroll roster file (TOML)
        #[arg(long, value_name = "PATH")]
        payroll: Option<PathBuf>,
    },

    /// Refresh the vault yield and accrue one day of growth
    CheckYield,

    /// Top the reserve up to the configured floor
    Rebalance,

    /// Pay the roster now (only on the payment day)
    Payroll {
        /// Payroll roster file (TOML)
        #[arg(long, value_name = "PATH")]
        payroll: Option<PathBuf>,
    },

    /// Show treasury balances and configuration
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["autocfo", "status"]);
        assert!(matches!(cli.command, Command::Status));
        assert!(!cli.json);
        assert!(cli.date.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "autocfo",
            "check-yield",
            "--json",
            "--log",
            "debug",
            "--date",
            "2026-10-25",
        ]);
        assert!(matches!(cli.command, Command::CheckYield));
        assert!(cli.json);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2026, 10, 25));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["autocfo", "run"]);
        if let Command::Run {
            interval_secs,
            cycles,
            payroll,
        } = cli.command
        {
            assert_eq!(interval_secs, 86400);
            assert_eq!(cycles, None);
            assert_eq!(payroll, None);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_payroll_roster_path() {
        let cli = Cli::parse_from(["autocfo", "payroll", "--payroll", "roster.toml"]);
        if let Command::Payroll { payroll } = cli.command {
            assert_eq!(payroll, Some(PathBuf::from("roster.toml")));
        } else {
            panic!("Expected Payroll command");
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["autocfo", "status", "--date", "25/10/2026"]).is_err());
    }
}
