//! Command handlers for CLI operations
//!
//! Each handler builds an agent over the simulated gateway, runs one
//! operation, and prints the result followed by the status log.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rust_decimal_macros::dec;
use sdk::errors::TreasuryErrorExt;
use sdk::types::PayrollEntry;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::agent::{Clock, CycleOutcome, FixedClock, PayrollReport, SystemClock, TreasuryAgent};
use crate::config::Config;
use crate::gateway::SimulatedGateway;
use crate::treasury::{StatusEntry, TreasuryState};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// On-disk payroll roster
#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    entries: Vec<PayrollEntry>,
}

/// Build an agent over the simulated gateway
///
/// `date` pins the agent's notion of today.
pub fn build_agent(config: &Config, date: Option<NaiveDate>) -> TreasuryAgent {
    let gateway = Arc::new(SimulatedGateway::new(&config.simulation, &config.tokens));
    let clock: Arc<dyn Clock> = match date {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };
    TreasuryAgent::from_config(config, gateway).with_clock(clock)
}

/// Parse a payroll roster from TOML
///
/// ```toml
/// [[entries]]
/// id = "1"
/// recipient = "alice.eth"
/// amount = "5000"
/// due_date = "2026-10-25"
/// ```
pub fn parse_roster(contents: &str) -> Result<Vec<PayrollEntry>> {
    let roster: RosterFile = toml::from_str(contents).context("Failed to parse payroll roster")?;
    Ok(roster.entries)
}

/// Load a roster file, or fall back to the demo roster
pub fn load_roster(path: Option<&Path>, today: NaiveDate) -> Result<Vec<PayrollEntry>> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read payroll roster {}", path.display()))?;
            parse_roster(&contents)
        }
        None => Ok(demo_roster(today)),
    }
}

/// Three pending demo payments due over the next ten days
pub fn demo_roster(today: NaiveDate) -> Vec<PayrollEntry> {
    let due = |days: u64| today.checked_add_days(Days::new(days)).unwrap_or(today);
    vec![
        PayrollEntry::new("1", "alice.eth", dec!(5000), due(5)),
        PayrollEntry::new("2", "bob.eth", dec!(3000), due(7)),
        PayrollEntry::new("3", "charlie.eth", dec!(2000), due(10)),
    ]
}

/// Run one agent cycle
pub async fn handle_cycle(
    agent: &TreasuryAgent,
    roster: &[PayrollEntry],
    format: OutputFormat,
) -> Result<()> {
    let outcome = agent.run_cycle(roster).await;

    match format {
        OutputFormat::Text => {
            match &outcome {
                CycleOutcome::Completed { payroll } => {
                    println!("✓ Cycle completed");
                    if let Some(report) = payroll {
                        print_report(report);
                    }
                }
                CycleOutcome::Failed { reason } => println!("✗ Cycle failed: {}", reason),
                CycleOutcome::Rejected => println!("✗ Cycle rejected: agent busy"),
            }
            print_state(&agent.treasury_state());
            print_log(&agent.status_log());
        }
        OutputFormat::Json => {
            let output = json!({
                "outcome": outcome,
                "treasury": agent.treasury_state(),
                "log": agent.status_log(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Run cycles on an interval until Ctrl-C or `cycles` have run
pub async fn handle_run(
    agent: Arc<TreasuryAgent>,
    roster: Vec<PayrollEntry>,
    interval_secs: u64,
    cycles: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping after the current cycle");
            shutdown_tx.send(true).ok();
        }
    });

    let summary = agent
        .run_scheduled(
            roster,
            Duration::from_secs(interval_secs),
            cycles,
            shutdown_rx,
        )
        .await;

    match format {
        OutputFormat::Text => {
            println!(
                "Ran {} cycles: {} completed, {} failed, {} rejected",
                summary.cycles_run, summary.completed, summary.failed, summary.rejected
            );
            for entry in &summary.roster {
                println!("  {:<14} {:>12}  {}", entry.recipient, entry.amount, entry.status);
            }
            print_state(&agent.treasury_state());
        }
        OutputFormat::Json => {
            let output = json!({
                "cycles_run": summary.cycles_run,
                "completed": summary.completed,
                "failed": summary.failed,
                "rejected": summary.rejected,
                "roster": summary.roster,
                "treasury": agent.treasury_state(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub async fn handle_check_yield(agent: &TreasuryAgent, format: OutputFormat) -> Result<()> {
    let result = agent.check_yield().await;

    match format {
        OutputFormat::Text => {
            match &result {
                Ok(info) => println!("✓ {} vault APY: {}%", info.source, info.rate),
                Err(e) => print_error("Yield check failed", e),
            }
            print_state(&agent.treasury_state());
        }
        OutputFormat::Json => {
            let output = match &result {
                Ok(info) => json!({ "status": "ok", "yield": info, "treasury": agent.treasury_state() }),
                Err(e) => json!({ "status": "error", "error": e.to_string(), "hint": e.user_hint() }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub async fn handle_rebalance(agent: &TreasuryAgent, format: OutputFormat) -> Result<()> {
    let result = agent.rebalance().await;

    match format {
        OutputFormat::Text => {
            match &result {
                Ok(Some(tx_id)) => println!("✓ Rebalanced. TX: {}", tx_id),
                Ok(None) => println!("No swap performed"),
                Err(e) => print_error("Rebalance failed", e),
            }
            print_state(&agent.treasury_state());
            print_log(&agent.status_log());
        }
        OutputFormat::Json => {
            let output = match &result {
                Ok(tx_id) => json!({ "status": "ok", "tx_id": tx_id, "treasury": agent.treasury_state() }),
                Err(e) => json!({ "status": "error", "error": e.to_string(), "hint": e.user_hint() }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub async fn handle_payroll(
    agent: &TreasuryAgent,
    roster: &[PayrollEntry],
    format: OutputFormat,
) -> Result<()> {
    let pending: Vec<PayrollEntry> = roster.iter().filter(|e| e.is_pending()).cloned().collect();
    let result = agent.execute_payroll(&pending).await;

    match format {
        OutputFormat::Text => {
            match &result {
                Ok(report) => print_report(report),
                Err(e) => print_error("Payroll not executed", e),
            }
            print_log(&agent.status_log());
        }
        OutputFormat::Json => {
            let output = match &result {
                Ok(report) => json!({ "status": "ok", "report": report, "treasury": agent.treasury_state() }),
                Err(e) => json!({ "status": "error", "error": e.to_string(), "hint": e.user_hint() }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn handle_status(agent: &TreasuryAgent, config: &Config, format: OutputFormat) -> Result<()> {
    let state = agent.treasury_state();

    match format {
        OutputFormat::Text => {
            print_state(&state);
            println!("Agent:");
            println!("  Payment day:         {}", config.agent.payment_day);
            println!("  Payment day today:   {}", agent.is_payment_day());
            println!("  Minimum reserve:     {}", config.agent.min_reserve);
            println!("  Rebalance threshold: {}", config.agent.rebalance_threshold);
            println!("  Max slippage:        {}%", config.agent.max_slippage_pct);
        }
        OutputFormat::Json => {
            let output = json!({
                "treasury": state,
                "phase": agent.phase(),
                "payment_day": config.agent.payment_day,
                "is_payment_day": agent.is_payment_day(),
                "min_reserve": config.agent.min_reserve,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_error(context: &str, error: &sdk::errors::TreasuryError) {
    println!("✗ {}: {}", context, error);
    println!("  {}", error.user_hint());
}

fn print_state(state: &TreasuryState) {
    println!("Treasury:");
    println!(
        "  Yield asset: {} ({} units @ {}% APY)",
        state.yield_asset().value,
        state.yield_asset().amount,
        state.yield_asset().rate
    );
    println!("  Reserve:     {}", state.reserve().value);
    println!("  Total:       {}", state.total());
}

fn print_report(report: &PayrollReport) {
    if report.is_empty() {
        println!("Payroll: no payments executed");
        return;
    }
    println!(
        "Payroll: {} paid, {} failed",
        report.successful.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  ✗ {}: {}", failure.recipient, failure.reason);
    }
}

fn print_log(entries: &[StatusEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("Status log:");
    for entry in entries {
        println!(
            "  [{}] {:<7} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.severity,
            entry.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::PaymentStatus;

    #[test]
    fn test_parse_roster() {
        let roster = parse_roster(
            r#"
[[entries]]
id = "1"
recipient = "alice.eth"
amount = "5000"
due_date = "2026-10-25"

[[entries]]
id = "2"
recipient = "0x00000000000000000000000000000000000000b0"
amount = 1250.5
due_date = "2026-10-25"
status = "completed"
"#,
        )
        .unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].amount, dec!(5000));
        assert_eq!(roster[0].status, PaymentStatus::Pending);
        assert_eq!(roster[1].amount, dec!(1250.5));
        assert_eq!(roster[1].status, PaymentStatus::Completed);
    }

    #[test]
    fn test_empty_roster() {
        assert!(parse_roster("").unwrap().is_empty());
    }

    #[test]
    fn test_demo_roster() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let roster = demo_roster(today);

        assert_eq!(roster.len(), 3);
        assert!(roster.iter().all(PayrollEntry::is_pending));
        assert_eq!(roster[0].due_date, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
        assert_eq!(
            roster.iter().map(|e| e.amount).sum::<rust_decimal::Decimal>(),
            dec!(10000)
        );
    }

    #[test]
    fn test_load_roster_missing_file() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let err = load_roster(Some(Path::new("/nonexistent/roster.toml")), today).unwrap_err();
        assert!(err.to_string().contains("Failed to read payroll roster"));
    }
}
