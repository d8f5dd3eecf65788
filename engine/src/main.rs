// AutoCFO treasury agent
// Main entry point for the autocfo binary

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use autocfo_engine::cli::{Cli, Command};
use autocfo_engine::config::Config;
use autocfo_engine::handlers::{
    build_agent, handle_check_yield, handle_cycle, handle_payroll, handle_rebalance, handle_run,
    handle_status, load_roster, OutputFormat,
};
use autocfo_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_create().context("Failed to load config")?,
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    tracing::info!(
        "AutoCFO v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let agent = build_agent(&config, cli.date);
    let today = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Command::Cycle { payroll } => {
            let roster = load_roster(payroll.as_deref(), today)?;
            handle_cycle(&agent, &roster, format).await
        }

        Command::Run {
            interval_secs,
            cycles,
            payroll,
        } => {
            let roster = load_roster(payroll.as_deref(), today)?;
            tracing::info!(
                "Running agent every {}s for {} recipients",
                interval_secs,
                roster.len()
            );
            handle_run(Arc::new(agent), roster, interval_secs, cycles, format).await
        }

        Command::CheckYield => handle_check_yield(&agent, format).await,

        Command::Rebalance => handle_rebalance(&agent, format).await,

        Command::Payroll { payroll } => {
            let roster = load_roster(payroll.as_deref(), today)?;
            handle_payroll(&agent, &roster, format).await
        }

        Command::Status => handle_status(&agent, &config, format),
    }
}
