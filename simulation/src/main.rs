use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use managed_pool_simulation::{ScenarioConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "controller-sim")]
#[command(about = "Replay managed pool controller scenarios against a simulated ledger")]
struct Args {
    /// Scenario files (TOML)
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after the first scenario that does not pass
    #[arg(long)]
    fail_fast: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Loaded {} scenario file(s)", args.scenarios.len());

    let mut reports = Vec::with_capacity(args.scenarios.len());
    for path in &args.scenarios {
        let config = ScenarioConfig::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?;
        let report = ScenarioRunner::new(config)
            .run()
            .with_context(|| format!("Failed to run scenario {}", path.display()))?;

        if report.passed {
            info!("Scenario {} passed", report.name);
        } else {
            for step in report.failed_steps() {
                warn!(
                    "Scenario {} step {} ({}) failed: {:?}",
                    report.name, step.index, step.action, step.outcome
                );
            }
        }

        let stop = args.fail_fast && !report.passed;
        reports.push(report);
        if stop {
            warn!("Stopping early (--fail-fast)");
            break;
        }
    }

    let json = serde_json::to_string_pretty(&reports).context("Failed to serialize report")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    let failed = reports.iter().filter(|report| !report.passed).count();
    if failed > 0 {
        bail!("{} of {} scenario(s) failed", failed, reports.len());
    }
    Ok(())
}
