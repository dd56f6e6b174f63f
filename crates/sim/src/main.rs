//! Scenario simulator for the defense runtime.
//!
//! Builds an in-memory world, starts the runtime against it and replays a
//! scripted encounter tick by tick, logging every reaction.
//!
//! ```bash
//! cargo run -p defense-sim -- stationary --ticks 20
//! RUST_LOG=defense=debug cargo run -p defense-sim -- souls
//! ```

mod scenario;

use anyhow::Result;
use clap::Parser;

use scenario::Scenario;

/// Replays scripted encounters against the defense runtime
#[derive(Parser)]
#[command(name = "defense-sim")]
#[command(about = "Scripted defense scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Encounter to replay
    #[arg(value_enum)]
    scenario: Scenario,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 20)]
    ticks: u32,

    /// Simulated time between ticks, in milliseconds
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = scenario::run(cli.scenario, cli.ticks, cli.tick_ms).await?;

    println!("{report}");
    Ok(())
}
