mod config;
mod error;
mod executor;
mod market_data;
mod monitoring;
mod pipeline;
mod queue;
mod scorers;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use executor::{ExecutionEngine, SimulatedTransfer};
use market_data::SimulatedMarket;
use monitoring::Ledger;
use pipeline::Pipeline;
use queue::OpportunityQueue;
use scorers::{
    ArbitrageMatrixScorer, BundleTimingScorer, FlashloanRouteScorer, LiquidationPredictor,
    SandwichAmountScorer, Scorer,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the opportunity pipeline
    Start {
        /// Run in simulation mode (no real transfers)
        #[arg(long)]
        sim: bool,
    },
    /// Print execution totals from the ledger
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Start { sim }) => {
            info!("Starting MevFlow opportunity pipeline...");
            run_pipeline(*sim).await?;
        }
        Some(Commands::Status) => {
            print_status().await?;
        }
        None => {
            info!("No command specified. Use --help for available commands.");
        }
    }

    Ok(())
}

async fn run_pipeline(simulation_mode: bool) -> Result<()> {
    let config = Config::load();

    if simulation_mode {
        info!("Running in SIMULATION mode - no real transfers will be executed");
    } else {
        // The live transfer bridge is an external collaborator; until one
        // is wired in, every run resolves against the simulated client.
        warn!("No live transfer backend configured, falling back to simulation");
    }

    let queue = OpportunityQueue::new();
    let ledger = Arc::new(Ledger::open(&config.ledger_path)?);
    let market = Arc::new(SimulatedMarket::new());
    let transfer = Arc::new(SimulatedTransfer::new());

    let scorers: Vec<Arc<dyn Scorer>> = vec![
        Arc::new(FlashloanRouteScorer::new(&config)),
        Arc::new(SandwichAmountScorer::new(&config)),
        Arc::new(LiquidationPredictor::new(&config)),
        Arc::new(BundleTimingScorer::new(&config)),
        Arc::new(ArbitrageMatrixScorer::new(&config)),
    ];

    let engine = ExecutionEngine::new(
        queue.clone(),
        Arc::clone(&ledger),
        transfer,
        config.sol_price_usd,
    );

    let pipeline = Pipeline::start(
        scorers,
        market,
        queue,
        engine,
        Arc::clone(&ledger),
        Duration::from_secs(config.executor_interval_secs),
    );

    info!("MevFlow is running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutdown signal received.");
    let status = pipeline.status().await;
    info!(
        "Draining: {} executions so far, {} opportunities still queued",
        status.executions,
        pipeline.queue_depth().await
    );
    pipeline.stop().await;

    let summary = ledger.summary().await;
    info!(
        "MevFlow shut down cleanly: {} executions, {} successes, ${:.2} realized ({:.4} SOL)",
        summary.executions, summary.successes, summary.profit_usd, summary.sol_profit
    );

    Ok(())
}

async fn print_status() -> Result<()> {
    let config = Config::load();
    let ledger = Ledger::open(&config.ledger_path)?;
    let summary = ledger.summary().await;

    println!("Ledger: {}", config.ledger_path.display());
    println!("Executions:      {}", summary.executions);
    println!("Successes:       {}", summary.successes);
    println!("Realized profit: ${:.2}", summary.profit_usd);
    println!("Realized SOL:    {:.4}", summary.sol_profit);

    Ok(())
}
