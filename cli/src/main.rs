// tman: gossip overlay clustering from the command line
//
// Runs a static or growing ring, writes topology checkpoints and prints how
// close the overlay got to the exact k-NN graph.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tman_core::{
    ExchangeMode, OverlayNetwork, SimulationConfig, StartView, TopologyExporter,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use progress::{is_checkpoint, RunProgress};

#[derive(Parser)]
#[command(name = "tman")]
#[command(about = "Gossip overlay clustering on a ring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        #[command(subcommand)]
        topology: Topology,
    },
    /// Configure defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum Topology {
    /// Fixed population on a ring
    Ring {
        #[arg(short, long)]
        nodes: usize,
        #[arg(short)]
        k: usize,
        #[arg(short, long)]
        epochs: Option<u64>,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Ring that grows by one batch every interval
    Dynamic {
        #[arg(short, long)]
        nodes: usize,
        #[arg(short)]
        k: usize,
        #[arg(short, long)]
        interval: Option<u64>,
        /// Join batch sizes, in order
        #[arg(required = true)]
        batches: Vec<usize>,
        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args)]
struct RunOptions {
    #[arg(long)]
    seed: Option<u64>,
    /// Checkpoint directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Only the contacted peer merges during an exchange
    #[arg(long)]
    push_only: bool,
    /// Start from random views instead of exact k-NN
    #[arg(long)]
    random_start: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { topology } => cmd_run(topology),
        Commands::Config { action } => {
            let _guard = init_tracing(None)?;
            cmd_config(action)
        }
    }
}

/// Console logging filtered by `RUST_LOG` (default `warn`), plus an
/// info-level JSON log file when `log_dir` is given
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    );

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(console).try_init()?;
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "tman.log"));
    let file = fmt::layer()
        .json()
        .with_writer(writer)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()?;
    Ok(Some(guard))
}

fn cmd_run(topology: Topology) -> Result<()> {
    let settings = config::Settings::load()?;

    let (config, epochs, options) = match topology {
        Topology::Ring {
            nodes,
            k,
            epochs,
            options,
        } => (
            SimulationConfig::ring(nodes, k),
            epochs.unwrap_or(settings.ring_epochs),
            options,
        ),
        Topology::Dynamic {
            nodes,
            k,
            interval,
            batches,
            options,
        } => {
            let config = SimulationConfig::dynamic(nodes, k, batches)
                .with_interval(interval.unwrap_or(settings.interval));
            let epochs = config.default_epochs();
            (config, epochs, options)
        }
    };

    let config = config
        .with_seed(options.seed.unwrap_or(settings.seed))
        .with_exchange(if options.push_only {
            ExchangeMode::Push
        } else {
            ExchangeMode::PushPull
        })
        .with_start(if options.random_start {
            StartView::Random
        } else {
            StartView::Exact
        });

    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(&settings.output_dir));
    let exporter = TopologyExporter::new(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let _guard = init_tracing(settings.log_file.then(|| exporter.dir()))?;

    simulate(&config, epochs, &exporter)
}

fn simulate(config: &SimulationConfig, epochs: u64, exporter: &TopologyExporter) -> Result<()> {
    if epochs == 0 {
        anyhow::bail!("Epoch count must be at least 1");
    }

    println!("{}", "Building overlay...".bold());
    let mut network = OverlayNetwork::build(config).context("Invalid simulation parameters")?;
    network.start().context("Failed to seed neighbor views")?;
    network
        .ensure_schedule(epochs)
        .context("Growth schedule does not cover the run")?;

    exporter
        .write_colors(&network)
        .context("Failed to write node colors")?;
    println!(
        "  {} {} nodes, k = {}, seed {}",
        "✓".green(),
        network.len(),
        network.fanout(),
        config.seed
    );
    println!("  {} {} exchanges", "✓".green(), exchange_label(network.exchange_mode()));
    if let Some(growth) = network.growth() {
        let batches: Vec<String> = growth.pending().map(|b| b.to_string()).collect();
        println!(
            "  {} growth batches [{}] every {} epochs",
            "✓".green(),
            batches.join(", "),
            growth.interval()
        );
    }

    info!(epochs, output = %exporter.dir().display(), "Starting run");

    let mut progress = RunProgress::new();
    let mut checkpoints = 0usize;
    for _ in 0..epochs {
        network
            .run_epoch_observed(&mut progress)
            .context("Gossip epoch failed")?;

        let epoch = network.epoch();
        if let Some(event) = progress.growth.last().filter(|g| g.epoch == epoch) {
            println!(
                "  {} epoch {:>3}: {} joined, population {}, radius {:.3}",
                "+".bright_green(),
                epoch,
                event.batch,
                event.population,
                event.radius
            );
        }
        if is_checkpoint(epoch, epochs, progress.grew_at(epoch)) {
            exporter
                .checkpoint(&network)
                .with_context(|| format!("Failed to write checkpoint for epoch {}", epoch))?;
            checkpoints += 1;
        }
    }

    print_summary(&progress, checkpoints, exporter);
    Ok(())
}

fn exchange_label(mode: ExchangeMode) -> &'static str {
    match mode {
        ExchangeMode::PushPull => "push-pull",
        ExchangeMode::Push => "push-only",
    }
}

fn print_summary(progress: &RunProgress, checkpoints: usize, exporter: &TopologyExporter) {
    let Some(report) = progress.latest() else {
        return;
    };

    println!();
    println!("{}", "Convergence".bold());
    println!("  Epochs:          {}", report.epoch);
    println!("  Population:      {}", report.population);
    println!("  Exchanges:       {}", progress.exchanges);
    println!("  Growth events:   {}", progress.growth.len());
    println!("  Recall:          {}", format!("{:.4}", report.recall).bright_cyan());
    println!(
        "  Exact views:     {}/{}",
        report.exact_nodes, report.population
    );
    println!("  Mean distance:   {:.4}", report.mean_neighbor_distance);
    println!("  Oracle distance: {:.4}", report.oracle_mean_distance);
    println!();

    if report.is_converged() {
        println!("{} Every view matches its exact k nearest", "✓".green());
    } else {
        println!(
            "{} {} views still off (gap {:.4})",
            "•".yellow(),
            report.population - report.exact_nodes,
            report.distance_gap()
        );
    }
    println!(
        "  {} checkpoints in {}",
        checkpoints,
        exporter.dir().display().to_string().bright_cyan()
    );
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut settings = config::Settings::load()?;

    match action {
        ConfigAction::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save()?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = settings.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();
            for (key, value) in settings.list() {
                println!("  {:<14} {}", key.bright_cyan(), value);
            }
        }
    }

    Ok(())
}
