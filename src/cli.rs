//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_bar_cache::CsvBarCache;
use crate::adapters::csv_signal_adapter::CsvSignalSink;
use crate::adapters::csv_tick_adapter::CsvTickAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar_aggregator::{BarAggregator, CacheOutcome};
use crate::domain::error::BarcrossError;
use crate::domain::run_config::RunConfig;
use crate::domain::session::BarKey;
use crate::domain::signal::Signal;
use crate::domain::sweep::{Sweep, SweepReport};
use crate::ports::signal_port::SignalSink;
use crate::ports::tick_port::TickPort;

#[derive(Parser, Debug)]
#[command(
    name = "barcross",
    about = "Tick-to-bar aggregation and moving-average signal strategies"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build (or fetch from cache) bars for one instrument
    Aggregate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        instrument: String,
    },
    /// Run one configured strategy on one instrument and export its signals
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        /// Label of a `[strategy.<label>]` section
        #[arg(short, long)]
        strategy: String,
        #[arg(short, long)]
        instrument: String,
    },
    /// Run every strategy on every instrument in parallel
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides `[sweep] workers`
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Validate a configuration file and list its strategies
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Aggregate { config, instrument } => run_aggregate(&config, &instrument),
        Command::Signals {
            config,
            strategy,
            instrument,
        } => run_signals(&config, &strategy, &instrument),
        Command::Sweep { config, workers } => run_sweep(&config, workers),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &BarcrossError) -> ExitCode {
    error!("{err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BarcrossError> {
    FileConfigAdapter::from_file(path).map_err(|e| BarcrossError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_run_config(path: &Path) -> Result<RunConfig, BarcrossError> {
    info!(path = %path.display(), "loading config");
    let adapter = load_config(path)?;
    RunConfig::from_config(&adapter)
}

/// Configured instruments, or every instrument the tick store knows about.
pub fn resolve_instruments(
    run: &RunConfig,
    ticks: &dyn TickPort,
) -> Result<Vec<String>, BarcrossError> {
    if !run.instruments.is_empty() {
        return Ok(run.instruments.clone());
    }
    let found = ticks.list_instruments()?;
    if found.is_empty() {
        warn!(tick_dir = %run.tick_dir.display(), "no instruments found");
    }
    Ok(found)
}

#[derive(Debug, Clone)]
pub struct AggregateSummary {
    pub bars: usize,
    pub outcome: CacheOutcome,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SignalsSummary {
    pub strategy: String,
    pub bars: usize,
    pub longs: usize,
    pub shorts: usize,
    pub path: PathBuf,
}

pub fn execute_aggregate(
    run: &RunConfig,
    instrument: &str,
) -> Result<AggregateSummary, BarcrossError> {
    let ticks = CsvTickAdapter::new(run.tick_dir.clone());
    let cache = CsvBarCache::new(run.cache_dir.clone());
    let aggregator = BarAggregator::new(&ticks, &cache, run.session);

    let key = BarKey::new(instrument, run.interval);
    let fetched = aggregator.fetch(&key)?;
    Ok(AggregateSummary {
        bars: fetched.bars.len(),
        outcome: fetched.outcome,
        path: cache.artifact_path(&key),
    })
}

pub fn execute_signals(
    run: &RunConfig,
    label: &str,
    instrument: &str,
) -> Result<SignalsSummary, BarcrossError> {
    let strategy = run.strategy(label)?.build();
    let ticks = CsvTickAdapter::new(run.tick_dir.clone());
    let cache = CsvBarCache::new(run.cache_dir.clone());
    let sink = CsvSignalSink::new(run.output_dir.clone());
    let aggregator = BarAggregator::new(&ticks, &cache, run.session);

    let bars = aggregator.get_bars(&BarKey::new(instrument, run.interval))?;
    let signals = strategy.calculate_signals(&bars);
    sink.publish(label, &bars, &signals)?;

    Ok(SignalsSummary {
        strategy: strategy.name(),
        bars: bars.len(),
        longs: signals.count(Signal::Long),
        shorts: signals.count(Signal::Short),
        path: sink.output_path(label, instrument),
    })
}

pub fn execute_sweep(
    run: &RunConfig,
    workers: Option<usize>,
) -> Result<SweepReport, BarcrossError> {
    if run.strategies.is_empty() {
        return Err(BarcrossError::ConfigMissing {
            section: "strategy.<label>".to_string(),
            key: "kind".to_string(),
        });
    }
    let ticks = CsvTickAdapter::new(run.tick_dir.clone());
    let cache = CsvBarCache::new(run.cache_dir.clone());
    let sink = CsvSignalSink::new(run.output_dir.clone());
    let aggregator = BarAggregator::new(&ticks, &cache, run.session);

    let instruments = resolve_instruments(run, &ticks)?;
    Sweep::new(&aggregator, run.interval)
        .with_sink(&sink)
        .with_workers(workers.unwrap_or(run.workers))
        .run(&instruments, &run.strategies)
}

fn run_aggregate(config_path: &Path, instrument: &str) -> ExitCode {
    let run = match load_run_config(config_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    match execute_aggregate(&run, instrument) {
        Ok(summary) => {
            let how = match summary.outcome {
                CacheOutcome::Hit => "cached",
                CacheOutcome::Built => "built",
            };
            println!(
                "{instrument}@{}: {} bars ({how}) {}",
                run.interval,
                summary.bars,
                summary.path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_signals(config_path: &Path, label: &str, instrument: &str) -> ExitCode {
    let run = match load_run_config(config_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    match execute_signals(&run, label, instrument) {
        Ok(s) => {
            println!(
                "{label} {} {instrument}: {} bars, {} long, {} short -> {}",
                s.strategy,
                s.bars,
                s.longs,
                s.shorts,
                s.path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_sweep(config_path: &Path, workers: Option<usize>) -> ExitCode {
    let run = match load_run_config(config_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let report = match execute_sweep(&run, workers) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(s) => println!(
                "{}\t{}\t{}\t{} bars\t{} long\t{} short",
                outcome.label, outcome.instrument, outcome.strategy, s.bars, s.longs, s.shorts
            ),
            Err(e) => println!(
                "{}\t{}\t{}\tFAILED: {e}",
                outcome.label, outcome.instrument, outcome.strategy
            ),
        }
    }
    println!(
        "{} units, {} succeeded, {} failed",
        report.outcomes.len(),
        report.succeeded(),
        report.failed()
    );

    if report.all_failed() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let run = match load_run_config(config_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    println!("ticks:    {}", run.tick_dir.display());
    println!("cache:    {}", run.cache_dir.display());
    println!("output:   {}", run.output_dir.display());
    println!("session:  {} - {}", run.session.open, run.session.close);
    println!("interval: {}", run.interval);
    if run.instruments.is_empty() {
        println!("instruments: (all under tick dir)");
    } else {
        println!("instruments: {}", run.instruments.join(", "));
    }
    println!("strategies:");
    for (label, cfg) in &run.strategies {
        println!("  {label}: {}", cfg.build().name());
    }
    if run.strategies.is_empty() {
        warn!("no [strategy.<label>] sections defined");
    }
    ExitCode::SUCCESS
}
