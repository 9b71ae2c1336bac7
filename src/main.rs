//! Monte-Carlo slot-machine simulation engine
//!
//! Loads a machine/player/run-config catalog, runs every (machine, player)
//! session in parallel across a work-stealing executor, and streams
//! results to CSV with a post-run aggregation report.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use rf_ab_sim::{
    build_tasks, ExecutorConfig, MachineCatalog, PlayerCatalog, PlayerEntry, SessionCaps,
    SimulationExecutor,
};
use rf_core::load_document;
use rf_players::HeuristicOracle;
use rf_sim_sink::{generate_reports, ResultSink};

use crate::config::SimulationConfig;

#[derive(Parser, Debug)]
#[command(name = "slotsim", about = "Monte-Carlo slot-machine simulation engine")]
struct Cli {
    /// Path to the machine/player/run-config catalog (JSON or YAML)
    #[arg(long)]
    config: PathBuf,

    /// Worker thread count; defaults to hardware concurrency
    #[arg(long)]
    threads: Option<usize>,

    /// DEBUG-level console logging
    #[arg(short, long)]
    verbose: bool,

    /// Additionally write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Suppress console logging entirely (requires --log-file)
    #[arg(long)]
    no_console: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    info!("starting slotsim run, config = {}", cli.config.display());

    match run(&cli) {
        Ok(stats) if stats.failed == 0 => {
            info!("run complete: {} sessions, 0 failures", stats.completed);
            Ok(())
        }
        Ok(stats) => {
            warn!("run complete with failures: {} ok, {} failed", stats.completed, stats.failed);
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("fatal: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    if cli.no_console && cli.log_file.is_none() {
        bail!("--no-console requires --log-file");
    }

    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let Some(path) = &cli.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        if cli.no_console {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        } else {
            builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
        }
    }

    builder.init();
    Ok(())
}

/// Duplicates every log line to both stderr and the log file. `env_logger`
/// only writes to one target at a time, so splitting is done at the
/// `Write` layer rather than by juggling two loggers.
struct Tee {
    file: std::fs::File,
}

impl std::io::Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write_all(&mut std::io::stderr(), buf)?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::Write::flush(&mut std::io::stderr())?;
        self.file.flush()
    }
}

struct RunStats {
    completed: u64,
    failed: u64,
}

fn run(cli: &Cli) -> Result<RunStats> {
    let config: SimulationConfig = load_document(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    for machine in &config.machines {
        machine.validate().with_context(|| format!("invalid machine '{}'", machine.id))?;
    }
    for entry in &config.players {
        entry
            .profile
            .validate()
            .with_context(|| format!("invalid player profile '{}'", entry.profile.id))?;
    }

    let mut machines = MachineCatalog::default();
    for machine in config.machines {
        machines.register(rf_core::MachineId::from(machine.id.as_str()), machine);
    }

    let mut players = PlayerCatalog::default();
    let mut registered_clusters = std::collections::BTreeSet::new();
    for entry in &config.players {
        let cluster = entry.player_cluster();
        if entry.profile.model_version != "random" && registered_clusters.insert(cluster.clone()) {
            players.register_oracle(cluster, Arc::new(HeuristicOracle));
        }
        players.register(PlayerEntry {
            profile: entry.profile.clone(),
            player_version: entry.player_version(),
            player_cluster: entry.player_cluster(),
        });
    }

    let tasks = build_tasks(&machines, &players, config.run.sessions_per_pair)
        .context("startup validation failed")?;
    info!("generated {} session tasks", tasks.len());

    let run_dir = run_output_dir(&config.run.base_dir);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;

    let sink = Arc::new(
        ResultSink::new(
            &run_dir,
            config.run.batch_write_size,
            config.run.record_raw_spins,
            config.run.max_spin_buffer_size,
        )
        .context("failed to initialize result sink")?,
    );

    let worker_count = cli.threads.or(config.run.threads).unwrap_or_else(|| num_cpus::get().max(1));
    let executor = SimulationExecutor::new(ExecutorConfig {
        worker_count,
        base_seed: config.run.seed,
        pool_capacity: rf_ab_sim::DEFAULT_POOL_CAPACITY,
        record_spins: config.run.record_raw_spins,
        session_caps: SessionCaps {
            max_spins: config.run.max_spins as u32,
            max_wall_seconds: config.run.max_wall_duration_secs,
            max_logical_seconds: config.run.max_logical_duration_secs,
        },
    });

    let started = Instant::now();
    let machines = Arc::new(machines);
    let players = Arc::new(players);
    let stats = executor
        .run(tasks, Arc::clone(&machines), Arc::clone(&players), Arc::clone(&sink))
        .context("simulation executor failed")?;
    let elapsed = started.elapsed();

    sink.finish().context("failed to flush result sink")?;
    generate_reports(sink.session_stats_path(), sink.reports_dir())
        .context("failed to generate reports")?;
    append_run_banner(sink.reports_dir(), worker_count, elapsed, &stats)?;

    Ok(RunStats { completed: stats.completed, failed: stats.failed })
}

fn run_output_dir(base_dir: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(base_dir).join(format!("simulation_{timestamp}"))
}

fn append_run_banner(
    reports_dir: &std::path::Path,
    worker_count: usize,
    elapsed: std::time::Duration,
    stats: &rf_ab_sim::RunStats,
) -> Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(reports_dir.join("summary.txt"))
        .context("failed to append run banner")?;
    writeln!(file, "workers: {worker_count}")?;
    writeln!(file, "elapsed_seconds: {:.3}", elapsed.as_secs_f64())?;
    writeln!(file, "completed: {}", stats.completed)?;
    writeln!(file, "failed: {}", stats.failed)?;
    Ok(())
}
