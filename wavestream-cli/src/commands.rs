use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use wavestream_config::StreamerConfig;
use wavestream_core::command::scenario_label;
use wavestream_core::scenario::ScenarioStore;
use wavestream_engine::{run_reset_mode, run_stream_mode, StreamOptions};
use wavestream_telemetry::logging::EventLogger;

#[derive(Parser, Debug)]
#[command(name = "wavestream", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset the nodes and stream waveforms until `q` or Ctrl+C
    Stream(StreamArgs),
    /// Load the scenario files and print what they contain
    Scenarios(ScenariosArgs),
    /// Run only the reset handshake
    Reset(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file; defaults to config/wavestream.yaml plus overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Directory holding the scenario CSV files
    #[arg(long)]
    pub scenario_dir: Option<PathBuf>,
    /// Skip the reset handshake before streaming
    #[arg(long)]
    pub no_reset: bool,
    /// Do not read keys; stop with a signal
    #[arg(long)]
    pub headless: bool,
    /// Keep datagrams in memory instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Directory holding the scenario CSV files
    #[arg(long)]
    pub scenario_dir: Option<PathBuf>,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Stream(args) => stream(args).await,
        Commands::Scenarios(args) => scenarios(args),
        Commands::Reset(args) => reset(args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StreamerConfig> {
    let config = StreamerConfig::resolve(path).context("failed to load configuration")?;
    EventLogger::init(&config.telemetry.log_level)
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    Ok(config)
}

async fn stream(args: StreamArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.config.as_deref())?;
    let options = StreamOptions {
        reset: !args.no_reset,
        headless: args.headless,
        dry_run: args.dry_run,
        scenario_dir: args.scenario_dir,
    };

    let summary = run_stream_mode(config, options)
        .await
        .context("streaming failed")?;
    info!("{summary}");
    println!("{}", summary.final_status);
    Ok(())
}

fn scenarios(args: ScenariosArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.config.as_deref())?;
    if let Some(dir) = args.scenario_dir {
        config.scenarios.directory = dir;
    }
    let store = ScenarioStore::load(&config.scenarios).with_context(|| {
        format!(
            "no scenarios loadable from {}",
            config.scenarios.directory.display()
        )
    })?;

    print!("{}", scenario_table(&store));
    Ok(())
}

fn scenario_table(store: &ScenarioStore) -> String {
    let cycle_length = store.cycle_length();
    let mut table = format!("{:<8} {:<12} {:>8} {:>7}\n", "name", "label", "samples", "cycles");
    for scenario in store.iter() {
        table.push_str(&format!(
            "{:<8} {:<12} {:>8} {:>7}\n",
            scenario.name(),
            scenario_label(scenario.name()),
            scenario.len(),
            scenario.cycles(cycle_length)
        ));
    }
    table
}

async fn reset(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let report = run_reset_mode(config).await.context("reset failed")?;
    if report.failed > 0 {
        anyhow::bail!(
            "{} of {} reset commands could not be sent",
            report.failed,
            report.sent + report.failed
        );
    }
    println!("Reset {} commands sent", report.sent);
    Ok(())
}
