use std::io::Write;
use std::path::PathBuf;

use blanket_core::{BlanketConfig, Detent, ResolveInput, Size, resolve};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::error::Result;
use crate::{config, logging, trace};

#[derive(Debug, Parser)]
#[command(
    name = "blanket-harness",
    about = "Replay input traces through the blanket sheet controller",
    version
)]
pub struct Cli {
    /// TOML file overriding the default thresholds and springs.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive (defaults to RUST_LOG, then "info").
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON trace and print one JSON frame per event.
    Replay(ReplayArgs),

    /// Resolve detents for the given geometry and print the result.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to a JSON trace.
    pub trace: PathBuf,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Container height.
    #[arg(long)]
    pub container: f64,

    /// Content height.
    #[arg(long)]
    pub content: f64,

    /// Bottom safe-area inset.
    #[arg(long, default_value_t = 0.0)]
    pub safe_area: f64,

    /// Detent (`content`, `fraction:<f>`, `height:<h>`); repeatable.
    #[arg(long = "detent")]
    pub detents: Vec<String>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_filter.as_deref(), cli.json_logs)?;
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => BlanketConfig::default(),
    };

    match cli.command {
        Commands::Replay(args) => run_replay(&args, &config, out),
        Commands::Resolve(args) => run_resolve(&args, &config, out),
    }
}

fn run_replay(args: &ReplayArgs, config: &BlanketConfig, out: &mut dyn Write) -> Result<()> {
    let events = trace::load_trace(&args.trace)?;
    info!(trace = %args.trace.display(), events = events.len(), "replaying");
    for record in trace::replay(&events, config) {
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn run_resolve(args: &ResolveArgs, config: &BlanketConfig, out: &mut dyn Write) -> Result<()> {
    let detents = args
        .detents
        .iter()
        .map(|text| text.parse::<Detent>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let resolution = resolve(
        &ResolveInput {
            detents: &detents,
            content_size: Size::new(0.0, args.content),
            container_size: Size::new(0.0, args.container),
            safe_area_bottom: args.safe_area,
        },
        config,
    );
    serde_json::to_writer_pretty(&mut *out, &resolution)?;
    writeln!(out)?;
    Ok(())
}
