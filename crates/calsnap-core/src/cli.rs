use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        let key = k.trim();
        if key.is_empty() {
            return Err(anyhow!("expected KEY=VALUE, got: {s}"));
        }
        Ok(Self {
            key: key.to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "calsnap",
    version,
    about = "Month grids for date pickers and paging snap offsets for card carousels"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<KeyVal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the calendar grid of a month.
    Month(MonthArgs),
    /// Tell whether two dates fall on the same calendar day.
    SameDay(SameDayArgs),
    /// Compute carousel snap offsets for a drag release.
    Snap(SnapArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MonthArgs {
    /// Reference date; defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Months away from the reference month.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: i32,

    /// Day to highlight; defaults to the reference date.
    #[arg(long)]
    pub select: Option<String>,

    /// Decorate the grid with the demo task schedule.
    #[arg(long)]
    pub sample_tasks: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SameDayArgs {
    pub first: String,
    pub second: String,
}

#[derive(Args, Debug, Clone)]
pub struct SnapArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub offset: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub velocity: f64,

    /// Item pitch; defaults to card height plus spacing from the config.
    #[arg(long)]
    pub pitch: Option<f64>,

    /// Last valid item index; enables the settled offset.
    #[arg(long, allow_hyphen_values = true)]
    pub max_index: Option<i64>,
}

#[must_use]
pub fn default_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) => "warn",
        (0, 3..) => "trace",
        (0, 2) => "debug",
        (0, 1) => "info",
        (0, 0) => "warn",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
