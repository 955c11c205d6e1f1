pub mod agenda;
pub mod calendar;
pub mod carousel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod render;
pub mod snap;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use agenda::{
  DayTasks,
  InMemoryTasks,
  Task,
  TaskSource
};
pub use calendar::{
  CalendarCell,
  CalendarError,
  MonthGrid,
  PAD_DAY,
  build_month_grid
};
pub use carousel::{
  CardGeometry,
  CarouselTracker,
  ScrollPhase
};
pub use datetime::{
  CalendarDay,
  is_same_day
};
pub use snap::{
  ItemPitch,
  Rounding,
  SnapCalculator,
  SnapError,
  compute_drag_end_offset,
  compute_settled_offset
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting calsnap"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  let settings = cfg
    .settings()
    .context(
      "failed to resolve settings"
    )?;
  debug!(?settings, files = ?cfg.loaded_files, "settings resolved");

  let timezone =
    datetime::resolve_project_timezone(
      settings.timezone_id()
    );
  let ctx = commands::CommandContext {
    settings,
    timezone,
    now: Utc::now()
  };

  let renderer =
    render::Renderer::for_stdout();
  commands::dispatch(
    &ctx,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
