use std::io::{self, Write};

use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, instrument};

use crate::agenda::{InMemoryTasks, TaskSource, mark_cells};
use crate::calendar::MonthGrid;
use crate::cli::{Command, MonthArgs, SameDayArgs, SnapArgs};
use crate::config::Settings;
use crate::datetime::{is_same_day, parse_local_date, parse_local_datetime, to_project_date};
use crate::render::Renderer;
use crate::snap::ItemPitch;

#[derive(Debug, Clone)]
pub struct CommandContext {
    pub settings: Settings,
    pub timezone: Tz,
    pub now: DateTime<Utc>,
}

#[instrument(skip(ctx, renderer, command))]
pub fn dispatch(ctx: &CommandContext, renderer: &Renderer, command: Command) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Command::Month(args) => cmd_month(ctx, renderer, &args, &mut out),
        Command::SameDay(args) => cmd_same_day(ctx, &args, &mut out),
        Command::Snap(args) => cmd_snap(ctx, &args, &mut out),
    }
}

#[instrument(skip(ctx, renderer, args, out))]
pub fn cmd_month<W: Write>(
    ctx: &CommandContext,
    renderer: &Renderer,
    args: &MonthArgs,
    mut out: W,
) -> anyhow::Result<()> {
    info!(offset = args.offset, "command month");

    let today = to_project_date(ctx.now, &ctx.timezone);
    let base = match &args.date {
        Some(raw) => parse_local_date(raw, ctx.now, &ctx.timezone)
            .with_context(|| format!("invalid --date: {raw}"))?,
        None => today,
    };
    let selected = match &args.select {
        Some(raw) => parse_local_date(raw, ctx.now, &ctx.timezone)
            .with_context(|| format!("invalid --select: {raw}"))?,
        None => base,
    };

    let grid = MonthGrid::build(base, args.offset)?;

    let tasks = if args.sample_tasks || ctx.settings.calendar.sample_tasks {
        InMemoryTasks::sample(today)
    } else {
        InMemoryTasks::default()
    };
    let marks = mark_cells(&grid, &tasks);
    debug!(
        month = %grid.target_month,
        marked = marks.iter().filter(|m| **m).count(),
        "rendering month"
    );

    renderer.write_month(&mut out, &grid, selected, &marks)?;
    renderer.write_tasks(&mut out, tasks.tasks_on(selected))?;
    Ok(())
}

#[instrument(skip(ctx, args, out))]
pub fn cmd_same_day<W: Write>(ctx: &CommandContext, args: &SameDayArgs, mut out: W) -> anyhow::Result<()> {
    let first = parse_local_datetime(&args.first, ctx.now, &ctx.timezone)
        .with_context(|| format!("invalid first date: {}", args.first))?;
    let second = parse_local_datetime(&args.second, ctx.now, &ctx.timezone)
        .with_context(|| format!("invalid second date: {}", args.second))?;

    let same = is_same_day(&first, &second);
    debug!(%first, %second, same, "compared days");
    writeln!(out, "{same}")?;
    Ok(())
}

#[instrument(skip(ctx, args, out))]
pub fn cmd_snap<W: Write>(ctx: &CommandContext, args: &SnapArgs, mut out: W) -> anyhow::Result<()> {
    let pitch = match args.pitch {
        Some(raw) => ItemPitch::new(raw)?,
        None => ctx
            .settings
            .geometry()
            .pitch()
            .context("invalid card geometry in config")?,
    };
    let calculator = ctx.settings.calculator();

    let drag_end = calculator.drag_end_offset(args.offset, args.velocity, pitch);
    writeln!(out, "drag_end_offset: {drag_end}")?;

    if let Some(max_index) = args.max_index {
        let settled = calculator.settled_offset(args.offset, args.velocity, pitch, max_index)?;
        writeln!(out, "settled_offset: {settled}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn context() -> CommandContext {
        CommandContext {
            settings: Settings::default(),
            timezone: chrono_tz::UTC,
            now: Utc
                .with_ymd_and_hms(2024, 1, 5, 12, 0, 0)
                .single()
                .expect("valid now"),
        }
    }

    fn month_args(date: &str, offset: i32) -> MonthArgs {
        MonthArgs {
            date: Some(date.to_string()),
            offset,
            select: None,
            sample_tasks: false,
        }
    }

    #[test]
    fn month_renders_shifted_grid() {
        let mut out = Vec::new();
        cmd_month(&context(), &Renderer::plain(), &month_args("2023-12-15", 1), &mut out)
            .expect("month");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("2024 January\n"));
        assert!(text.contains("No Task Found"));
    }

    #[test]
    fn month_lists_sample_tasks_for_selected_day() {
        let mut args = month_args("2024-01-05", 0);
        args.select = Some("2024-01-06".to_string());
        args.sample_tasks = true;

        let mut out = Vec::new();
        cmd_month(&context(), &Renderer::plain(), &args, &mut out).expect("month");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("[6]•"));
        assert!(text.contains("Evening workout"));
    }

    #[test]
    fn month_rejects_bad_date() {
        let mut out = Vec::new();
        let err = cmd_month(&context(), &Renderer::plain(), &month_args("soon", 0), &mut out)
            .expect_err("bad date");
        assert!(format!("{err:#}").contains("invalid --date"));
    }

    #[test]
    fn same_day_prints_bool() {
        let args = SameDayArgs {
            first: "2024-01-01T23:59".to_string(),
            second: "2024-01-01T00:01".to_string(),
        };
        let mut out = Vec::new();
        cmd_same_day(&context(), &args, &mut out).expect("same day");
        assert_eq!(String::from_utf8(out).expect("utf8"), "true\n");
    }

    #[test]
    fn snap_prints_both_offsets() {
        let args = SnapArgs {
            offset: 1000.0,
            velocity: 5000.0,
            pitch: Some(220.0),
            max_index: Some(3),
        };
        let mut out = Vec::new();
        cmd_snap(&context(), &args, &mut out).expect("snap");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("settled_offset: 660\n"));
    }

    #[test]
    fn snap_surfaces_invalid_range() {
        let args = SnapArgs {
            offset: 0.0,
            velocity: 0.0,
            pitch: None,
            max_index: Some(-1),
        };
        let mut out = Vec::new();
        let err = cmd_snap(&context(), &args, &mut out).expect_err("invalid range");
        assert!(err.to_string().contains("max index -1"));
    }
}
