use std::io::{self, IsTerminal, Write};

use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::agenda::DayTasks;
use crate::calendar::{MonthGrid, weekday_labels};

const CELL_WIDTH: usize = 6;
const TASK_DOT: &str = "•";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    #[must_use]
    pub fn for_stdout() -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, writer, grid, marks))]
    pub fn write_month<W: Write>(
        &self,
        mut writer: W,
        grid: &MonthGrid,
        selected: NaiveDate,
        marks: &[bool],
    ) -> anyhow::Result<()> {
        writeln!(writer, "{}", grid.title())?;

        for label in weekday_labels() {
            write!(writer, "{}", pad_left(label, CELL_WIDTH))?;
        }
        writeln!(writer)?;

        for (row, week) in grid.weeks().enumerate() {
            for (col, cell) in week.iter().enumerate() {
                if cell.is_pad() {
                    write!(writer, "{}", " ".repeat(CELL_WIDTH))?;
                    continue;
                }

                let marked = marks.get(row * 7 + col).copied().unwrap_or(false);
                let mut text = if cell.is_selected(selected) {
                    format!("[{}]", cell.day)
                } else {
                    cell.day.to_string()
                };
                if marked {
                    text.push_str(TASK_DOT);
                }

                let padded = pad_left(&text, CELL_WIDTH);
                let painted = if cell.is_selected(selected) {
                    self.paint(&padded, "7")
                } else if marked {
                    self.paint(&padded, "35")
                } else {
                    padded
                };
                write!(writer, "{painted}")?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, writer, day))]
    pub fn write_tasks<W: Write>(
        &self,
        mut writer: W,
        day: Option<&DayTasks>,
    ) -> anyhow::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.paint("Tasks", "1"))?;

        match day {
            Some(day) if !day.tasks.is_empty() => {
                for task in &day.tasks {
                    writeln!(writer, "  {}  {}", task.time.format("%H:%M"), task.title)?;
                }
            }
            _ => writeln!(writer, "  No Task Found")?,
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad_left(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    format!("{}{}", " ".repeat(width.saturating_sub(visible)), text)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::Renderer;
    use crate::agenda::{DayTasks, Task};
    use crate::calendar::MonthGrid;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn render_month(grid: &MonthGrid, selected: NaiveDate, marks: &[bool]) -> String {
        let mut out = Vec::new();
        Renderer::plain()
            .write_month(&mut out, grid, selected, marks)
            .expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn month_layout_aligns_first_day() {
        // 2024-02-01 is a Thursday.
        let grid = MonthGrid::build(ymd(2024, 2, 1), 0).expect("grid");
        let text = render_month(&grid, ymd(2024, 2, 14), &[]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2024 February");
        assert_eq!(lines[1], "   Sun   Mon   Tue   Wed   Thu   Fri   Sat");
        assert_eq!(lines[2], format!("{}     1     2     3", " ".repeat(24)));
        assert!(lines[4].contains("[14]"));
        assert_eq!(lines.len(), 2 + 5);
    }

    #[test]
    fn marked_days_get_a_dot() {
        let grid = MonthGrid::build(ymd(2023, 10, 1), 0).expect("grid");
        let mut marks = vec![false; grid.cells.len()];
        marks[2] = true;
        let text = render_month(&grid, ymd(2023, 10, 1), &marks);
        let first_week = text.lines().nth(2).expect("first week");
        assert!(first_week.starts_with("   [1]     2    3•"));
    }

    #[test]
    fn tasks_section() {
        let mut out = Vec::new();
        Renderer::plain().write_tasks(&mut out, None).expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("No Task Found"));

        let date = ymd(2024, 5, 1);
        let day = DayTasks {
            date,
            tasks: vec![Task {
                title: "Stand-up".to_string(),
                time: date.and_time(NaiveTime::from_hms_opt(9, 30, 0).expect("time")),
            }],
        };
        let mut out = Vec::new();
        Renderer::plain().write_tasks(&mut out, Some(&day)).expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("09:30  Stand-up"));
    }
}
