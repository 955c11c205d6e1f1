use chrono::{
  Datelike,
  Days,
  Months,
  NaiveDate
};
use thiserror::Error;

use crate::datetime::is_same_day;

pub const PAD_DAY: i32 = -1;

pub const WEEKDAY_LABELS: [&str; 7] = [
  "Sun", "Mon", "Tue", "Wed", "Thu",
  "Fri", "Sat"
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
  #[error(
    "cannot shift {base} by {offset} \
     months: date out of range"
  )]
  DateArithmetic {
    base:   NaiveDate,
    offset: i32
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
  pub day:  i32,
  pub date: NaiveDate
}

impl CalendarCell {
  #[must_use]
  pub fn is_pad(&self) -> bool {
    self.day == PAD_DAY
  }

  #[must_use]
  pub fn is_selected(
    &self,
    selected: NaiveDate
  ) -> bool {
    !self.is_pad()
      && is_same_day(&self.date, &selected)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub target_month: NaiveDate,
  pub cells:        Vec<CalendarCell>
}

impl MonthGrid {
  #[tracing::instrument]
  pub fn build(
    base_date: NaiveDate,
    month_offset: i32
  ) -> Result<Self, CalendarError> {
    let target_month = shift_months(
      first_day_of_month(base_date),
      month_offset
    )
    .ok_or(
      CalendarError::DateArithmetic {
        base:   base_date,
        offset: month_offset
      }
    )?;

    let day_count = u32::from(
      target_month.num_days_in_month()
    );
    let leading = weekday_index(
      target_month
    );

    let mut cells = Vec::with_capacity(
      (leading + day_count) as usize
    );
    cells.extend(
      (0..leading).map(|_| {
        CalendarCell {
          day:  PAD_DAY,
          date: target_month
        }
      })
    );

    for day in 1..=day_count {
      let date = target_month
        .checked_add_days(Days::new(
          u64::from(day - 1)
        ))
        .ok_or(
          CalendarError::DateArithmetic {
            base:   base_date,
            offset: month_offset
          }
        )?;
      cells.push(CalendarCell {
        day: day as i32,
        date
      });
    }

    tracing::debug!(
      month = %target_month,
      leading,
      day_count,
      "built month grid"
    );

    Ok(Self {
      target_month,
      cells
    })
  }

  #[must_use]
  pub fn leading_pad(&self) -> usize {
    self
      .cells
      .iter()
      .take_while(|cell| cell.is_pad())
      .count()
  }

  #[must_use]
  pub fn days_in_month(&self) -> usize {
    self.cells.len() - self.leading_pad()
  }

  pub fn real_days(
    &self
  ) -> impl Iterator<Item = &CalendarCell>
  {
    self
      .cells
      .iter()
      .filter(|cell| !cell.is_pad())
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[CalendarCell]>
  {
    self.cells.chunks(7)
  }

  #[must_use]
  pub fn title(&self) -> String {
    month_title(self.target_month)
  }

  #[must_use]
  pub fn position_of(
    &self,
    date: NaiveDate
  ) -> Option<usize> {
    self
      .cells
      .iter()
      .position(|cell| {
        cell.is_selected(date)
      })
  }
}

pub fn build_month_grid(
  base_date: NaiveDate,
  month_offset: i32
) -> Result<Vec<CalendarCell>, CalendarError>
{
  MonthGrid::build(base_date, month_offset)
    .map(|grid| grid.cells)
}

#[must_use]
pub fn first_day_of_month(
  date: NaiveDate
) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> Option<NaiveDate> {
  let step = Months::new(
    months.unsigned_abs()
  );
  if months >= 0 {
    date.checked_add_months(step)
  } else {
    date.checked_sub_months(step)
  }
}

// 0 = Sunday .. 6 = Saturday
#[must_use]
pub fn weekday_index(
  date: NaiveDate
) -> u32 {
  date.weekday().num_days_from_sunday()
}

#[must_use]
pub fn weekday_labels()
-> [&'static str; 7] {
  WEEKDAY_LABELS
}

#[must_use]
pub fn month_title(
  date: NaiveDate
) -> String {
  date.format("%Y %B").to_string()
}
