use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

pub const TIMEZONE_ENV_VAR: &str =
  "CALSNAP_TIMEZONE";
pub const DEFAULT_PROJECT_TIMEZONE:
  &str = "America/Mexico_City";

pub trait CalendarDay {
  fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
  fn calendar_day(&self) -> NaiveDate {
    *self
  }
}

impl CalendarDay for NaiveDateTime {
  fn calendar_day(&self) -> NaiveDate {
    self.date()
  }
}

impl<Z: TimeZone> CalendarDay
  for DateTime<Z>
{
  fn calendar_day(&self) -> NaiveDate {
    self.date_naive()
  }
}

// Zoned values are read in their own
// timezone.
#[must_use]
pub fn is_same_day<A, B>(
  a: &A,
  b: &B
) -> bool
where
  A: CalendarDay + ?Sized,
  B: CalendarDay + ?Sized
{
  a.calendar_day() == b.calendar_day()
}

#[must_use]
pub fn is_same_project_day(
  a: DateTime<Utc>,
  b: DateTime<Utc>,
  tz: &Tz
) -> bool {
  is_same_day(
    &a.with_timezone(tz),
    &b.with_timezone(tz)
  )
}

#[must_use]
pub fn to_project_date(
  dt: DateTime<Utc>,
  tz: &Tz
) -> NaiveDate {
  dt.with_timezone(tz).date_naive()
}

pub fn resolve_project_timezone(
  configured: Option<&str>
) -> Tz {
  let from_env =
    std::env::var(TIMEZONE_ENV_VAR).ok();
  timezone_from_sources(
    from_env.as_deref(),
    configured
  )
}

// env var, then config, then the
// built-in default, then UTC
fn timezone_from_sources(
  from_env: Option<&str>,
  configured: Option<&str>
) -> Tz {
  if let Some(raw) = from_env
    && let Some(tz) =
      parse_timezone(raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_PROJECT_TIMEZONE,
    "DEFAULT_PROJECT_TIMEZONE"
  )
  .unwrap_or_else(|| {
    tracing::error!(
      "failed to parse fallback \
       timezone; using UTC"
    );
    chrono_tz::UTC
  })
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured project timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

// Naive inputs are taken as already
// local to `tz`.
#[tracing::instrument(skip(now, tz), fields(input = input))]
pub fn parse_local_datetime(
  input: &str,
  now: DateTime<Utc>,
  tz: &Tz
) -> anyhow::Result<NaiveDateTime> {
  let token = input.trim();

  match token
    .to_ascii_lowercase()
    .as_str()
  {
    | "now" => {
      return Ok(
        now
          .with_timezone(tz)
          .naive_local()
      );
    }
    | "today" => {
      return to_project_date(now, tz)
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| {
          anyhow!(
            "failed to construct \
             midnight for today"
          )
        });
    }
    | _ => {}
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(
      dt.with_timezone(tz).naive_local()
    );
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return date
      .and_hms_opt(0, 0, 0)
      .ok_or_else(|| {
        anyhow!(
          "failed to construct \
           midnight for date"
        )
      });
  }

  for fmt in
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
  {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Ok(ndt);
    }
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: now, today, \
     YYYY-MM-DD, YYYY-MM-DDTHH:MM, \
     YYYY-MM-DD HH:MM, RFC3339"
  })
}

pub fn parse_local_date(
  input: &str,
  now: DateTime<Utc>,
  tz: &Tz
) -> anyhow::Result<NaiveDate> {
  parse_local_datetime(input, now, tz)
    .map(|ndt| ndt.date())
}
