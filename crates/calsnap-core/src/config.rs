use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::carousel::CardGeometry;
use crate::snap::{
  DEFAULT_FLING_FACTOR,
  Rounding,
  SnapCalculator
};

pub const CONFIG_FILE: &str =
  "calsnap.toml";
pub const CONFIG_ENV_VAR: &str =
  "CALSNAP_CONFIG";

#[derive(Debug, Clone, Default)]
pub struct Config {
  table:            toml::Table,
  pub loaded_files: Vec<PathBuf>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub timezone: Option<String>,
  pub time:     Option<TimeSection>,
  pub calendar: CalendarSection,
  pub snap:     SnapSection
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeSection {
  pub timezone: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
  pub sample_tasks: bool
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapSection {
  pub fling_factor: f64,
  pub rounding:     Rounding,
  pub card_height:  f64,
  pub card_spacing: f64
}

impl Default for SnapSection {
  fn default() -> Self {
    let geometry =
      CardGeometry::default();
    Self {
      fling_factor: DEFAULT_FLING_FACTOR,
      rounding:     Rounding::default(),
      card_height:  geometry.card_height,
      card_spacing: geometry.card_spacing
    }
  }
}

impl Settings {
  // top-level `timezone` wins over
  // `[time] timezone`
  #[must_use]
  pub fn timezone_id(
    &self
  ) -> Option<&str> {
    self
      .timezone
      .as_deref()
      .or_else(|| {
        self
          .time
          .as_ref()
          .and_then(|section| {
            section.timezone.as_deref()
          })
      })
  }

  #[must_use]
  pub fn calculator(
    &self
  ) -> SnapCalculator {
    SnapCalculator::new(
      self.snap.fling_factor,
      self.snap.rounding
    )
  }

  #[must_use]
  pub fn geometry(
    &self
  ) -> CardGeometry {
    CardGeometry {
      card_height:  self.snap.card_height,
      card_spacing: self.snap.card_spacing
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(
        config_override
      )?
    else {
      warn!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let mut cfg = Self::from_toml_str(
      &text
    )
    .with_context(|| {
      format!(
        "failed to parse {}",
        path.display()
      )
    })?;
    cfg.loaded_files.push(path);
    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let table =
      toml::from_str::<toml::Table>(
        text
      )?;
    Ok(Self {
      table,
      loaded_files: vec![]
    })
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, raw) in overrides {
      let value = parse_override_value(
        &raw
      );
      debug!(key = %key, value = %value, "applying override");
      insert_dotted(
        &mut self.table,
        &key,
        value
      )?;
    }
    Ok(())
  }

  pub fn settings(
    &self
  ) -> anyhow::Result<Settings> {
    toml::Value::Table(
      self.table.clone()
    )
    .try_into::<Settings>()
    .context("invalid configuration")
  }
}

#[tracing::instrument(skip(
  config_override
))]
fn resolve_config_path(
  config_override: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  let from_env =
    std::env::var(CONFIG_ENV_VAR).ok();
  let cwd = std::env::current_dir().ok();
  let config_dir = dirs::config_dir();
  config_path_from(
    config_override,
    from_env.as_deref(),
    cwd.as_deref(),
    config_dir.as_deref()
  )
}

// --config, then the env var, then the
// working directory, then the user
// config dir
fn config_path_from(
  config_override: Option<&Path>,
  from_env: Option<&str>,
  cwd: Option<&Path>,
  config_dir: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = config_override {
    let path = expand_tilde(path);
    if !path.exists() {
      return Err(anyhow!(
        "config file does not exist: \
         {}",
        path.display()
      ));
    }
    return Ok(Some(path));
  }

  if let Some(raw) = from_env {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Ok(Some(expand_tilde(
        Path::new(trimmed)
      )));
    }
  }

  if let Some(dir) = cwd {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  if let Some(dir) = config_dir {
    let candidate = dir
      .join("calsnap")
      .join(CONFIG_FILE);
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  Ok(None)
}

fn parse_override_value(
  raw: &str
) -> toml::Value {
  let trimmed = raw.trim();
  toml::from_str::<toml::Table>(
    &format!("v = {trimmed}")
  )
  .ok()
  .and_then(|mut table| {
    table.remove("v")
  })
  .unwrap_or_else(|| {
    toml::Value::String(
      trimmed.to_string()
    )
  })
}

fn insert_dotted(
  table: &mut toml::Table,
  key: &str,
  value: toml::Value
) -> anyhow::Result<()> {
  let mut parts: Vec<&str> = key
    .split('.')
    .map(str::trim)
    .collect();
  if parts.iter().any(|p| p.is_empty())
  {
    return Err(anyhow!(
      "invalid override key: {key}"
    ));
  }

  let Some(leaf) = parts.pop() else {
    return Err(anyhow!(
      "invalid override key: {key}"
    ));
  };

  let mut current = table;
  for part in parts {
    let entry = current
      .entry(part.to_string())
      .or_insert_with(|| {
        toml::Value::Table(
          toml::Table::new()
        )
      });
    current = entry
      .as_table_mut()
      .ok_or_else(|| {
        anyhow!(
          "override {key}: {part} is \
           not a table"
        )
      })?;
  }

  current.insert(leaf.to_string(), value);
  Ok(())
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
