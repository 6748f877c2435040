use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, WrappedError};
use crate::time_utils;

/// Default inclusive start of the review window.
pub const DEFAULT_SINCE: &str = "2025-06-01";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Year-in-review statistics for editor usage exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "usage-wrapped",
    about = "Year-in-review statistics for editor usage exports",
    version
)]
pub struct Settings {
    /// Analytics export (`{"dailyMetrics": [...]}` or a bare array)
    #[arg(long, env = "WRAPPED_METRICS")]
    pub metrics: Option<PathBuf>,

    /// Usage events export: a JSON file or a directory of page dumps
    #[arg(long, env = "WRAPPED_EVENTS")]
    pub events: Option<PathBuf>,

    /// First day included in the review (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_SINCE)]
    pub since: String,

    /// Last day of the review period, used for the activity ratio (defaults to today)
    #[arg(long)]
    pub until: Option<String>,

    /// Timezone used to bucket days (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// How many entries to list in each ranking
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.usage-wrapped/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".usage-wrapped").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation. Accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (and env) always win over persisted values.
        if !is_arg_explicitly_set(&matches, "metrics") && settings.metrics.is_none() {
            settings.metrics = last.metrics;
        }
        if !is_arg_explicitly_set(&matches, "events") && settings.events.is_none() {
            settings.events = last.events;
        }
        if !is_arg_explicitly_set(&matches, "since") {
            if let Some(v) = last.since {
                settings.since = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top {
                settings.top = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("could not persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The analytics export path, which has no default.
    pub fn metrics_path(&self) -> Result<&std::path::Path> {
        self.metrics.as_deref().ok_or_else(|| {
            WrappedError::Config("no analytics export given (use --metrics <PATH>)".to_string())
        })
    }

    /// The inclusive cutoff date.
    pub fn since_date(&self) -> Result<NaiveDate> {
        time_utils::parse_date(&self.since)
    }

    /// The end of the review period, or `today` when `--until` is absent.
    pub fn until_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        match &self.until {
            Some(s) => time_utils::parse_date(s),
            None => Ok(today),
        }
    }

    /// The configured bucketing timezone.
    pub fn tz(&self) -> Result<Tz> {
        time_utils::parse_timezone(&self.timezone)
    }

    pub fn json_output(&self) -> bool {
        self.format == "json"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            metrics: s.metrics.clone(),
            events: s.events.clone(),
            since: Some(s.since.clone()),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
            top: Some(s.top),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
