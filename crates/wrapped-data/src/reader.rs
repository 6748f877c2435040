//! Loading of exported dashboard payloads from disk.
//!
//! The analytics export is a single JSON document. Usage events may be a
//! single document or a directory of page dumps, one JSON file per page.

use std::path::{Path, PathBuf};

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::{debug, warn};

use wrapped_core::models::{DailyRecord, UsageEvent};
use wrapped_core::{Result, WrappedError};

/// Key holding the day list in an analytics response.
pub const DAILY_METRICS_KEY: &str = "dailyMetrics";
/// Key holding the event list in a usage-events page.
pub const USAGE_EVENTS_KEY: &str = "usageEventsDisplay";

/// Usage events read from one file.
#[derive(Debug, Clone)]
pub struct EventPage {
    pub path: PathBuf,
    pub events: Vec<UsageEvent>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read the daily analytics export at `path`.
///
/// Accepts `{"dailyMetrics": [...]}` or a bare array of records. A response
/// object without the list is treated as empty.
pub fn read_daily_records(path: &Path) -> Result<Vec<DailyRecord>> {
    if !path.is_file() {
        return Err(WrappedError::DataPathNotFound(path.to_path_buf()));
    }
    let records: Vec<DailyRecord> = extract_list(load_json(path)?, DAILY_METRICS_KEY, path)?;
    debug!("Loaded {} daily records from {}", records.len(), path.display());
    Ok(records)
}

/// Read usage events from a file, or from every `.json` file under a
/// directory, keeping one [`EventPage`] per file.
pub fn read_usage_event_pages(path: &Path) -> Result<Vec<EventPage>> {
    if !path.exists() {
        return Err(WrappedError::DataPathNotFound(path.to_path_buf()));
    }

    let files = if path.is_dir() {
        let files = find_json_files(path);
        if files.is_empty() {
            return Err(WrappedError::NoDataFiles(path.to_path_buf()));
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut pages = Vec::with_capacity(files.len());
    for file in files {
        let events = extract_list(load_json(&file)?, USAGE_EVENTS_KEY, &file)?;
        pages.push(EventPage { path: file, events });
    }

    debug!(
        "Loaded {} usage events from {} files",
        pages.iter().map(|p| p.events.len()).sum::<usize>(),
        pages.len()
    );
    Ok(pages)
}

/// Read usage events as one list, pages concatenated in path order.
pub fn read_usage_events(path: &Path) -> Result<Vec<UsageEvent>> {
    Ok(read_usage_event_pages(path)?
        .into_iter()
        .flat_map(|page| page.events)
        .collect())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn load_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| WrappedError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Pull the list out of either a wrapper object or a bare array.
fn extract_list<T: DeserializeOwned>(value: Value, key: &str, path: &Path) -> Result<Vec<T>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => match map.remove(key) {
            None | Some(Value::Null) => {
                warn!("{} has no \"{}\" list, treating it as empty", path.display(), key);
                Ok(Vec::new())
            }
            Some(list) => Ok(serde_json::from_value(list)?),
        },
        _ => Err(serde_json::Error::custom(format!(
            "{}: expected an object with \"{}\" or an array",
            path.display(),
            key
        ))
        .into()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
