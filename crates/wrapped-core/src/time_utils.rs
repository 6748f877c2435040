use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{Result, WrappedError};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Parse an IANA timezone name. `"auto"` resolves to the system timezone.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    let resolved = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    resolved
        .parse::<Tz>()
        .map_err(|_| WrappedError::InvalidTimezone(resolved))
}

// ── Calendar helpers ──────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| WrappedError::InvalidDate(s.to_string()))
}

/// The first instant of `date` in `tz`.
///
/// When local midnight does not exist (a DST spring-forward at 00:00) the
/// earliest valid instant of that day is used instead.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::default());
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt;
    }

    // Gaps are at most a couple of hours; probe forward in 30 minute steps.
    for step in 1..=8 {
        let probe = midnight + chrono::Duration::minutes(30 * step);
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt;
        }
    }

    warn!(
        "no valid local time at the start of {} in {}, using UTC midnight",
        date, tz
    );
    tz.from_utc_datetime(&midnight)
}

/// Number of calendar days from `start` to `end`, both inclusive.
///
/// Returns 0 when `end` is before `start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> u64 {
    let days = (end - start).num_days();
    if days < 0 {
        0
    } else {
        days as u64 + 1
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
