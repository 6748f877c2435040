//! Daily-metrics aggregation.
//!
//! Turns the per-day analytics series into flat totals, name breakdowns,
//! month and weekday rollups, activity streaks and "best day" superlatives.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use wrapped_core::models::DailyRecord;
use wrapped_core::ranking::Tally;

// ── Rollups ───────────────────────────────────────────────────────────────────

/// Activity summed over the active days of one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyStats {
    pub lines_added: u64,
    pub accepted_lines: u64,
    pub agent_requests: u64,
    pub active_days: u64,
    pub tabs_shown: u64,
    pub tabs_accepted: u64,
}

/// Activity summed over the active days falling on one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekdayStats {
    pub lines: u64,
    pub requests: u64,
    pub count: u64,
}

// ── Superlatives ──────────────────────────────────────────────────────────────

/// The active day with the most agent requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusiestDay {
    /// Display date, e.g. `"June 03, 2025"`.
    pub date: String,
    pub requests: u64,
    pub lines: u64,
}

/// The active day with the most lines added, with a display date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodingDay {
    pub date: String,
    pub lines: u64,
    pub accepted: u64,
}

/// Same selection as [`CodingDay`], carrying the full local timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductiveDay {
    pub date: DateTime<FixedOffset>,
    pub lines: u64,
    pub accepted: u64,
}

/// One entry of the per-active-day series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// The upstream timestamp, unchanged.
    pub date_ms: i64,
    /// Local calendar date.
    pub date: NaiveDate,
    pub lines_added: u64,
    pub accepted_lines: u64,
    pub agent_requests: u64,
}

// ── DailyStats ────────────────────────────────────────────────────────────────

/// Everything derived from one pass over the daily analytics series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyStats {
    pub total_lines_added: u64,
    pub total_lines_deleted: u64,
    pub accepted_lines_added: u64,
    pub accepted_lines_deleted: u64,
    pub total_applies: u64,
    pub total_accepts: u64,
    pub total_rejects: u64,
    pub total_tabs_shown: u64,
    pub total_tabs_accepted: u64,
    pub total_agent_requests: u64,
    pub subscription_included_reqs: u64,
    pub active_days: u64,

    pub model_usage: Tally<u64>,
    pub extension_usage: Tally<u64>,
    pub tab_extension_usage: Tally<u64>,
    pub client_versions: Tally<u64>,
    /// Keyed by `YYYY-MM`.
    pub monthly_stats: Tally<MonthlyStats>,
    /// Keyed by full weekday name, e.g. `Monday`.
    pub weekday_stats: Tally<WeekdayStats>,

    pub busiest_day: Option<BusiestDay>,
    pub best_coding_day: Option<CodingDay>,
    pub most_productive_day: Option<ProductiveDay>,

    pub streak_current: u64,
    pub streak_longest: u64,

    /// Active days in ascending date order.
    pub daily_data: Vec<DaySummary>,

    /// Records on or after the cutoff, active or not.
    pub records_in_window: u64,
}

impl DailyStats {
    /// `false` when no record in the window showed any activity.
    pub fn has_activity(&self) -> bool {
        self.active_days > 0
    }

    fn add_totals(&mut self, record: &DailyRecord) {
        bump(&mut self.total_lines_added, record.lines_added);
        bump(&mut self.total_lines_deleted, record.lines_deleted);
        bump(&mut self.accepted_lines_added, record.accepted_lines_added);
        bump(&mut self.accepted_lines_deleted, record.accepted_lines_deleted);
        bump(&mut self.total_applies, record.total_applies);
        bump(&mut self.total_accepts, record.total_accepts);
        bump(&mut self.total_rejects, record.total_rejects);
        bump(&mut self.total_tabs_shown, record.total_tabs_shown);
        bump(&mut self.total_tabs_accepted, record.total_tabs_accepted);
        bump(&mut self.total_agent_requests, record.agent_requests);
        bump(
            &mut self.subscription_included_reqs,
            record.subscription_included_reqs,
        );
    }

    fn add_breakdowns(&mut self, record: &DailyRecord) {
        for usage in &record.model_usage {
            self.model_usage.add(usage.name_or_unknown(), usage.count);
        }
        for usage in &record.extension_usage {
            if let Some(name) = usage.non_empty_name() {
                self.extension_usage.add(name, usage.count);
            }
        }
        for usage in &record.tab_extension_usage {
            if let Some(name) = usage.non_empty_name() {
                self.tab_extension_usage.add(name, usage.count);
            }
        }
        for usage in &record.client_version_usage {
            self.client_versions.add(usage.name_or_unknown(), usage.count);
        }
    }

    fn add_rollups(&mut self, record: &DailyRecord, date: NaiveDate) {
        let month = self.monthly_stats.entry(&date.format("%Y-%m").to_string());
        bump(&mut month.lines_added, record.lines_added);
        bump(&mut month.accepted_lines, record.accepted_lines_added);
        bump(&mut month.agent_requests, record.agent_requests);
        bump(&mut month.active_days, 1);
        bump(&mut month.tabs_shown, record.total_tabs_shown);
        bump(&mut month.tabs_accepted, record.total_tabs_accepted);

        let weekday = self.weekday_stats.entry(&date.format("%A").to_string());
        bump(&mut weekday.lines, record.lines_added);
        bump(&mut weekday.requests, record.agent_requests);
        bump(&mut weekday.count, 1);
    }

    /// Strict `>` comparisons: on ties the earliest day is kept.
    fn track_superlatives(&mut self, record: &DailyRecord, local: &DateTime<Tz>) {
        let display = local.date_naive().format("%B %d, %Y").to_string();

        if self
            .busiest_day
            .as_ref()
            .map_or(true, |b| record.agent_requests > b.requests)
        {
            self.busiest_day = Some(BusiestDay {
                date: display.clone(),
                requests: record.agent_requests,
                lines: record.lines_added,
            });
        }

        if self
            .best_coding_day
            .as_ref()
            .map_or(true, |b| record.lines_added > b.lines)
        {
            self.best_coding_day = Some(CodingDay {
                date: display,
                lines: record.lines_added,
                accepted: record.accepted_lines_added,
            });
        }

        if self
            .most_productive_day
            .as_ref()
            .map_or(true, |b| record.lines_added > b.lines)
        {
            self.most_productive_day = Some(ProductiveDay {
                date: local.with_timezone(&local.offset().fix()),
                lines: record.lines_added,
                accepted: record.accepted_lines_added,
            });
        }
    }
}

fn bump(slot: &mut u64, amount: u64) {
    *slot = slot.saturating_add(amount);
}

// ── Streaks ───────────────────────────────────────────────────────────────────

/// Consecutive-day run tracking. Dates must be observed in ascending order.
#[derive(Debug, Default)]
struct StreakTracker {
    current: u64,
    longest: u64,
    last_active: Option<NaiveDate>,
}

impl StreakTracker {
    fn observe(&mut self, date: NaiveDate) {
        self.current = match self.last_active {
            Some(prev) if date.pred_opt() == Some(prev) => self.current + 1,
            _ => 1,
        };
        self.longest = self.longest.max(self.current);
        self.last_active = Some(date);
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Aggregate `records` dated on or after `cutoff`.
///
/// Records may arrive in any order. Timestamps are mapped to calendar dates
/// in the cutoff's timezone, and the surviving records are walked in
/// ascending date order (stable for equal timestamps), which streaks and
/// first-wins superlatives rely on.
pub fn aggregate_daily_metrics(records: &[DailyRecord], cutoff: DateTime<Tz>) -> DailyStats {
    let tz = cutoff.timezone();

    let mut in_window: Vec<(&DailyRecord, DateTime<Tz>)> = records
        .iter()
        .map(|r| (r, r.timestamp_in(&tz)))
        .filter(|(_, local)| *local >= cutoff)
        .collect();
    in_window.sort_by_key(|(r, _)| r.date);

    let mut stats = DailyStats {
        daily_data: Vec::with_capacity(in_window.len()),
        records_in_window: in_window.len() as u64,
        weekday_stats: Tally::with_capacity(7),
        ..Default::default()
    };
    let mut streak = StreakTracker::default();

    for (record, local) in &in_window {
        let date = local.date_naive();

        if record.is_active() {
            stats.active_days += 1;
            streak.observe(date);
            stats.add_rollups(record, date);
            stats.track_superlatives(record, local);
            stats.daily_data.push(DaySummary {
                date_ms: record.date,
                date,
                lines_added: record.lines_added,
                accepted_lines: record.accepted_lines_added,
                agent_requests: record.agent_requests,
            });
        }

        stats.add_totals(record);
        stats.add_breakdowns(record);
    }

    stats.streak_current = streak.current;
    stats.streak_longest = streak.longest;

    debug!(
        "daily metrics: {} records, {} on or after {}, {} active, longest streak {}",
        records.len(),
        stats.records_in_window,
        cutoff.date_naive(),
        stats.active_days,
        stats.streak_longest
    );

    stats
}

// ── Tests ─────────────────────────────────────────────────────────────────────
