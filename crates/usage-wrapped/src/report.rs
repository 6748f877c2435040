//! Plain-text and JSON rendering of the aggregated year in review.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use wrapped_core::formatting::{
    format_cents, format_count, format_large_number, format_large_number_with_suffix,
    format_number,
};
use wrapped_data::{DailyStats, Insights, TokenStats};

/// The review window a report covers.
#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub timezone: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    period: &'a Period,
    stats: &'a DailyStats,
    tokens: Option<&'a TokenStats>,
    insights: &'a Insights,
}

/// Render everything as one pretty-printed JSON document.
pub fn render_json(
    period: &Period,
    stats: &DailyStats,
    tokens: Option<&TokenStats>,
    insights: &Insights,
) -> anyhow::Result<String> {
    let report = JsonReport {
        period,
        stats,
        tokens,
        insights,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render the human-readable summary. `top` caps every ranked list.
pub fn render_text(
    period: &Period,
    stats: &DailyStats,
    tokens: Option<&TokenStats>,
    insights: &Insights,
    top: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Your coding year: {} to {} ({})",
        period.since, period.until, period.timezone
    );

    if !stats.has_activity() {
        let _ = writeln!(
            out,
            "\nNo activity found since {} ({} records in the window).",
            period.since, stats.records_in_window
        );
        write_tokens(&mut out, tokens, insights, top);
        return out;
    }

    section(&mut out, "Activity");
    row(
        &mut out,
        "Active days",
        format!(
            "{} of {} ({}%)",
            stats.active_days,
            insights.period_days,
            format_number(insights.activity_pct, 1)
        ),
    );
    row(&mut out, "Current streak", days(stats.streak_current));
    row(&mut out, "Longest streak", days(stats.streak_longest));
    if let Some(day) = &insights.best_weekday {
        row(&mut out, "Best weekday", day.clone());
    }

    section(&mut out, "Code");
    row(&mut out, "Lines added", format_count(stats.total_lines_added));
    row(&mut out, "Lines deleted", format_count(stats.total_lines_deleted));
    row(
        &mut out,
        "Accepted lines",
        format!(
            "{} added, {} deleted (net {})",
            format_count(stats.accepted_lines_added),
            format_count(stats.accepted_lines_deleted),
            format_number(insights.net_lines as f64, 0)
        ),
    );
    row(
        &mut out,
        "Suggestions",
        format!(
            "{} applied, {} accepted, {} rejected ({}% accepted)",
            format_count(stats.total_applies),
            format_count(stats.total_accepts),
            format_count(stats.total_rejects),
            format_number(insights.acceptance_rate, 1)
        ),
    );
    row(
        &mut out,
        "Tab completions",
        format!(
            "{} shown, {} accepted ({}%)",
            format_count(stats.total_tabs_shown),
            format_count(stats.total_tabs_accepted),
            format_number(insights.tab_acceptance_rate, 1)
        ),
    );
    row(
        &mut out,
        "Agent requests",
        format!(
            "{} ({} included in plan)",
            format_count(stats.total_agent_requests),
            format_count(stats.subscription_included_reqs)
        ),
    );

    section(&mut out, "Highlights");
    if let Some(day) = &stats.busiest_day {
        row(
            &mut out,
            "Busiest day",
            format!("{} ({} requests)", day.date, format_count(day.requests)),
        );
    }
    if let Some(day) = &stats.best_coding_day {
        row(
            &mut out,
            "Best coding day",
            format!(
                "{} ({})",
                day.date,
                format_large_number_with_suffix(day.lines, " lines")
            ),
        );
    }
    if let Some(first) = insights.ranked_models.first() {
        row(
            &mut out,
            "Favorite model",
            format!(
                "{} ({}% of requests)",
                first.name,
                format_number(insights.favorite_model_share, 1)
            ),
        );
    }

    if !insights.ranked_models.is_empty() {
        section(&mut out, "Top models");
        for (i, model) in insights.ranked_models.iter().take(top).enumerate() {
            let _ = writeln!(
                out,
                "  {}. {:<28} {:>10}  {}%",
                i + 1,
                model.name,
                format_count(model.requests),
                format_number(model.share, 1)
            );
        }
    }

    ranked_counts(&mut out, "Top extensions", &stats.extension_usage.ranked(), top);
    ranked_counts(
        &mut out,
        "Top tab extensions",
        &stats.tab_extension_usage.ranked(),
        top,
    );

    if !insights.ranked_months.is_empty() {
        section(&mut out, "Top months");
        for (i, month) in insights.ranked_months.iter().take(top).enumerate() {
            let _ = writeln!(
                out,
                "  {}. {}  {:>10} lines  {:>4} active days",
                i + 1,
                month.month,
                format_count(month.lines_added),
                month.active_days
            );
        }
    }

    write_tokens(&mut out, tokens, insights, top);
    out
}

fn write_tokens(out: &mut String, tokens: Option<&TokenStats>, insights: &Insights, top: usize) {
    let (Some(stats), Some(summary)) = (tokens, insights.tokens.as_ref()) else {
        return;
    };

    section(out, "Tokens");
    row(
        out,
        "Total",
        format_large_number_with_suffix(summary.total_tokens, " tokens"),
    );
    row(
        out,
        "Input / output",
        format!(
            "{} / {}",
            format_large_number(stats.total_input_tokens),
            format_large_number(stats.total_output_tokens)
        ),
    );
    row(
        out,
        "Cache",
        format!(
            "{} read, {} written ({}% hit rate)",
            format_large_number(stats.total_cache_read),
            format_large_number(stats.total_cache_write),
            format_number(summary.cache_hit_rate, 1)
        ),
    );
    row(
        out,
        "Cost",
        format!(
            "{} over {} requests",
            format_cents(stats.total_cost_cents),
            format_count(stats.event_count)
        ),
    );
    for cost in summary.top_model_costs.iter().take(top) {
        let _ = writeln!(out, "    {:<28} {:>12}", cost.model, format_cents(cost.cents));
    }
}

fn ranked_counts(out: &mut String, title: &str, ranked: &[(&str, u64)], top: usize) {
    if ranked.is_empty() {
        return;
    }
    section(out, title);
    for (i, (name, count)) in ranked.iter().take(top).enumerate() {
        let _ = writeln!(out, "  {}. {:<28} {:>10}", i + 1, name, format_count(*count));
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
}

fn row(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "  {:<18} {}", label, value);
}

fn days(n: u64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}
