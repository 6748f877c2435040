mod bootstrap;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use wrapped_core::settings::Settings;
use wrapped_core::time_utils::{days_inclusive, start_of_day};
use wrapped_data::reader::{read_daily_records, read_usage_event_pages};
use wrapped_data::{aggregate_daily_metrics, aggregate_token_usage, Insights, TokenStats};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("usage-wrapped v{} starting", env!("CARGO_PKG_VERSION"));

    let tz = settings.tz()?;
    let since = settings.since_date()?;
    let until = settings.until_date(Utc::now().with_timezone(&tz).date_naive())?;
    let cutoff = start_of_day(since, &tz);
    tracing::info!("Review window {} to {} in {}", since, until, tz);

    let metrics_path = settings.metrics_path()?;
    let records = read_daily_records(metrics_path)
        .with_context(|| format!("loading analytics export {}", metrics_path.display()))?;
    let stats = aggregate_daily_metrics(&records, cutoff);

    // Pages are aggregated one by one and merged.
    let tokens = match &settings.events {
        Some(path) => read_usage_event_pages(path)
            .with_context(|| format!("loading usage events from {}", path.display()))?
            .iter()
            .filter_map(|page| aggregate_token_usage(&page.events))
            .reduce(TokenStats::merge),
        None => None,
    };

    if !stats.has_activity() {
        tracing::warn!(
            "No active days since {} ({} records in the window)",
            since,
            stats.records_in_window
        );
    }

    let insights = Insights::derive(&stats, tokens.as_ref(), days_inclusive(since, until));
    let period = report::Period {
        since,
        until,
        timezone: tz.name().to_string(),
    };

    let output = if settings.json_output() {
        report::render_json(&period, &stats, tokens.as_ref(), &insights)?
    } else {
        report::render_text(
            &period,
            &stats,
            tokens.as_ref(),
            &insights,
            settings.top as usize,
        )
    };
    println!("{output}");

    Ok(())
}
