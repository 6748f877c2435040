//! Aggregation engine for usage-wrapped.
//!
//! Two independent, pure aggregators ([`aggregate_daily_metrics`] and
//! [`aggregate_token_usage`]), the [`insights::Insights`] derived from their
//! output, and the readers that load dashboard exports from disk.

pub mod daily;
pub mod insights;
pub mod reader;
pub mod tokens;

pub use daily::{aggregate_daily_metrics, DailyStats};
pub use insights::Insights;
pub use tokens::{aggregate_token_usage, TokenStats};
