//! Shared building blocks for usage-wrapped.
//!
//! Input schema for the dashboard exports, lenient field adapters, the
//! insertion-ordered [`ranking::Tally`], number formatting, timezone helpers,
//! CLI settings and the common error type.

pub mod de;
pub mod error;
pub mod formatting;
pub mod models;
pub mod ranking;
pub mod settings;
pub mod time_utils;

pub use error::{Result, WrappedError};
