//! Token and cost aggregation over per-request usage events.

use serde::Serialize;
use tracing::debug;

use wrapped_core::models::UsageEvent;
use wrapped_core::ranking::Tally;

/// Upstream token figures are reported in thousands.
pub const TOKEN_SCALE: f64 = 1000.0;

/// Input and output tokens attributed to one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelTokens {
    pub input: u64,
    pub output: u64,
}

/// Token and cost totals over a set of usage events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_write: u64,
    pub total_cache_read: u64,
    pub total_cost_cents: f64,
    pub model_costs: Tally<f64>,
    pub model_tokens: Tally<ModelTokens>,
    pub event_count: u64,
}

impl TokenStats {
    fn add_event(&mut self, event: &UsageEvent) {
        let usage = &event.token_usage;
        let input = scale_tokens(usage.input_tokens);
        let output = scale_tokens(usage.output_tokens);
        let cents = usage.total_cents.max(0.0);

        self.total_input_tokens = self.total_input_tokens.saturating_add(input);
        self.total_output_tokens = self.total_output_tokens.saturating_add(output);
        self.total_cache_write = self
            .total_cache_write
            .saturating_add(scale_tokens(usage.cache_write_tokens));
        self.total_cache_read = self
            .total_cache_read
            .saturating_add(scale_tokens(usage.cache_read_tokens));
        self.total_cost_cents += cents;
        self.event_count += 1;

        let model = event.model_name();
        self.model_costs.add(model, cents);
        let tokens = self.model_tokens.entry(model);
        tokens.input = tokens.input.saturating_add(input);
        tokens.output = tokens.output.saturating_add(output);
    }

    /// Input plus output tokens.
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens
            .saturating_add(self.total_output_tokens)
    }

    /// Fold `other` into `self`. Models only present in `other` are appended
    /// after the ones already seen.
    pub fn merge(mut self, other: TokenStats) -> TokenStats {
        self.total_input_tokens = self
            .total_input_tokens
            .saturating_add(other.total_input_tokens);
        self.total_output_tokens = self
            .total_output_tokens
            .saturating_add(other.total_output_tokens);
        self.total_cache_write = self
            .total_cache_write
            .saturating_add(other.total_cache_write);
        self.total_cache_read = self.total_cache_read.saturating_add(other.total_cache_read);
        self.total_cost_cents += other.total_cost_cents;
        self.event_count += other.event_count;

        for (model, cents) in other.model_costs.iter() {
            self.model_costs.add(model, *cents);
        }
        for (model, tokens) in other.model_tokens.iter() {
            let slot = self.model_tokens.entry(model);
            slot.input = slot.input.saturating_add(tokens.input);
            slot.output = slot.output.saturating_add(tokens.output);
        }
        self
    }
}

/// Thousands → tokens, rounded. Negative and non-finite inputs count as 0.
fn scale_tokens(thousands: f64) -> u64 {
    let scaled = (thousands * TOKEN_SCALE).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

/// Sum tokens and cost over `events`, grouped by model.
///
/// Returns `None` when `events` is empty.
pub fn aggregate_token_usage(events: &[UsageEvent]) -> Option<TokenStats> {
    if events.is_empty() {
        return None;
    }

    let mut stats = TokenStats::default();
    for event in events {
        stats.add_event(event);
    }

    debug!(
        "token usage: {} events, {} models, {} tokens",
        stats.event_count,
        stats.model_tokens.len(),
        stats.total_tokens()
    );
    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrapped_core::models::TokenUsage;

    fn event(model: Option<&str>, input: f64, output: f64, cents: f64) -> UsageEvent {
        UsageEvent {
            model: model.map(str::to_string),
            token_usage: TokenUsage {
                input_tokens: input,
                output_tokens: output,
                total_cents: cents,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_empty_events_yield_none() {
        assert!(aggregate_token_usage(&[]).is_none());
    }

    #[test]
    fn test_single_event_scaled_to_tokens() {
        let stats = aggregate_token_usage(&[event(Some("m"), 2.0, 1.0, 50.0)]).unwrap();

        assert_eq!(stats.total_input_tokens, 2000);
        assert_eq!(stats.total_output_tokens, 1000);
        assert_eq!(stats.total_cost_cents, 50.0);
        assert_eq!(stats.model_costs.get("m"), Some(&50.0));
        assert_eq!(
            stats.model_tokens.get("m"),
            Some(&ModelTokens {
                input: 2000,
                output: 1000
            })
        );
        assert_eq!(stats.event_count, 1);
    }

    #[test]
    fn test_fractional_thousands_round() {
        let stats = aggregate_token_usage(&[event(Some("m"), 1.2346, 0.0004, 0.0)]).unwrap();

        assert_eq!(stats.total_input_tokens, 1235);
        assert_eq!(stats.total_output_tokens, 0);
    }

    #[test]
    fn test_cache_tokens() {
        let mut e = event(Some("m"), 0.0, 0.0, 0.0);
        e.token_usage.cache_write_tokens = 3.0;
        e.token_usage.cache_read_tokens = 9.5;
        let stats = aggregate_token_usage(&[e]).unwrap();

        assert_eq!(stats.total_cache_write, 3000);
        assert_eq!(stats.total_cache_read, 9500);
        assert_eq!(stats.total_tokens(), 0);
    }

    #[test]
    fn test_missing_model_is_unknown() {
        let events = vec![
            event(None, 1.0, 0.0, 5.0),
            event(Some(""), 1.0, 0.0, 5.0),
            event(Some("gpt-5"), 1.0, 0.0, 1.0),
        ];
        let stats = aggregate_token_usage(&events).unwrap();

        assert_eq!(stats.model_costs.get("unknown"), Some(&10.0));
        assert_eq!(stats.model_tokens.get("unknown").unwrap().input, 2000);
        assert_eq!(stats.model_costs.len(), 2);
    }

    #[test]
    fn test_negative_values_clamped() {
        let stats = aggregate_token_usage(&[event(Some("m"), -4.0, 2.0, -30.0)]).unwrap();

        assert_eq!(stats.total_input_tokens, 0);
        assert_eq!(stats.total_output_tokens, 2000);
        assert_eq!(stats.total_cost_cents, 0.0);
        assert_eq!(stats.event_count, 1);
    }

    #[test]
    fn test_model_order_follows_first_sighting() {
        let events = vec![
            event(Some("b"), 1.0, 0.0, 1.0),
            event(Some("a"), 1.0, 0.0, 1.0),
            event(Some("b"), 1.0, 0.0, 1.0),
        ];
        let stats = aggregate_token_usage(&events).unwrap();

        let models: Vec<&str> = stats.model_costs.keys().collect();
        assert_eq!(models, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let first = vec![event(Some("a"), 1.0, 2.0, 10.0), event(Some("b"), 3.0, 0.0, 5.0)];
        let second = vec![event(Some("c"), 0.5, 0.5, 2.0), event(Some("a"), 1.0, 1.0, 4.0)];
        let all: Vec<UsageEvent> = first.iter().chain(second.iter()).cloned().collect();

        let merged = aggregate_token_usage(&first)
            .unwrap()
            .merge(aggregate_token_usage(&second).unwrap());
        let single = aggregate_token_usage(&all).unwrap();

        assert_eq!(merged, single);
        assert_eq!(merged.event_count, 4);
        assert_eq!(merged.model_costs.get("a"), Some(&14.0));
    }

    #[test]
    fn test_merge_with_default_is_identity() {
        let stats = aggregate_token_usage(&[event(Some("a"), 1.0, 1.0, 1.0)]).unwrap();
        assert_eq!(stats.clone().merge(TokenStats::default()), stats);
    }
}
