//! Presentation-ready figures derived from aggregated stats.

use serde::Serialize;

use wrapped_core::formatting::percentage;

use crate::daily::DailyStats;
use crate::tokens::TokenStats;

/// Weekday names in walk order for [`Insights::best_weekday`].
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// How many models the cost breakdown lists.
pub const TOP_COST_MODELS: usize = 4;

const RATE_PLACES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedModel {
    pub name: String,
    pub requests: u64,
    /// Share of all model requests, in percent.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedMonth {
    /// `YYYY-MM`
    pub month: String,
    pub lines_added: u64,
    pub accepted_lines: u64,
    pub agent_requests: u64,
    pub active_days: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCost {
    pub model: String,
    pub cents: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInsights {
    pub total_tokens: u64,
    pub cache_hit_rate: f64,
    pub cost_dollars: f64,
    pub top_model_costs: Vec<ModelCost>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub acceptance_rate: f64,
    pub tab_acceptance_rate: f64,
    pub net_lines: i64,
    pub best_weekday: Option<String>,
    pub ranked_models: Vec<RankedModel>,
    pub favorite_model_share: f64,
    pub ranked_months: Vec<RankedMonth>,
    pub period_days: u64,
    pub activity_pct: f64,
    pub tokens: Option<TokenInsights>,
}

impl Insights {
    /// Derive rates and rankings. `period_days` is the length of the review
    /// window and only feeds `activity_pct`.
    pub fn derive(stats: &DailyStats, tokens: Option<&TokenStats>, period_days: u64) -> Self {
        let model_total = stats.model_usage.total() as f64;
        let ranked_models: Vec<RankedModel> = stats
            .model_usage
            .ranked()
            .into_iter()
            .map(|(name, requests)| RankedModel {
                name: name.to_string(),
                requests,
                share: percentage(requests as f64, model_total, RATE_PLACES),
            })
            .collect();
        let favorite_model_share = ranked_models.first().map_or(0.0, |m| m.share);

        let ranked_months = stats
            .monthly_stats
            .rank_by(|m| m.lines_added)
            .into_iter()
            .filter(|(_, m)| m.lines_added > 0)
            .map(|(month, m)| RankedMonth {
                month: month.to_string(),
                lines_added: m.lines_added,
                accepted_lines: m.accepted_lines,
                agent_requests: m.agent_requests,
                active_days: m.active_days,
            })
            .collect();

        Self {
            acceptance_rate: rate(stats.total_accepts, stats.total_applies),
            tab_acceptance_rate: rate(stats.total_tabs_accepted, stats.total_tabs_shown),
            net_lines: signed(stats.accepted_lines_added)
                .saturating_sub(signed(stats.accepted_lines_deleted)),
            best_weekday: best_weekday(stats),
            ranked_models,
            favorite_model_share,
            ranked_months,
            period_days,
            activity_pct: rate(stats.active_days, period_days),
            tokens: tokens.map(TokenInsights::from_stats),
        }
    }
}

impl TokenInsights {
    fn from_stats(stats: &TokenStats) -> Self {
        let cache_total = stats.total_cache_read.saturating_add(stats.total_cache_write);
        Self {
            total_tokens: stats.total_tokens(),
            cache_hit_rate: rate(stats.total_cache_read, cache_total),
            cost_dollars: stats.total_cost_cents / 100.0,
            top_model_costs: stats
                .model_costs
                .ranked()
                .into_iter()
                .take(TOP_COST_MODELS)
                .map(|(model, cents)| ModelCost {
                    model: model.to_string(),
                    cents,
                })
                .collect(),
        }
    }
}

/// The weekday with the most lines added. Ties go to the earlier weekday
/// (Monday first); a week with no lines at all has no best day.
fn best_weekday(stats: &DailyStats) -> Option<String> {
    let mut best: Option<&str> = None;
    let mut best_lines = 0;
    for day in WEEKDAYS {
        let lines = stats.weekday_stats.get(day).map_or(0, |w| w.lines);
        if lines > best_lines {
            best_lines = lines;
            best = Some(day);
        }
    }
    best.map(str::to_string)
}

fn rate(part: u64, whole: u64) -> f64 {
    percentage(part as f64, whole as f64, RATE_PLACES)
}

fn signed(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::{MonthlyStats, WeekdayStats};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_stats() {
        let insights = Insights::derive(&DailyStats::default(), None, 0);

        assert_eq!(insights.acceptance_rate, 0.0);
        assert_eq!(insights.tab_acceptance_rate, 0.0);
        assert_eq!(insights.net_lines, 0);
        assert!(insights.best_weekday.is_none());
        assert!(insights.ranked_models.is_empty());
        assert_eq!(insights.favorite_model_share, 0.0);
        assert!(insights.ranked_months.is_empty());
        assert_eq!(insights.activity_pct, 0.0);
        assert!(insights.tokens.is_none());
    }

    #[test]
    fn test_rates() {
        let stats = DailyStats {
            total_applies: 8,
            total_accepts: 6,
            total_tabs_shown: 3,
            total_tabs_accepted: 1,
            active_days: 50,
            ..Default::default()
        };
        let insights = Insights::derive(&stats, None, 200);

        assert!(approx(insights.acceptance_rate, 75.0));
        assert!(approx(insights.tab_acceptance_rate, 33.3));
        assert!(approx(insights.activity_pct, 25.0));
        assert_eq!(insights.period_days, 200);
    }

    #[test]
    fn test_net_lines_can_be_negative() {
        let stats = DailyStats {
            accepted_lines_added: 10,
            accepted_lines_deleted: 35,
            ..Default::default()
        };
        assert_eq!(Insights::derive(&stats, None, 1).net_lines, -25);
    }

    #[test]
    fn test_best_weekday_ties_go_to_monday_side() {
        let mut stats = DailyStats::default();
        for (day, lines) in [("Sunday", 90), ("Wednesday", 90), ("Monday", 10)] {
            *stats.weekday_stats.entry(day) = WeekdayStats {
                lines,
                requests: 0,
                count: 1,
            };
        }
        let insights = Insights::derive(&stats, None, 7);

        assert_eq!(insights.best_weekday.as_deref(), Some("Wednesday"));
    }

    #[test]
    fn test_best_weekday_none_when_no_lines() {
        let mut stats = DailyStats::default();
        stats.weekday_stats.entry("Friday").requests = 12;

        assert!(Insights::derive(&stats, None, 7).best_weekday.is_none());
    }

    #[test]
    fn test_ranked_models_share() {
        let mut stats = DailyStats::default();
        stats.model_usage.add("a", 1);
        stats.model_usage.add("b", 3);
        stats.model_usage.add("c", 1);
        let insights = Insights::derive(&stats, None, 1);

        let names: Vec<&str> = insights
            .ranked_models
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(approx(insights.favorite_model_share, 60.0));
        assert!(approx(insights.ranked_models[1].share, 20.0));
    }

    #[test]
    fn test_ranked_months_skip_empty_and_keep_ties_stable() {
        let mut stats = DailyStats::default();
        for (month, lines) in [("2025-06", 40), ("2025-07", 0), ("2025-08", 90), ("2025-09", 40)] {
            *stats.monthly_stats.entry(month) = MonthlyStats {
                lines_added: lines,
                active_days: 1,
                ..Default::default()
            };
        }
        let insights = Insights::derive(&stats, None, 1);

        let months: Vec<&str> = insights
            .ranked_months
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        assert_eq!(months, vec!["2025-08", "2025-06", "2025-09"]);
    }

    #[test]
    fn test_token_insights() {
        let mut tokens = TokenStats {
            total_input_tokens: 1_500,
            total_output_tokens: 500,
            total_cache_write: 1_000,
            total_cache_read: 3_000,
            total_cost_cents: 1_234.0,
            ..Default::default()
        };
        for (model, cents) in [("a", 1.0), ("b", 5.0), ("c", 5.0), ("d", 2.0), ("e", 9.0)] {
            tokens.model_costs.add(model, cents);
        }
        let insights = Insights::derive(&DailyStats::default(), Some(&tokens), 1);
        let token_insights = insights.tokens.unwrap();

        assert_eq!(token_insights.total_tokens, 2_000);
        assert!(approx(token_insights.cache_hit_rate, 75.0));
        assert!(approx(token_insights.cost_dollars, 12.34));
        let models: Vec<&str> = token_insights
            .top_model_costs
            .iter()
            .map(|m| m.model.as_str())
            .collect();
        assert_eq!(models, vec!["e", "b", "c", "d"]);
    }

    #[test]
    fn test_cache_hit_rate_without_cache_traffic() {
        let tokens = TokenStats::default();
        let insights = Insights::derive(&DailyStats::default(), Some(&tokens), 1);

        assert_eq!(insights.tokens.unwrap().cache_hit_rate, 0.0);
    }
}
