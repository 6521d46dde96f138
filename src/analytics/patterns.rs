//! Pattern reports built on top of [`group_and_aggregate`].

use serde::Serialize;

use super::aggregate::{group_and_aggregate, GroupSummary};
use crate::database::models::{AnalyticsRow, ClosedTrade};

pub const INSUFFICIENT_DATA: &str = "Not enough data for analysis.";

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Name for a `day_of_week` index, 0 = Sunday
pub fn day_name(day: i32) -> Option<&'static str> {
    usize::try_from(day).ok().and_then(|d| DAY_NAMES.get(d)).copied()
}

fn mindset_key(row: &AnalyticsRow) -> Option<String> {
    row.mindset_rating.map(|m| m.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyPnl {
    pub strategy: String,
    pub pnl: f64,
}

/// Cumulative PnL per strategy, best first. Trades without a strategy are
/// left out.
pub fn strategy_performance(trades: &[ClosedTrade]) -> Vec<StrategyPnl> {
    group_and_aggregate(trades, |t| t.strategy.as_deref(), ClosedTrade::pnl)
        .ranked_by_sum()
        .into_iter()
        .map(|g| StrategyPnl { strategy: g.key, pnl: g.pnl })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPnl {
    pub day: i32,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingPnl {
    pub rating: i32,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePatterns {
    pub by_day_of_week: Vec<DayPnl>,
    pub by_mindset: Vec<RatingPnl>,
}

/// PnL by weekday (always all seven days) and by mindset rating
pub fn performance_patterns(rows: &[AnalyticsRow]) -> PerformancePatterns {
    let by_day = group_and_aggregate(
        rows,
        |r| match r.day_of_week {
            Some(day) if day_name(day).is_some() => Some(day.to_string()),
            Some(day) => {
                tracing::warn!("Ignoring analytics row with day_of_week {}", day);
                None
            }
            None => None,
        },
        |r| r.pnl,
    );
    let by_day_of_week = (0..7)
        .map(|day| DayPnl {
            day,
            pnl: by_day.get(&day.to_string()).map(|s| s.sum).unwrap_or(0.0),
        })
        .collect();

    let by_rating = group_and_aggregate(rows, mindset_key, |r| r.pnl);
    let mut by_mindset: Vec<RatingPnl> = by_rating
        .iter()
        .filter_map(|(key, stats)| {
            let rating = key.parse().ok()?;
            Some(RatingPnl { rating, pnl: stats.sum })
        })
        .collect();
    by_mindset.sort_by_key(|r| r.rating);

    PerformancePatterns { by_day_of_week, by_mindset }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalImpact {
    pub by_mindset: Vec<GroupSummary>,
    pub by_emotion_tag: Vec<GroupSummary>,
}

/// Effect of mindset rating and emotion tags on results. A trade tagged with
/// several emotions counts fully toward each of them.
pub fn psychological_impact(rows: &[AnalyticsRow]) -> PsychologicalImpact {
    let mut by_mindset = group_and_aggregate(rows, mindset_key, |r| r.pnl).summaries();
    by_mindset.sort_by(|a, b| a.key.cmp(&b.key));

    let by_emotion_tag =
        group_and_aggregate(rows, |r| r.emotion_tags.iter().flatten(), |r| r.pnl).ranked_by_sum();

    PsychologicalImpact { by_mindset, by_emotion_tag }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningPatterns {
    pub best_strategy: Option<GroupSummary>,
    pub best_day: Option<GroupSummary>,
    pub best_session: Option<GroupSummary>,
}

/// Highest-PnL strategy, weekday and session
pub fn winning_patterns(rows: &[AnalyticsRow]) -> WinningPatterns {
    WinningPatterns {
        best_strategy: group_and_aggregate(rows, |r| r.strategy.as_deref(), |r| r.pnl)
            .best_by_sum(),
        best_day: group_and_aggregate(rows, |r| r.day_of_week.and_then(day_name), |r| r.pnl)
            .best_by_sum(),
        best_session: group_and_aggregate(rows, |r| r.trading_session.as_deref(), |r| r.pnl)
            .best_by_sum(),
    }
}

/// Report body, or a notice when the user has no analytics yet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report<T> {
    Ready(T),
    Insufficient { message: &'static str },
}

impl<T> Report<T> {
    pub fn from_rows(rows: &[AnalyticsRow], build: impl FnOnce(&[AnalyticsRow]) -> T) -> Self {
        if rows.is_empty() {
            Report::Insufficient { message: INSUFFICIENT_DATA }
        } else {
            Report::Ready(build(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn analytics(pnl: f64) -> AnalyticsRow {
        AnalyticsRow { pnl, ..Default::default() }
    }

    fn trade(strategy: Option<&str>, entry: f64, exit: f64) -> ClosedTrade {
        ClosedTrade {
            symbol: "BTC/USDT".into(),
            strategy: strategy.map(String::from),
            direction: "Long".into(),
            entry_price: entry,
            exit_price: exit,
            quantity: 1.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn strategy_performance_is_sorted_and_skips_missing_strategy() {
        let trades = vec![
            trade(Some("breakout"), 100.0, 90.0),
            trade(Some("scalp"), 100.0, 105.0),
            trade(None, 100.0, 500.0),
            trade(Some("scalp"), 100.0, 102.0),
        ];
        let result = strategy_performance(&trades);
        assert_eq!(
            result,
            vec![
                StrategyPnl { strategy: "scalp".into(), pnl: 7.0 },
                StrategyPnl { strategy: "breakout".into(), pnl: -10.0 },
            ]
        );
    }

    #[test]
    fn performance_patterns_fill_every_weekday() {
        let rows = vec![
            AnalyticsRow { day_of_week: Some(1), mindset_rating: Some(4), ..analytics(10.0) },
            AnalyticsRow { day_of_week: Some(1), mindset_rating: Some(2), ..analytics(-3.0) },
            AnalyticsRow { day_of_week: Some(5), ..analytics(2.5) },
            AnalyticsRow { day_of_week: Some(9), mindset_rating: Some(4), ..analytics(1.0) },
        ];
        let report = performance_patterns(&rows);

        assert_eq!(report.by_day_of_week.len(), 7);
        assert_eq!(report.by_day_of_week[0], DayPnl { day: 0, pnl: 0.0 });
        assert_eq!(report.by_day_of_week[1], DayPnl { day: 1, pnl: 7.0 });
        assert_eq!(report.by_day_of_week[5], DayPnl { day: 5, pnl: 2.5 });

        assert_eq!(
            report.by_mindset,
            vec![RatingPnl { rating: 2, pnl: -3.0 }, RatingPnl { rating: 4, pnl: 11.0 }]
        );
    }

    #[test]
    fn psychological_impact_groups_tags_and_ratings() {
        let rows = vec![
            AnalyticsRow {
                mindset_rating: Some(3),
                emotion_tags: Some(vec!["fomo".into(), "greed".into()]),
                ..analytics(-8.0)
            },
            AnalyticsRow {
                mindset_rating: Some(10),
                emotion_tags: Some(vec!["calm".into()]),
                ..analytics(12.0)
            },
            AnalyticsRow { mindset_rating: Some(3), ..analytics(4.0) },
        ];
        let report = psychological_impact(&rows);

        // lexical order: "10" < "3"
        let mindset_keys: Vec<&str> = report.by_mindset.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(mindset_keys, vec!["10", "3"]);
        assert_eq!(report.by_mindset[1].pnl, -4.0);
        assert_eq!(report.by_mindset[1].average_pnl, -2.0);
        assert_eq!(report.by_mindset[1].trade_count, 2);

        let tags: Vec<&str> = report.by_emotion_tag.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(tags, vec!["calm", "fomo", "greed"]);
        assert_eq!(report.by_emotion_tag[1].pnl, -8.0);
        assert_eq!(report.by_emotion_tag[2].pnl, -8.0);
    }

    #[test]
    fn winning_patterns_pick_highest_groups() {
        let rows = vec![
            AnalyticsRow {
                strategy: Some("trend".into()),
                day_of_week: Some(2),
                trading_session: Some("London".into()),
                ..analytics(5.0)
            },
            AnalyticsRow {
                strategy: Some("reversal".into()),
                day_of_week: Some(4),
                trading_session: Some("NewYork".into()),
                ..analytics(9.0)
            },
            AnalyticsRow {
                strategy: Some("trend".into()),
                day_of_week: Some(2),
                ..analytics(-1.0)
            },
        ];
        let report = winning_patterns(&rows);

        let strategy = report.best_strategy.unwrap();
        assert_eq!(strategy.key, "reversal");
        assert_eq!(strategy.winrate, 100.0);

        let day = report.best_day.unwrap();
        assert_eq!(day.key, "Thursday");

        assert_eq!(report.best_session.unwrap().key, "NewYork");
    }

    #[test]
    fn winning_patterns_are_absent_without_labels() {
        let report = winning_patterns(&[analytics(3.0)]);
        assert!(report.best_strategy.is_none());
        assert!(report.best_day.is_none());
        assert!(report.best_session.is_none());
    }

    #[test]
    fn empty_rows_produce_insufficient_notice() {
        let report = Report::from_rows(&[], winning_patterns);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, serde_json::json!({ "message": INSUFFICIENT_DATA }));
    }

    #[test]
    fn day_names_cover_week() {
        assert_eq!(day_name(0), Some("Sunday"));
        assert_eq!(day_name(6), Some("Saturday"));
        assert_eq!(day_name(7), None);
        assert_eq!(day_name(-1), None);
    }
}
