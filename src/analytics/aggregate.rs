//! Grouping fold shared by every analytics report.
//!
//! Records are bucketed under one or more labels and each bucket keeps a
//! running sum, count and win count. Win-rate and average are computed on
//! read so an empty bucket never divides by zero.

use indexmap::IndexMap;
use serde::Serialize;

/// Running totals for one group label
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupStats {
    pub sum: f64,
    pub count: u64,
    pub win_count: u64,
}

impl GroupStats {
    fn record(&mut self, outcome: f64) {
        self.sum += outcome;
        self.count += 1;
        // A flat trade is not a win
        if outcome > 0.0 {
            self.win_count += 1;
        }
    }

    /// Percentage of strictly positive outcomes, 0 for an empty group
    pub fn win_rate(&self) -> f64 {
        if self.count > 0 {
            self.win_count as f64 / self.count as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn average(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// Serialized view of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub key: String,
    pub pnl: f64,
    pub trade_count: u64,
    pub win_count: u64,
    pub winrate: f64,
    pub average_pnl: f64,
}

impl GroupSummary {
    fn new(key: &str, stats: &GroupStats) -> Self {
        Self {
            key: key.to_string(),
            pnl: stats.sum,
            trade_count: stats.count,
            win_count: stats.win_count,
            winrate: stats.win_rate(),
            average_pnl: stats.average(),
        }
    }
}

/// Aggregation result. Labels keep the order in which they were first seen.
#[derive(Debug, Clone, Default)]
pub struct Groups {
    inner: IndexMap<String, GroupStats>,
}

impl Groups {
    pub fn get(&self, label: &str) -> Option<&GroupStats> {
        self.inner.get(label)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupStats)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Summaries in first-seen order
    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.iter().map(|(k, v)| GroupSummary::new(k, v)).collect()
    }

    /// Summaries sorted by cumulative outcome, highest first. Equal sums keep
    /// their first-seen order.
    pub fn ranked_by_sum(&self) -> Vec<GroupSummary> {
        let mut ranked = self.summaries();
        ranked.sort_by(|a, b| b.pnl.total_cmp(&a.pnl));
        ranked
    }

    /// Group with the highest sum. On a tie the earlier group wins.
    pub fn best_by_sum(&self) -> Option<GroupSummary> {
        self.iter()
            .reduce(|best, candidate| if candidate.1.sum > best.1.sum { candidate } else { best })
            .map(|(k, v)| GroupSummary::new(k, v))
    }

    fn add(&mut self, label: &str, outcome: f64) {
        match self.inner.get_mut(label) {
            Some(stats) => stats.record(outcome),
            None => {
                let mut stats = GroupStats::default();
                stats.record(outcome);
                self.inner.insert(label.to_string(), stats);
            }
        }
    }
}

/// Fold `records` into per-label statistics.
///
/// `keys` may yield zero, one or many labels per record (an `Option<String>`
/// or a tag list both work). Each label receives the full outcome. Empty
/// labels are ignored. Outcomes must already be valid numbers.
pub fn group_and_aggregate<'a, T, K, I, S, O>(records: &'a [T], keys: K, outcome: O) -> Groups
where
    K: Fn(&'a T) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    O: Fn(&'a T) -> f64,
{
    group_and_aggregate_weighted(records, keys, outcome, |_| 1.0)
}

/// Same as [`group_and_aggregate`] with each outcome scaled by `weight`,
/// e.g. a currency conversion rate.
pub fn group_and_aggregate_weighted<'a, T, K, I, S, O, W>(
    records: &'a [T],
    keys: K,
    outcome: O,
    weight: W,
) -> Groups
where
    K: Fn(&'a T) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    O: Fn(&'a T) -> f64,
    W: Fn(&'a T) -> f64,
{
    let mut groups = Groups::default();

    for record in records {
        let value = outcome(record) * weight(record);
        for label in keys(record) {
            let label = label.as_ref();
            if label.is_empty() {
                continue;
            }
            groups.add(label, value);
        }
    }

    groups
}
