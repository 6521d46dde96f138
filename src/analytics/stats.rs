use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: DateTime<Utc>,
    pub pnl: f64,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_pnl: f64,
    pub winrate: f64,
    pub average_win: f64,
    /// Absolute value of the mean losing trade
    pub average_loss: f64,
    pub profit_factor: f64,
    pub total_wins: u64,
    pub total_losses: u64,
    pub total_trades: u64,
    pub equity_curve: Vec<EquityPoint>,
}

impl UserStats {
    /// Summarize `(created_at, pnl)` pairs. Input must be in chronological
    /// order for the equity curve to be meaningful.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let mut stats = UserStats::default();
        let mut win_amount = 0.0;
        let mut loss_amount = 0.0;

        for (date, pnl) in outcomes {
            stats.total_trades += 1;
            stats.total_pnl += pnl;
            if pnl > 0.0 {
                stats.total_wins += 1;
                win_amount += pnl;
            } else if pnl < 0.0 {
                stats.total_losses += 1;
                loss_amount += pnl.abs();
            }
            stats.equity_curve.push(EquityPoint { date, pnl: stats.total_pnl });
        }

        if stats.total_trades > 0 {
            stats.winrate = stats.total_wins as f64 / stats.total_trades as f64 * 100.0;
        }
        if stats.total_wins > 0 {
            stats.average_win = win_amount / stats.total_wins as f64;
        }
        if stats.total_losses > 0 {
            stats.average_loss = loss_amount / stats.total_losses as f64;
        }
        if loss_amount > 0.0 {
            stats.profit_factor = win_amount / loss_amount;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn summarizes_wins_losses_and_equity_curve() {
        let stats = UserStats::from_outcomes(vec![
            (day(1), 30.0),
            (day(2), -10.0),
            (day(3), 0.0),
            (day(4), 10.0),
        ]);

        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.total_wins, 2);
        assert_eq!(stats.total_losses, 1);
        assert_eq!(stats.total_pnl, 30.0);
        assert_eq!(stats.winrate, 50.0);
        assert_eq!(stats.average_win, 20.0);
        assert_eq!(stats.average_loss, 10.0);
        assert_eq!(stats.profit_factor, 4.0);

        let curve: Vec<f64> = stats.equity_curve.iter().map(|p| p.pnl).collect();
        assert_eq!(curve, vec![30.0, 20.0, 20.0, 30.0]);
        assert_eq!(stats.equity_curve[1].date, day(2));
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = UserStats::from_outcomes(Vec::new());
        assert_eq!(stats, UserStats::default());
    }

    #[test]
    fn profit_factor_is_zero_without_losses() {
        let stats = UserStats::from_outcomes(vec![(day(1), 5.0)]);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.average_loss, 0.0);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let value = serde_json::to_value(UserStats::from_outcomes(vec![(day(1), 1.0)])).unwrap();
        assert!(value.get("totalPnl").is_some());
        assert!(value.get("equityCurve").is_some());
        assert!(value.get("profitFactor").is_some());
    }
}
