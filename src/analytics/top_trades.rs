use serde::Serialize;

pub const TOP_TRADES_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePnl {
    pub symbol: String,
    pub pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTrades {
    pub top_winners: Vec<TradePnl>,
    pub top_losers: Vec<TradePnl>,
}

impl TopTrades {
    /// Winners are the first `limit` trades by PnL, highest first. Losers are
    /// strictly negative trades, worst first.
    pub fn rank(mut trades: Vec<TradePnl>, limit: usize) -> Self {
        trades.sort_by(|a, b| b.pnl.total_cmp(&a.pnl));

        let top_losers = trades.iter().rev().filter(|t| t.pnl < 0.0).take(limit).cloned().collect();
        trades.truncate(limit);

        TopTrades { top_winners: trades, top_losers }
    }
}
