pub mod aggregate;
pub mod patterns;
pub mod pnl;
pub mod stats;
pub mod time_range;
pub mod top_trades;

pub use aggregate::{
    group_and_aggregate, group_and_aggregate_weighted, GroupStats, GroupSummary, Groups,
};
pub use pnl::{trade_pnl, Direction};
pub use stats::UserStats;
pub use time_range::TimeRange;
pub use top_trades::{TopTrades, TradePnl};
