pub mod analytics;
pub mod credential;
pub mod market;
pub mod trade;

pub use analytics::AnalyticsRow;
pub use credential::{NewApiKey, StoredApiKey};
pub use market::{CachedRate, MarketSnapshot, WhaleFlow};
pub use trade::{ClosedTrade, NewTrade, TradeContext};
