// handlers/protected/sync/mod.rs - Trade import handlers
//
// Route Prefix: /api/sync/*

pub mod binance;
pub mod onchain;

pub use binance::binance_post;
pub use onchain::onchain_post;
