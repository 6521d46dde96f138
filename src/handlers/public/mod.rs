// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: /, /health, /api/exchange-rate

pub mod exchange_rate;
pub mod status;

pub use exchange_rate::exchange_rate_get;
pub use status::{health, root};
