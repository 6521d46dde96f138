// handlers/protected/mod.rs - Protected handlers (user JWT required)
//
// Security Level: Authenticated user, rate limited per user
// Route Prefix: /api/keys, /api/analytics/*, /api/sync/*
//
// Handlers read the caller from the AuthUser extension set by
// jwt_auth_middleware and never see another user's rows.

pub mod analytics;
pub mod keys;
pub mod sync;

pub use keys::keys_post;
