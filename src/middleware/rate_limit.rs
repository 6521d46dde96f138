use std::collections::VecDeque;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Per-user sliding window limiter.
///
/// Each key keeps the instants of its accepted requests inside the current
/// window. The limiter is process-local; counts are not shared between
/// replicas.
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    capacity: usize,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            enabled: true,
            capacity: capacity as usize,
            window,
            hits: DashMap::new(),
        }
    }

    /// A limiter that admits everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0, Duration::ZERO)
        }
    }

    pub fn from_config(api: &crate::config::ApiConfig) -> Self {
        if api.enable_rate_limiting {
            Self::new(api.rate_limit_requests, Duration::from_secs(api.rate_limit_window_secs))
        } else {
            Self::disabled()
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Records a request for `key` at `now`; returns false when the key has
    /// already used its capacity within the window.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let mut entry = self.hits.entry(key.to_string()).or_default();
        let queue = entry.value_mut();
        while let Some(&oldest) = queue.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                queue.pop_front();
            } else {
                break;
            }
        }

        if queue.len() >= self.capacity {
            return false;
        }
        queue.push_back(now);
        true
    }

    /// Drops keys whose whole history has aged out of the window
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&self, now: Instant) {
        self.hits.retain(|_, queue| {
            queue
                .back()
                .is_some_and(|&latest| now.saturating_duration_since(latest) < self.window)
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

/// Rejects authenticated requests over the per-user limit. Must run after
/// `jwt_auth_middleware`.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !state.rate_limiter.check(&user.user_id.to_string()) {
        tracing::warn!("Rate limit exceeded for user {}", user.user_id);
        return Err(ApiError::too_many_requests("Rate limit exceeded. Please try again later."));
    }

    Ok(next.run(request).await)
}
