//! Fixed-window request limiter applied at the HTTP boundary.
//!
//! One window per client IP: the counter resets when the window elapses and
//! requests past the configured limit are answered with the
//! `TOO_MANY_REQUESTS` envelope. Gated by `api.enable_rate_limiting`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;

use crate::config;
use crate::error::ApiError;

struct Window {
    started: Instant,
    count: u32,
}

#[derive(Default)]
pub struct FixedWindow {
    windows: HashMap<IpAddr, Window>,
}

impl FixedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request and report whether it stays within the limit.
    pub fn check(&mut self, ip: IpAddr, limit: u32, window: Duration, now: Instant) -> bool {
        let entry = self.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= limit
    }
}

static LIMITER: Lazy<Mutex<FixedWindow>> = Lazy::new(|| Mutex::new(FixedWindow::new()));

pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let api = &config::config().api;
    if api.enable_rate_limiting {
        let allowed = LIMITER
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .check(
                addr.ip(),
                api.rate_limit_requests,
                Duration::from_secs(api.rate_limit_window_secs),
                Instant::now(),
            );
        if !allowed {
            return ApiError::too_many_requests("Too many requests, please retry later")
                .into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn requests_within_limit_pass() {
        let mut limiter = FixedWindow::new();
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check(ip(1), 10, Duration::from_secs(60), now));
        }
    }

    #[test]
    fn request_over_limit_is_blocked() {
        let mut limiter = FixedWindow::new();
        let now = Instant::now();
        for _ in 0..10 {
            limiter.check(ip(1), 10, Duration::from_secs(60), now);
        }
        assert!(!limiter.check(ip(1), 10, Duration::from_secs(60), now));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let mut limiter = FixedWindow::new();
        let start = Instant::now();
        for _ in 0..11 {
            limiter.check(ip(1), 10, Duration::from_secs(60), start);
        }
        let later = start + Duration::from_secs(61);
        assert!(limiter.check(ip(1), 10, Duration::from_secs(60), later));
    }

    #[test]
    fn clients_are_limited_independently() {
        let mut limiter = FixedWindow::new();
        let now = Instant::now();
        for _ in 0..11 {
            limiter.check(ip(1), 10, Duration::from_secs(60), now);
        }
        assert!(limiter.check(ip(2), 10, Duration::from_secs(60), now));
    }
}
