use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use roadwatch_core::AppConfig;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Request ID carried as a request extension and echoed in `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Accepted bearer tokens. Disabled when no keys are configured.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<[String]>,
}

impl AuthState {
    /// Uses the keys already validated by config loading.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        if config.api_keys.is_empty() {
            tracing::warn!(env = %config.env, "no API keys configured; bearer auth disabled");
        }
        Self::from_keys(config.api_keys.clone())
    }

    #[must_use]
    pub fn from_keys(keys: Vec<String>) -> Self {
        Self {
            api_keys: keys.into(),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::from_keys(Vec::new())
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    // Every key is compared so timing does not depend on which one matched.
    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(subtle::Choice::from(0), |acc, key| {
                acc | key.as_bytes().ct_eq(token.as_bytes())
            })
            .into()
    }
}

#[derive(Debug)]
struct Window {
    opened: Instant,
    used: usize,
}

/// Fixed-window request budget shared by all protected routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    budget: usize,
    length: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(budget: usize, length: Duration) -> Self {
        Self {
            budget,
            length,
            window: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Spend one request from the window open at `now`.
    ///
    /// On exhaustion returns how long until the window resets.
    async fn try_acquire(&self, now: Instant) -> Result<(), Duration> {
        let mut window = self.window.lock().await;
        let elapsed = now.saturating_duration_since(window.opened);
        if elapsed >= self.length {
            window.opened = now;
            window.used = 0;
        }
        if window.used >= self.budget {
            return Err(self.length.saturating_sub(elapsed));
        }
        window.used += 1;
        Ok(())
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

/// Reuses the caller's `x-request-id` or mints a `UUIDv4`, then stores it as a
/// [`RequestId`] extension and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    match bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => {
            tracing::debug!(path = %req.uri().path(), "bearer token rejected");
            ApiError::new(
                request_id_of(&req),
                "unauthorized",
                "missing or invalid bearer token",
            )
            .into_response()
        }
    }
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match rate_limit.try_acquire(Instant::now()).await {
        Ok(()) => next.run(req).await,
        Err(retry_in) => {
            let mut res =
                ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
                    .into_response();
            let secs = retry_in.as_secs().max(1);
            if let Ok(val) = HeaderValue::from_str(&secs.to_string()) {
                res.headers_mut().insert(RETRY_AFTER, val);
            }
            res
        }
    }
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        let valid = HeaderValue::from_static("Bearer test-token");
        assert_eq!(bearer_token(Some(&valid)), Some("test-token"));
        let basic = HeaderValue::from_static("Basic abc123");
        assert_eq!(bearer_token(Some(&basic)), None);
        let blank = HeaderValue::from_static("Bearer   ");
        assert_eq!(bearer_token(Some(&blank)), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn auth_without_keys_is_disabled() {
        assert!(!AuthState::disabled().enabled());
        assert!(!AuthState::from_keys(Vec::new()).enabled());
    }

    #[test]
    fn auth_matches_any_configured_key() {
        let state = AuthState::from_keys(vec!["alpha".to_string(), "beta".to_string()]);
        assert!(state.enabled());
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
        assert!(!state.allows("alph"));
        assert!(!state.allows("gamma"));
    }

    #[tokio::test]
    async fn rate_limit_resets_after_the_window() {
        let limit = RateLimitState::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limit.try_acquire(start).await.is_ok());
        assert!(limit.try_acquire(start).await.is_ok());

        let retry = limit
            .try_acquire(start + Duration::from_secs(4))
            .await
            .expect_err("budget spent");
        assert!(retry <= Duration::from_secs(6) && retry > Duration::from_secs(5));

        assert!(limit
            .try_acquire(start + Duration::from_secs(10))
            .await
            .is_ok());
    }
}
