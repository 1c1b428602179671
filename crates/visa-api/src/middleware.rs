//! Request-id generation and global rate limiting.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = visa_core::new_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no per-client buckets).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build the limiter described by `config`, or `None` when disabled or when
/// the numbers cannot form a quota.
///
/// The bucket holds `requests` cells and refills one cell every
/// `period_secs / requests`, so a sustained client gets `requests` per period.
pub fn build_rate_limiter(config: &RateLimitConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.enabled {
        return None;
    }

    let burst = u32::try_from(config.requests)
        .ok()
        .and_then(NonZeroU32::new);
    let quota = burst.and_then(|burst| {
        Duration::from_secs(config.period_secs)
            .checked_div(burst.get())
            .and_then(Quota::with_period)
            .map(|quota| quota.allow_burst(burst))
    });

    match quota {
        Some(quota) => Some(Arc::new(RateLimiter::direct(quota))),
        None => {
            warn!(
                requests = config.requests,
                period_secs = config.period_secs,
                "Invalid rate limit settings, rate limiting disabled"
            );
            None
        }
    }
}

/// Reject requests once the global quota is exhausted.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            warn!(path = %request.uri().path(), "Rate limit exceeded");
            return Err(ApiError::TooManyRequests);
        }
    }
    Ok(next.run(request).await)
}

/// Replace the plain-text 413 from the body limit layer with an envelope.
pub async fn payload_too_large_envelope(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }
    ApiError::PayloadTooLarge.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_builds_no_limiter() {
        let config = RateLimitConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_rate_limiter(&config).is_none());
    }

    #[test]
    fn test_zero_values_disable_limiter() {
        let config = RateLimitConfig {
            enabled: true,
            requests: 0,
            period_secs: 60,
        };
        assert!(build_rate_limiter(&config).is_none());

        let config = RateLimitConfig {
            enabled: true,
            requests: 10,
            period_secs: 0,
        };
        assert!(build_rate_limiter(&config).is_none());
    }

    #[test]
    fn test_limiter_refills_evenly_across_the_period() {
        let config = RateLimitConfig {
            enabled: true,
            requests: 4,
            period_secs: 2,
        };
        let limiter = build_rate_limiter(&config).unwrap();
        for _ in 0..4 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());

        // One cell comes back every 500ms, not once per period.
        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[tokio::test]
    async fn test_plain_413_becomes_envelope() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let response = payload_too_large_envelope(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], crate::error::PAYLOAD_TOO_LARGE_MESSAGE);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let ok = (StatusCode::OK, "fine").into_response();
        let response = payload_too_large_envelope(ok).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_limiter_allows_burst_then_rejects() {
        let config = RateLimitConfig {
            enabled: true,
            requests: 2,
            period_secs: 60,
        };
        let limiter = build_rate_limiter(&config).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
