use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{governor::GovernorConfigBuilder, GovernorError, GovernorLayer};

use crate::error::{AppError, AppResult};
use crate::response::Envelope;

/// Type alias for the global governor layer (IP-based rate limiting)
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer limiting each client IP to `per_minute` requests,
/// refilled evenly over the minute.
pub fn create_global_governor(per_minute: u32) -> AppResult<GlobalGovernorLayer> {
    let per_minute = per_minute.max(1);
    let config = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / u64::from(per_minute)).max(1))
        .burst_size(per_minute)
        .finish()
        .ok_or_else(|| AppError::Internal("Invalid rate limit configuration".to_string()))?;

    Ok(GovernorLayer::new(Arc::new(config)).error_handler(rate_limit_error_handler))
}

/// Renders governor rejections in the response envelope.
pub fn rate_limit_error_handler(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, .. } => Envelope::error(
            StatusCode::TOO_MANY_REQUESTS,
            Value::String(format!(
                "Request was throttled. Expected available in {} seconds.",
                wait_time
            )),
        )
        .into_response(),
        GovernorError::UnableToExtractKey => {
            AppError::Internal("Unable to determine client address".to_string()).into_response()
        }
        other => {
            tracing::warn!(error = ?other, "Rate limiter rejected request");
            Envelope::from_reason(StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// Logs one line per request with its latency. Throttled and failed
/// requests are logged at `warn`.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(client_ip = %addr.ip(), %method, %path, "Request throttled");
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request served"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governor_accepts_any_budget() {
        assert!(create_global_governor(600).is_ok());
        assert!(create_global_governor(1).is_ok());
        assert!(create_global_governor(0).is_ok());
    }

    #[test]
    fn test_key_failure_is_enveloped() {
        let response = rate_limit_error_handler(GovernorError::UnableToExtractKey);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
