//! Admin authentication and HTTP metrics middleware.
//!
//! Admin endpoints expect `Authorization: Bearer <ADMIN_TOKEN>`. Only the
//! SHA-256 digest of the configured token is kept in memory, and presented
//! tokens are compared digest to digest in constant time.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use pd_server::api::middleware::admin_auth_middleware;
//! # use pd_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router<AppState> = Router::new()
//!     .route("/api/v1/bans", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));
//! # let _ = protected_routes;
//! ```

use super::{ApiError, AppState, api_error, request_id::RequestId};
use crate::{logging, metrics};
use axum::{
    extract::{MatchedPath, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::{fmt, time::Instant};
use subtle::ConstantTimeEq;

/// Digest of the configured admin token
pub struct AdminToken {
    digest: [u8; 32],
}

impl AdminToken {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.trim().as_bytes()).into(),
        }
    }

    /// Constant-time check of a presented token
    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.trim().as_bytes()).into();
        self.digest[..].ct_eq(&presented[..]).into()
    }

    /// Short hex fingerprint for logs, never the token itself
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdminToken({})", self.fingerprint())
    }
}

/// Rejects admin requests without a valid bearer token.
///
/// - **Missing header or wrong scheme**: `401 Unauthorized`
/// - **Wrong token**: `401 Unauthorized`, logged as a security event
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        metrics::admin_auth_failures_total();
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Missing admin bearer token",
        ));
    };

    if !state.admin_token.verify(token) {
        metrics::admin_auth_failures_total();
        logging::log_security_event(
            "admin_auth_failed",
            None,
            request_id.as_deref(),
            &format!("Invalid admin token for {}", request.uri().path()),
        );
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid admin token"));
    }

    Ok(next.run(request).await)
}

/// Records request count, duration and completion log for every request.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::http_requests_total(&method, &path, status);
    metrics::http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    logging::log_api_request(
        &method,
        &path,
        status,
        elapsed.as_millis() as u64,
        request_id.as_deref(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_token_verification() {
        let token = AdminToken::new("0123456789abcdef0123456789abcdef");
        assert!(token.verify("0123456789abcdef0123456789abcdef"));
        assert!(token.verify(" 0123456789abcdef0123456789abcdef\n"));
        assert!(!token.verify("0123456789abcdef0123456789abcdeF"));
        assert!(!token.verify(""));
    }

    #[test]
    fn test_debug_shows_only_fingerprint() {
        let secret = "super-secret-admin-token-value-0001";
        let token = AdminToken::new(secret);
        let debug = format!("{token:?}");
        assert!(!debug.contains(secret));
        assert_eq!(token.fingerprint().len(), 8);
        assert!(debug.contains(&token.fingerprint()));
    }
}
