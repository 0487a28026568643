//! HTTP adapters - the axum backend-for-frontend.
//!
//! Each area has its own `dto` / `handlers` / `routes` module. `api_router`
//! nests them under `/api`, applies the auth middleware and the tower-http
//! layers.

pub mod community;
pub mod error;
pub mod middleware;
pub mod onboarding;

use std::time::Duration;

use axum::{http::HeaderValue, middleware as axum_middleware, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub use community::{community_router, CommunityAppState};
pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, AuthState, OptionalAuth, RequireAuth};
pub use onboarding::{onboarding_router, OnboardingAppState};

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub request_timeout: Duration,
    /// Allowed browser origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the full API router.
///
/// The timeout layer is applied to the JSON routes only; the live comments
/// websocket stays open as long as the client keeps it.
pub fn api_router(
    onboarding: OnboardingAppState,
    community: CommunityAppState,
    validator: AuthState,
    options: &HttpOptions,
) -> Router {
    let onboarding_api = onboarding_router()
        .with_state(onboarding)
        .layer(TimeoutLayer::new(options.request_timeout));
    let community_api = community_router().with_state(community);

    let api = Router::new()
        .merge(onboarding_api)
        .merge(community_api)
        .layer(axum_middleware::from_fn_with_state(validator, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.cors_origins))
}
