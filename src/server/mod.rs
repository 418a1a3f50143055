/*!
 * HTTP surface of the journaling service.
 *
 * - `routes`: journal, draft validation, session and feedback handlers
 * - `admin_routes`: token-guarded admin handlers
 * - `state`: shared services
 * - `error`: JSON error responses
 */

use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod admin_routes;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, SharedState};

use crate::app_config::Config;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(routes::SESSION_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Router with every route, CORS and request logging
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/analyze", post(routes::analyze_entry).get(routes::session_data))
        .route("/api/journal", post(routes::submit_journal))
        .route("/api/journal/validate", post(routes::check_draft))
        .route("/api/feedback", post(routes::submit_feedback))
        .route("/api/session", get(routes::session_summary))
        .route("/api/session/end", post(routes::end_session))
        .route("/api/admin", get(admin_routes::dashboard))
        .route("/api/admin/login", post(admin_routes::login))
        .route("/api/admin/logout", post(admin_routes::logout))
        .route("/api/admin/training", post(admin_routes::training))
        .layer(middleware::from_fn(log_request))
        .layer(cors_layer(allowed_origins))
        .with_state(Arc::new(state))
}

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(config: &Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(config)?;
    let app = build_router(state, &config.server.allowed_origins);

    let address = config.server.bind_address();
    info!("Binding to {}", address);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
