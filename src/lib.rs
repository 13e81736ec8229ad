pub mod cleanup;
pub mod client;
pub mod config;
pub mod errors;
pub mod games;
mod http;
mod middleware;
pub mod models;
pub mod registry;
pub mod state;
pub mod ws;

use axum::{Router, middleware as axum_middleware};
use middleware::{cors_layer, create_global_rate_limiter, rate_limit_middleware};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::{config::Config, errors::AppError, state::AppState};

/// Builds the relay router: HTTP API, the `/ws` endpoint and middleware.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()`; the
/// websocket handler and the rate limiter read the peer address.
pub fn create_app(state: AppState) -> Router {
    let global_rate_limiter = create_global_rate_limiter(state.config.rate_limit_per_minute);
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(http::create_http_routes(state.clone()))
        .merge(ws::create_ws_routes(state))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" })
}

pub async fn start_server() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let addr = config.bind_addr()?;
    let state = AppState::new(config);

    let cleanup = cleanup::start_cleanup_task(state.clone());
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Relay listening on http://{} (websocket at /ws)", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await;

    cleanup.abort();
    served.map_err(AppError::from)
}
