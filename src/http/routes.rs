use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{create_room_handler, get_room_handler, health_handler},
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/room", post(create_room_handler))
        .route("/room/{room_id}", get(get_room_handler))
        .with_state(state)
}
