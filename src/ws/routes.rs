use axum::{Router, routing::get};

use crate::{state::AppState, ws::handler::ws_handler};

pub fn create_ws_routes(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
