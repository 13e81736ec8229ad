use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    models::{GameKind, RoomId, RoomSummary},
    state::AppState,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rooms: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rooms: state.registry.room_count().await,
    })
}

#[derive(Deserialize)]
pub struct CreateRoomPayload {
    #[serde(default)]
    pub game: GameKind,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
    pub game: GameKind,
}

/// Reserves a fresh room id. The first `create` over the socket claims it.
pub async fn create_room_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoomPayload>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), (StatusCode, String)> {
    let room_id = state
        .registry
        .create_room(payload.game)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reserve room: {}", e);
            e.to_response()
        })?;

    tracing::info!("Reserved {} room {}", payload.game, room_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id,
            game: payload.game,
        }),
    ))
}

pub async fn get_room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummary>, (StatusCode, String)> {
    let room_id: RoomId = room_id.parse().map_err(|e: AppError| e.to_response())?;

    state
        .registry
        .room_summary(&room_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()).to_response())
}
