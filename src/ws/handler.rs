use axum::{
    extract::{
        ConnectInfo, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::{net::SocketAddr, time::Duration};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{models::ConnectionHandle, state::AppState, ws::message_handler};

/// How long the writer may keep flushing queued frames after the reader ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    tracing::info!("New WebSocket connection from {}", addr);

    let max_message_bytes = state.config.max_message_bytes;
    ws.max_message_size(max_message_bytes)
        .max_frame_size(max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection = ConnectionHandle::new(Uuid::new_v4(), tx);
    let connection_id = connection.id;

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    message_handler::handle_incoming_messages(receiver, &connection, &state).await;

    if let Some(room_id) = state.registry.leave(connection_id).await {
        tracing::info!("Connection {} closed, released seat in {}", connection_id, room_id);
    }

    // The registry no longer holds a clone, so dropping ours ends the writer.
    drop(connection);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }

    tracing::debug!("Connection {} finished", connection_id);
}
