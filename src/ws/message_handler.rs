use axum::extract::ws::Message;
use futures::StreamExt;

use crate::{
    errors::AppError,
    models::{ConnectionHandle, WireMessage},
    state::AppState,
    ws::utils::send_error_to_connection,
};

pub async fn handle_incoming_messages(
    mut receiver: impl StreamExt<Item = Result<Message, axum::Error>> + Unpin,
    connection: &ConnectionHandle,
    state: &AppState,
) {
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => handle_text(text.as_str(), connection, state).await,
            Ok(Message::Binary(_)) => {
                send_error_to_connection(
                    connection,
                    &AppError::BadMessage("Binary frames are not supported".into()),
                );
            }
            Ok(Message::Close(_)) => {
                tracing::debug!("Connection {} sent close", connection.id);
                break;
            }
            // axum answers pings itself
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Connection {} read error: {}", connection.id, e);
                break;
            }
        }
    }
}

/// Dispatches one text frame. Peer traffic is forwarded as the exact text
/// received, so fields this relay does not model survive the hop.
pub async fn handle_text(text: &str, connection: &ConnectionHandle, state: &AppState) {
    let parsed = match serde_json::from_str::<WireMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!("Unparseable frame from {}: {}", connection.id, e);
            send_error_to_connection(connection, &AppError::BadMessage(e.to_string()));
            return;
        }
    };

    match parsed {
        WireMessage::Create { room_id, game } => {
            if let Err(e) = state
                .registry
                .host(room_id, game, connection.clone())
                .await
            {
                send_error_to_connection(connection, &e);
            }
        }
        WireMessage::Join { room_id, game } => {
            if let Err(e) = state
                .registry
                .join(&room_id, game, connection.clone())
                .await
            {
                send_error_to_connection(connection, &e);
            }
        }
        WireMessage::Leave => {
            if state.registry.leave(connection.id).await.is_none() {
                tracing::debug!("Connection {} left without a room", connection.id);
            }
        }
        msg if msg.is_peer_traffic() => {
            let Some(room_id) = state.registry.room_of(connection.id).await else {
                tracing::debug!(
                    "Dropping {} from {}: not in a room",
                    msg.kind(),
                    connection.id
                );
                return;
            };
            state
                .registry
                .relay(&room_id, connection.id, text.to_string())
                .await;
        }
        other => {
            send_error_to_connection(
                connection,
                &AppError::BadMessage(format!("{} is not accepted from clients", other.kind())),
            );
        }
    }
}
