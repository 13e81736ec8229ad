use crate::{
    errors::AppError,
    models::{ConnectionHandle, WireMessage},
    registry::encode,
};

pub fn send_to_connection(connection: &ConnectionHandle, msg: &WireMessage) {
    let Some(frame) = encode(msg) else {
        return;
    };
    if !connection.send(frame) {
        tracing::debug!(
            "Failed to send {} to connection {}: writer closed",
            msg.kind(),
            connection.id
        );
    }
}

pub fn send_error_to_connection(connection: &ConnectionHandle, err: &AppError) {
    tracing::debug!("Rejecting request from {}: {}", connection.id, err);
    send_to_connection(connection, &err.to_wire());
}
