use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    client::{
        session::{ConnectionState, SessionClient, SessionEvent},
        transport::{Transport, WsTransport},
    },
    config::ClientConfig,
    errors::SessionError,
    games::Move,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

type Reply = oneshot::Sender<Result<(), SessionError>>;

#[derive(Debug)]
pub enum SessionCommand {
    Move { mv: Move, reply: Reply },
    Reset { reply: Reply },
    Chat { text: String, reply: Reply },
    Leave,
    Close,
}

/// Handle to a [`SessionClient`] running on a background task.
///
/// Actions are forwarded to the task and answered with the same result the
/// sans-IO client would return. Events arrive on the receiver returned by
/// [`start`] or [`connect`]. Board and connection events wait for room in
/// that channel, so it has to be drained while actions are awaited.
pub struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    task: Option<JoinHandle<SessionClient>>,
}

impl SessionHandle {
    pub async fn submit_move(&self, mv: Move) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Move { mv, reply }).await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Reset { reply }).await
    }

    pub async fn chat(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();
        self.request(|reply| SessionCommand::Chat { text, reply })
            .await
    }

    pub fn leave(&self) -> Result<(), SessionError> {
        self.cmd_tx
            .send(SessionCommand::Leave)
            .map_err(|_| SessionError::NotConnected)
    }

    /// Leaves the room, closes the transport and returns the final client
    /// state. Returns `None` if the loop had to be aborted.
    pub async fn shutdown(mut self) -> Option<SessionClient> {
        let _ = self.cmd_tx.send(SessionCommand::Close);
        let mut task = self.task.take()?;

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await {
            Ok(Ok(client)) => Some(client),
            Ok(Err(e)) => {
                tracing::warn!("Session loop ended with join error: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Session loop did not stop in time, aborting");
                task.abort();
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    async fn request(
        &self,
        build: impl FnOnce(Reply) -> SessionCommand,
    ) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.cmd_tx
            .send(build(reply))
            .map_err(|_| SessionError::NotConnected)?;
        response.await.map_err(|_| SessionError::NotConnected)?
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Opens a WebSocket to the relay and starts the session loop.
pub async fn connect(
    config: &ClientConfig,
    mut client: SessionClient,
) -> Result<(SessionHandle, mpsc::Receiver<SessionEvent>), SessionError> {
    client.on_connecting();
    tracing::info!("Connecting to {}", config.server_url);

    match WsTransport::connect(config).await {
        Ok(transport) => Ok(start(transport, client, config.event_channel_capacity)),
        Err(e) => {
            tracing::error!("Could not reach {}: {}", config.server_url, e);
            Err(e)
        }
    }
}

/// Runs `client` over an already connected `transport`.
pub fn start(
    transport: impl Transport,
    client: SessionClient,
    event_channel_capacity: usize,
) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(event_channel_capacity.max(1));

    let task = tokio::spawn(session_loop(transport, client, cmd_rx, event_tx));

    (
        SessionHandle {
            cmd_tx,
            task: Some(task),
        },
        event_rx,
    )
}

async fn session_loop(
    mut transport: impl Transport,
    mut client: SessionClient,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
) -> SessionClient {
    client.on_open();
    if flush(&mut transport, &mut client, &event_tx).await.is_err() {
        return client;
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Move { mv, reply }) => {
                        let _ = reply.send(client.submit_local_move(mv));
                    }
                    Some(SessionCommand::Reset { reply }) => {
                        let _ = reply.send(client.submit_reset());
                    }
                    Some(SessionCommand::Chat { text, reply }) => {
                        let _ = reply.send(client.send_chat(&text));
                    }
                    Some(SessionCommand::Leave) => client.leave(),
                    Some(SessionCommand::Close) | None => {
                        client.leave();
                        let _ = flush(&mut transport, &mut client, &event_tx).await;
                        if let Err(e) = transport.close().await {
                            tracing::debug!("Transport close failed: {}", e);
                        }
                        client.on_closed();
                        emit_events(&mut client, &event_tx).await;
                        break;
                    }
                }
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => {
                        if let Err(e) = client.on_message(&text) {
                            tracing::warn!("Ignoring frame from relay: {}", e);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!("Transport receive error: {}", e);
                        client.on_error(e.to_string());
                        emit_events(&mut client, &event_tx).await;
                        break;
                    }
                    None => {
                        tracing::debug!("Relay closed the connection");
                        client.on_closed();
                        emit_events(&mut client, &event_tx).await;
                        break;
                    }
                }
            }
        }

        if flush(&mut transport, &mut client, &event_tx).await.is_err() {
            break;
        }

        // a relay error ends the session
        if *client.connection_state() == ConnectionState::Closed {
            let _ = transport.close().await;
            break;
        }
    }

    tracing::debug!("Session loop for room {} exited", client.room_id());
    client
}

/// Writes queued frames, then hands queued events to the UI.
async fn flush(
    transport: &mut impl Transport,
    client: &mut SessionClient,
    event_tx: &mpsc::Sender<SessionEvent>,
) -> Result<(), SessionError> {
    for msg in client.drain_outbox() {
        let json = match msg.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize {} frame: {}", msg.kind(), e);
                continue;
            }
        };
        if let Err(e) = transport.send(json).await {
            tracing::error!("Transport send error: {}", e);
            client.on_error(e.to_string());
            emit_events(client, event_tx).await;
            return Err(e);
        }
    }

    emit_events(client, event_tx).await;
    Ok(())
}

async fn emit_events(client: &mut SessionClient, event_tx: &mpsc::Sender<SessionEvent>) {
    for event in client.drain_events() {
        // the UI's board and connection view are rebuilt from these, so they
        // wait for room in the channel instead of being dropped
        if changes_state(&event) {
            if event_tx.send(event).await.is_err() {
                tracing::debug!("Event receiver dropped");
            }
            continue;
        }

        match event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!("Event channel full, dropping {:?}", dropped);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Event receiver dropped");
            }
        }
    }
}

fn changes_state(event: &SessionEvent) -> bool {
    !matches!(
        event,
        SessionEvent::Chat(_)
            | SessionEvent::ConnectionChanged(ConnectionState::Connecting | ConnectionState::Open)
    )
}
