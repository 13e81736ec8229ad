use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{Error as WsError, Message},
};

use crate::{config::ClientConfig, errors::SessionError};

/// Text-frame pipe to the relay. Implemented over a real socket by
/// [`WsTransport`] and by in-memory doubles in tests.
#[async_trait]
pub trait Transport: Send + 'static {
    async fn send(&mut self, message: String) -> Result<(), SessionError>;

    /// Next text frame. `None` once the connection closed cleanly.
    async fn recv(&mut self) -> Option<Result<String, SessionError>>;

    async fn close(&mut self) -> Result<(), SessionError>;
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(config: &ClientConfig) -> Result<Self, SessionError> {
        let connecting = tokio_tungstenite::connect_async(config.server_url.as_str());

        match tokio::time::timeout(config.connect_timeout, connecting).await {
            Ok(Ok((stream, _response))) => {
                tracing::debug!("Connected to {}", config.server_url);
                Ok(Self { stream })
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(SessionError::ConnectTimeout(config.server_url.clone())),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, message: String) -> Result<(), SessionError> {
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(SessionError::from)
    }

    async fn recv(&mut self) -> Option<Result<String, SessionError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                // tungstenite answers pings on the next read or write
                Ok(_) => continue,
                Err(WsError::ConnectionClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
