//! Player-side half of the protocol.
//!
//! [`SessionClient`] is a sans-IO state machine: it consumes frames and UI
//! actions and produces outgoing frames and events. [`runtime`] drives it over
//! a [`Transport`]; [`LocalMatch`] plays without any relay.

pub mod local;
pub mod runtime;
pub mod session;
pub mod transport;

pub use local::{LocalMatch, LocalMode};
pub use runtime::{SessionCommand, SessionHandle, connect, start};
pub use session::{
    ChatEntry, ConnectionState, MAX_CHAT_CHARS, MAX_CREATE_RETRIES, SessionClient, SessionEvent,
    SessionIntent,
};
pub use transport::{Transport, WsTransport};
