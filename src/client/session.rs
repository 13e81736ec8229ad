use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::{
    errors::SessionError,
    games::{GameState, Move, Status},
    models::{ErrorCode, GameKind, Role, RoomId, WireMessage},
};

pub const MAX_CHAT_CHARS: usize = 30;

/// How many times a creator picks a fresh room id after `duplicate_room`.
pub const MAX_CREATE_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIntent {
    Create,
    Join,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub sender: Role,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// What the UI needs to know after feeding the client a frame or an action.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ConnectionChanged(ConnectionState),
    RoomCreated(RoomId),
    RoleAssigned(Role),
    PeerJoined,
    PeerLeft,
    MoveApplied { mv: Move, by: Role },
    GameOver(Status),
    GameReset,
    Chat(ChatEntry),
    RelayError {
        message: String,
        code: Option<ErrorCode>,
    },
}

/// One player's view of a paired session.
///
/// Owns the local game mirror. Frames to send accumulate in an outbox and UI
/// notifications in an event queue; the caller drains both after every call.
#[derive(Debug)]
pub struct SessionClient {
    game: GameKind,
    intent: SessionIntent,
    room_id: RoomId,
    connection: ConnectionState,
    role: Role,
    paired: bool,
    state: GameState,
    chat: Vec<ChatEntry>,
    outbox: VecDeque<WireMessage>,
    events: VecDeque<SessionEvent>,
    create_retries: u32,
}

impl SessionClient {
    /// A client that will host a new room under a freshly generated id.
    pub fn create(game: GameKind) -> Self {
        Self::create_with_id(game, RoomId::generate())
    }

    pub fn create_with_id(game: GameKind, room_id: RoomId) -> Self {
        Self::new(game, SessionIntent::Create, room_id, Role::FirstMover)
    }

    /// A client that will join `room_id`. Its role is confirmed by the relay.
    pub fn join(game: GameKind, room_id: RoomId) -> Self {
        Self::new(game, SessionIntent::Join, room_id, Role::SecondMover)
    }

    fn new(game: GameKind, intent: SessionIntent, room_id: RoomId, role: Role) -> Self {
        Self {
            game,
            intent,
            room_id,
            connection: ConnectionState::Disconnected,
            role,
            paired: false,
            state: GameState::new(game),
            chat: Vec::new(),
            outbox: VecDeque::new(),
            events: VecDeque::new(),
            create_retries: 0,
        }
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_creator(&self) -> bool {
        self.intent == SessionIntent::Create
    }

    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn is_paired(&self) -> bool {
        self.paired
    }

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn chat_log(&self) -> &[ChatEntry] {
        &self.chat
    }

    pub fn is_my_turn(&self) -> bool {
        !self.state.is_terminal() && self.state.current_turn == self.role
    }

    /// Whether the UI should accept a move from the local player right now.
    pub fn can_move(&self) -> bool {
        self.is_live() && self.is_my_turn()
    }

    fn is_live(&self) -> bool {
        self.connection == ConnectionState::Open && self.paired
    }

    // transport callbacks

    pub fn on_connecting(&mut self) {
        self.set_connection(ConnectionState::Connecting);
    }

    /// The transport is up: announce ourselves to the relay.
    pub fn on_open(&mut self) {
        self.set_connection(ConnectionState::Open);
        let hello = match self.intent {
            SessionIntent::Create => WireMessage::Create {
                room_id: self.room_id.clone(),
                game: self.game,
            },
            SessionIntent::Join => WireMessage::Join {
                room_id: self.room_id.clone(),
                game: self.game,
            },
        };
        self.outbox.push_back(hello);
    }

    pub fn on_closed(&mut self) {
        self.paired = false;
        self.set_connection(ConnectionState::Closed);
    }

    pub fn on_error(&mut self, reason: impl Into<String>) {
        self.paired = false;
        self.set_connection(ConnectionState::Errored(reason.into()));
    }

    /// Parses and dispatches one text frame from the relay.
    pub fn on_message(&mut self, text: &str) -> Result<(), SessionError> {
        let msg = serde_json::from_str::<WireMessage>(text)
            .map_err(|e| SessionError::UnknownMessage(e.to_string()))?;
        self.handle(msg)
    }

    pub fn handle(&mut self, msg: WireMessage) -> Result<(), SessionError> {
        match msg {
            WireMessage::RoomCreated { room_id } => {
                if let Some(room_id) = room_id {
                    self.room_id = room_id;
                }
                self.role = Role::FirstMover;
                tracing::info!("Hosting room {}", self.room_id);
                self.events
                    .push_back(SessionEvent::RoomCreated(self.room_id.clone()));
            }
            WireMessage::RoomJoined { role } => {
                self.role = role;
                tracing::info!("Joined room {} as {}", self.room_id, role);
                self.events.push_back(SessionEvent::RoleAssigned(role));
            }
            WireMessage::PeerJoined => {
                // a newcomer starts from an empty board, so must we
                if self.state.move_count > 0 {
                    tracing::info!("New peer in room {}, starting a fresh game", self.room_id);
                    self.restart();
                }
                self.paired = true;
                self.events.push_back(SessionEvent::PeerJoined);
            }
            WireMessage::PeerLeft => {
                self.paired = false;
                self.events.push_back(SessionEvent::PeerLeft);
            }
            WireMessage::Move { .. } => self.receive_move(&msg),
            WireMessage::Reset { role } => {
                tracing::debug!("Peer ({}) reset the game", role);
                self.restart();
            }
            WireMessage::Chat { sender, message } => {
                let message: String = message.chars().take(MAX_CHAT_CHARS).collect();
                self.push_chat(sender, message);
            }
            WireMessage::Error { message, code } => self.relay_error(message, code),
            other => {
                tracing::warn!("Relay sent a client-only {} frame", other.kind());
                return Err(SessionError::UnknownMessage(other.kind().to_string()));
            }
        }
        Ok(())
    }

    fn receive_move(&mut self, msg: &WireMessage) {
        let Some((mv, player)) = msg.as_move() else {
            tracing::warn!("Dropping malformed move frame: {:?}", msg);
            return;
        };

        if player != self.role.opponent() {
            tracing::warn!("Dropping move claimed by {}, peer plays {}", player, self.role.opponent());
            return;
        }

        match self.state.apply_in_place(mv, player) {
            Ok(()) => self.after_move(mv, player),
            Err(e) => tracing::warn!("Dropping peer move {:?}: {}", mv, e),
        }
    }

    fn relay_error(&mut self, message: String, code: Option<ErrorCode>) {
        if code == Some(ErrorCode::DuplicateRoom)
            && self.intent == SessionIntent::Create
            && self.create_retries < MAX_CREATE_RETRIES
        {
            self.create_retries += 1;
            self.room_id = RoomId::generate();
            tracing::info!(
                "Room id taken, retrying as {} ({}/{})",
                self.room_id,
                self.create_retries,
                MAX_CREATE_RETRIES
            );
            self.outbox.push_back(WireMessage::Create {
                room_id: self.room_id.clone(),
                game: self.game,
            });
            return;
        }

        tracing::warn!("Relay error: {}", message);
        self.paired = false;
        self.events.push_back(SessionEvent::RelayError { message, code });
        self.set_connection(ConnectionState::Closed);
    }

    // local actions

    /// Plays `mv` for the local role and queues it for the peer.
    ///
    /// A rejected move leaves the mirror untouched and sends nothing.
    pub fn submit_local_move(&mut self, mv: Move) -> Result<(), SessionError> {
        if !self.is_live() {
            return Err(SessionError::NotConnected);
        }

        self.state = self.state.apply(mv, self.role)?;
        self.outbox.push_back(WireMessage::for_move(&mv, self.role));
        self.after_move(mv, self.role);
        Ok(())
    }

    /// Starts a fresh game locally and tells the peer to do the same.
    pub fn submit_reset(&mut self) -> Result<(), SessionError> {
        if self.connection != ConnectionState::Open {
            return Err(SessionError::NotConnected);
        }

        self.restart();
        self.outbox
            .push_back(WireMessage::Reset { role: self.role });
        Ok(())
    }

    pub fn send_chat(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.is_live() {
            return Err(SessionError::NotConnected);
        }

        let message = text.trim();
        if message.is_empty() {
            return Err(SessionError::EmptyChat);
        }
        if message.chars().count() > MAX_CHAT_CHARS {
            return Err(SessionError::ChatTooLong {
                max: MAX_CHAT_CHARS,
            });
        }

        self.outbox.push_back(WireMessage::Chat {
            sender: self.role,
            message: message.to_string(),
        });
        self.push_chat(self.role, message.to_string());
        Ok(())
    }

    /// Gives up the seat. The relay tells the peer.
    pub fn leave(&mut self) {
        if self.connection == ConnectionState::Open {
            self.outbox.push_back(WireMessage::Leave);
        }
        self.paired = false;
    }

    pub fn drain_outbox(&mut self) -> Vec<WireMessage> {
        self.outbox.drain(..).collect()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    fn restart(&mut self) {
        self.state.reset();
        self.role = if self.is_creator() {
            Role::FirstMover
        } else {
            Role::SecondMover
        };
        self.events.push_back(SessionEvent::GameReset);
    }

    fn after_move(&mut self, mv: Move, by: Role) {
        self.events.push_back(SessionEvent::MoveApplied { mv, by });
        if self.state.is_terminal() {
            self.events.push_back(SessionEvent::GameOver(self.state.status));
        }
    }

    fn push_chat(&mut self, sender: Role, message: String) {
        let entry = ChatEntry {
            sender,
            message,
            at: Utc::now(),
        };
        self.chat.push(entry.clone());
        self.events.push_back(SessionEvent::Chat(entry));
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            self.connection = state.clone();
            self.events
                .push_back(SessionEvent::ConnectionChanged(state));
        }
    }
}
