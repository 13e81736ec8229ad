use duel_relay::{
    client::{ConnectionState, MAX_CHAT_CHARS, MAX_CREATE_RETRIES, SessionClient, SessionEvent},
    errors::SessionError,
    games::{Move, Occupant, Square, Status},
    models::{ErrorCode, GameKind, Role, RoomId, WireMessage},
};

fn room(id: &str) -> RoomId {
    id.parse().unwrap()
}

fn place(pos: usize) -> Move {
    Move::Place { pos }
}

/// Host and guest after the relay handshake, outboxes and events drained.
fn open_pair(game: GameKind) -> (SessionClient, SessionClient) {
    let mut host = SessionClient::create_with_id(game, room("ABC123"));
    let mut guest = SessionClient::join(game, room("abc123"));

    host.on_open();
    host.handle(WireMessage::RoomCreated {
        room_id: Some(room("ABC123")),
    })
    .unwrap();
    guest.on_open();
    guest
        .handle(WireMessage::RoomJoined {
            role: Role::SecondMover,
        })
        .unwrap();
    guest.handle(WireMessage::PeerJoined).unwrap();
    host.handle(WireMessage::PeerJoined).unwrap();

    host.drain_outbox();
    guest.drain_outbox();
    host.drain_events();
    guest.drain_events();
    (host, guest)
}

/// Feeds everything `from` has queued to `to` as raw text, like the relay does.
fn deliver(from: &mut SessionClient, to: &mut SessionClient) {
    for msg in from.drain_outbox() {
        to.on_message(&msg.to_json().unwrap()).unwrap();
    }
}

#[test]
fn test_open_announces_create_or_join() {
    let mut host = SessionClient::create_with_id(GameKind::Chess, room("ROOM01"));
    host.on_connecting();
    host.on_open();
    assert_eq!(
        host.drain_outbox(),
        vec![WireMessage::Create {
            room_id: room("ROOM01"),
            game: GameKind::Chess,
        }]
    );
    assert_eq!(
        host.drain_events(),
        vec![
            SessionEvent::ConnectionChanged(ConnectionState::Connecting),
            SessionEvent::ConnectionChanged(ConnectionState::Open),
        ]
    );

    let mut guest = SessionClient::join(GameKind::Chess, room("room01"));
    guest.on_open();
    assert_eq!(
        guest.drain_outbox(),
        vec![WireMessage::Join {
            room_id: room("ROOM01"),
            game: GameKind::Chess,
        }]
    );
}

#[test]
fn test_moves_reach_the_peer_mirror() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);
    assert_eq!(host.role(), Role::FirstMover);
    assert_eq!(guest.role(), Role::SecondMover);
    assert!(host.can_move());
    assert!(!guest.can_move());

    host.submit_local_move(place(0)).unwrap();
    deliver(&mut host, &mut guest);

    assert_eq!(
        guest.game_state().cell(0),
        Some(&Occupant::Mark {
            role: Role::FirstMover
        })
    );
    assert_eq!(guest.game_state().current_turn, Role::SecondMover);
    assert_eq!(guest.game_state(), host.game_state());
    assert!(guest.drain_events().contains(&SessionEvent::MoveApplied {
        mv: place(0),
        by: Role::FirstMover,
    }));
}

#[test]
fn test_out_of_turn_move_is_a_no_op() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);
    let before = guest.game_state().clone();

    let err = guest.submit_local_move(place(4)).unwrap_err();
    assert!(matches!(err, SessionError::TurnViolation));
    assert!(guest.drain_outbox().is_empty());
    assert_eq!(guest.game_state(), &before);

    host.submit_local_move(place(4)).unwrap();
    deliver(&mut host, &mut guest);
    let err = guest.submit_local_move(place(4)).unwrap_err();
    assert!(matches!(err, SessionError::TurnViolation));
}

#[test]
fn test_moves_need_a_paired_connection() {
    let mut host = SessionClient::create(GameKind::Tictactoe);
    assert!(matches!(
        host.submit_local_move(place(0)),
        Err(SessionError::NotConnected)
    ));

    host.on_open();
    host.handle(WireMessage::RoomCreated { room_id: None })
        .unwrap();
    assert!(matches!(
        host.submit_local_move(place(0)),
        Err(SessionError::NotConnected)
    ));

    host.handle(WireMessage::PeerJoined).unwrap();
    assert!(host.submit_local_move(place(0)).is_ok());

    host.handle(WireMessage::PeerLeft).unwrap();
    assert!(!host.is_paired());
}

#[test]
fn test_new_peer_in_freed_seat_starts_a_fresh_game() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);
    host.submit_local_move(place(0)).unwrap();
    deliver(&mut host, &mut guest);
    host.drain_events();

    host.handle(WireMessage::PeerLeft).unwrap();
    host.handle(WireMessage::PeerJoined).unwrap();
    assert_eq!(
        host.drain_events(),
        vec![
            SessionEvent::PeerLeft,
            SessionEvent::GameReset,
            SessionEvent::PeerJoined,
        ]
    );

    let mut newcomer = SessionClient::join(GameKind::Tictactoe, room("ABC123"));
    newcomer.on_open();
    newcomer
        .handle(WireMessage::RoomJoined {
            role: Role::SecondMover,
        })
        .unwrap();
    newcomer.handle(WireMessage::PeerJoined).unwrap();
    newcomer.drain_outbox();

    assert_eq!(host.game_state(), newcomer.game_state());
    assert_eq!(host.role(), Role::FirstMover);
    assert!(host.can_move());
    assert!(!newcomer.can_move());

    host.submit_local_move(place(4)).unwrap();
    deliver(&mut host, &mut newcomer);
    assert_eq!(host.game_state(), newcomer.game_state());
    assert!(newcomer.submit_local_move(place(0)).is_ok());
}

#[test]
fn test_first_pairing_does_not_reset() {
    let mut host = SessionClient::create_with_id(GameKind::Tictactoe, room("ABC123"));
    host.on_open();
    host.handle(WireMessage::RoomCreated { room_id: None })
        .unwrap();
    host.drain_events();

    host.handle(WireMessage::PeerJoined).unwrap();
    assert_eq!(host.drain_events(), vec![SessionEvent::PeerJoined]);
}

#[test]
fn test_full_game_ends_on_both_sides() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);

    for (pos, by_host) in [(0, true), (3, false), (1, true), (4, false), (2, true)] {
        if by_host {
            host.submit_local_move(place(pos)).unwrap();
            deliver(&mut host, &mut guest);
        } else {
            guest.submit_local_move(place(pos)).unwrap();
            deliver(&mut guest, &mut host);
        }
    }

    assert_eq!(host.game_state().status, Status::Won(Role::FirstMover));
    assert_eq!(guest.game_state().status, Status::Won(Role::FirstMover));
    assert!(guest
        .drain_events()
        .contains(&SessionEvent::GameOver(Status::Won(Role::FirstMover))));
    assert!(matches!(
        guest.submit_local_move(place(8)),
        Err(SessionError::TurnViolation)
    ));
}

#[test]
fn test_reset_keeps_roles() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);
    host.submit_local_move(place(4)).unwrap();
    deliver(&mut host, &mut guest);

    guest.submit_reset().unwrap();
    assert_eq!(
        guest.drain_outbox(),
        vec![WireMessage::Reset {
            role: Role::SecondMover
        }]
    );
    host.handle(WireMessage::Reset {
        role: Role::SecondMover,
    })
    .unwrap();

    for client in [&host, &guest] {
        assert_eq!(client.game_state().move_count, 0);
        assert_eq!(client.game_state().current_turn, Role::FirstMover);
    }
    assert_eq!(host.role(), Role::FirstMover);
    assert_eq!(guest.role(), Role::SecondMover);
    assert!(host.can_move());
}

#[test]
fn test_chat_limits() {
    let (mut host, mut guest) = open_pair(GameKind::Tictactoe);

    assert!(matches!(host.send_chat("   "), Err(SessionError::EmptyChat)));
    let long = "a".repeat(MAX_CHAT_CHARS + 1);
    assert!(matches!(
        host.send_chat(&long),
        Err(SessionError::ChatTooLong { max: 30 })
    ));
    assert!(host.drain_outbox().is_empty());

    let exact = "好".repeat(MAX_CHAT_CHARS);
    host.send_chat(&exact).unwrap();
    host.send_chat("  good luck  ").unwrap();
    deliver(&mut host, &mut guest);

    let log: Vec<(Role, &str)> = guest
        .chat_log()
        .iter()
        .map(|c| (c.sender, c.message.as_str()))
        .collect();
    assert_eq!(
        log,
        vec![
            (Role::FirstMover, exact.as_str()),
            (Role::FirstMover, "good luck")
        ]
    );
    assert_eq!(host.chat_log().len(), 2);
}

#[test]
fn test_invalid_incoming_moves_are_dropped() {
    let (_host, mut guest) = open_pair(GameKind::Tictactoe);

    // claims to be the guest's own role
    guest
        .on_message(r#"{"type":"move","pos":4,"player":"O"}"#)
        .unwrap();
    // out of range
    guest
        .on_message(r#"{"type":"move","pos":12,"player":"X"}"#)
        .unwrap();
    // no payload
    guest.on_message(r#"{"type":"move","player":"X"}"#).unwrap();

    assert_eq!(guest.game_state().move_count, 0);
    assert!(guest.drain_events().is_empty());
}

#[test]
fn test_unknown_frames_are_reported() {
    let (mut host, _guest) = open_pair(GameKind::Tictactoe);
    assert!(matches!(
        host.on_message(r#"{"type":"shrug"}"#),
        Err(SessionError::UnknownMessage(_))
    ));
    assert!(matches!(
        host.on_message("not json"),
        Err(SessionError::UnknownMessage(_))
    ));
    assert!(matches!(
        host.handle(WireMessage::Leave),
        Err(SessionError::UnknownMessage(_))
    ));
    assert_eq!(host.connection_state(), &ConnectionState::Open);
}

#[test]
fn test_relay_error_closes_the_session() {
    let mut guest = SessionClient::join(GameKind::Tictactoe, room("NOPE01"));
    guest.on_open();
    guest.drain_outbox();
    guest.drain_events();

    guest
        .on_message(r#"{"type":"error","message":"Room NOPE01 not found","code":"room_not_found"}"#)
        .unwrap();

    assert_eq!(guest.connection_state(), &ConnectionState::Closed);
    assert!(!guest.can_move());
    assert_eq!(
        guest.drain_events(),
        vec![
            SessionEvent::RelayError {
                message: "Room NOPE01 not found".into(),
                code: Some(ErrorCode::RoomNotFound),
            },
            SessionEvent::ConnectionChanged(ConnectionState::Closed),
        ]
    );
    assert!(matches!(
        guest.submit_local_move(place(0)),
        Err(SessionError::NotConnected)
    ));
}

#[test]
fn test_duplicate_room_retries_with_fresh_ids() {
    let mut host = SessionClient::create_with_id(GameKind::Tictactoe, room("TAKEN1"));
    host.on_open();
    host.drain_outbox();

    let duplicate = WireMessage::Error {
        message: "Room already exists".into(),
        code: Some(ErrorCode::DuplicateRoom),
    };

    let mut seen = vec![room("TAKEN1")];
    for _ in 0..MAX_CREATE_RETRIES {
        host.handle(duplicate.clone()).unwrap();
        let outbox = host.drain_outbox();
        assert_eq!(outbox.len(), 1);
        let WireMessage::Create { room_id, .. } = &outbox[0] else {
            panic!("expected a create frame, got {:?}", outbox[0]);
        };
        assert_eq!(room_id, host.room_id());
        seen.push(room_id.clone());
        assert_eq!(host.connection_state(), &ConnectionState::Open);
    }
    assert_ne!(seen[0], seen[1]);

    host.handle(duplicate).unwrap();
    assert!(host.drain_outbox().is_empty());
    assert_eq!(host.connection_state(), &ConnectionState::Closed);
}

#[test]
fn test_chess_moves_are_validated_on_both_ends() {
    let (mut host, mut guest) = open_pair(GameKind::Chess);

    let horse = Move::Shift {
        from: Square::new(0, 1),
        to: Square::new(2, 2),
    };
    host.submit_local_move(horse).unwrap();
    deliver(&mut host, &mut guest);
    assert_eq!(guest.game_state(), host.game_state());

    let blocked = Move::Shift {
        from: Square::new(9, 0),
        to: Square::new(5, 0),
    };
    assert!(matches!(
        guest.submit_local_move(blocked),
        Err(SessionError::IllegalMove(_))
    ));
    assert!(guest.drain_outbox().is_empty());
}

#[test]
fn test_transport_loss_unpairs() {
    let (mut host, _guest) = open_pair(GameKind::Tictactoe);
    host.on_error("connection reset");
    assert!(!host.is_paired());
    assert_eq!(
        host.connection_state(),
        &ConnectionState::Errored("connection reset".into())
    );
    assert!(matches!(
        host.send_chat("hi"),
        Err(SessionError::NotConnected)
    ));
}
