//! Integration tests for the Salvo server, handler, and full connection flow.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use salvo::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = SalvoServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(PlayerRegistry::new())
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, command: ClientCommand) {
    let bytes = serde_json::to_vec(&Envelope::new(0, command)).expect("encode");
    ws.send(Message::Binary(bytes.into())).await.expect("send");
}

async fn recv(ws: &mut ClientWs) -> Envelope<ServerEvent> {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("recv");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Reads events until one matches, discarding the rest.
async fn recv_until(
    ws: &mut ClientWs,
    mut want: impl FnMut(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = recv(ws).await.payload;
        if want(&event) {
            return event;
        }
    }
}

/// Connects and registers `name`, consuming the welcome events.
async fn player(addr: &str, name: &str) -> (ClientWs, PlayerId) {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        ClientCommand::Register {
            name: name.into(),
            password: "pw".into(),
        },
    )
    .await;
    let ServerEvent::Registered { player_id, .. } =
        recv_until(&mut ws, |e| matches!(e, ServerEvent::Registered { .. })).await
    else {
        unreachable!()
    };
    recv_until(&mut ws, |e| matches!(e, ServerEvent::LeaderboardChanged { .. })).await;
    (ws, player_id)
}

/// Alice opens a room, Bob joins it. Returns the session id.
async fn matched(alice: &mut ClientWs, bob: &mut ClientWs) -> SessionId {
    send(alice, ClientCommand::OpenRoom).await;
    let ServerEvent::RoomOpened { room_id } =
        recv_until(alice, |e| matches!(e, ServerEvent::RoomOpened { .. })).await
    else {
        unreachable!()
    };

    send(bob, ClientCommand::JoinRoom { room_id }).await;
    let ServerEvent::SessionCreated { session_id, .. } =
        recv_until(bob, |e| matches!(e, ServerEvent::SessionCreated { .. })).await
    else {
        unreachable!()
    };
    recv_until(alice, |e| matches!(e, ServerEvent::SessionCreated { .. })).await;
    session_id
}

fn one_ship(x: u8, y: u8, length: u8) -> Vec<Ship> {
    vec![Ship::new(Coord::new(x, y), Orientation::Horizontal, length)]
}

fn is_error(code: u16) -> impl Fn(&ServerEvent) -> bool {
    move |e| matches!(e, ServerEvent::Error { code: c, .. } if *c == code)
}

// =========================================================================
// Registration
// =========================================================================

#[tokio::test]
async fn test_register_sends_welcome_sequence() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        ClientCommand::Register {
            name: "alice".into(),
            password: "pw".into(),
        },
    )
    .await;

    let first = recv(&mut ws).await;
    assert_eq!(first.seq, 1);
    assert_eq!(
        first.payload,
        ServerEvent::Registered {
            player_id: PlayerId(1),
            name: "alice".into(),
        }
    );
    let second = recv(&mut ws).await;
    assert_eq!(second.seq, 2);
    assert_eq!(second.payload, ServerEvent::RoomListChanged { rooms: vec![] });
    let third = recv(&mut ws).await;
    assert_eq!(
        third.payload,
        ServerEvent::LeaderboardChanged {
            entries: vec![LeaderboardEntry {
                player_id: PlayerId(1),
                wins: 0,
            }],
        }
    );
}

#[tokio::test]
async fn test_command_before_register_is_unauthorized() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, ClientCommand::OpenRoom).await;

    let event = recv(&mut ws).await.payload;
    assert!(is_error(401)(&event), "got {event:?}");
}

#[tokio::test]
async fn test_register_wrong_password_is_unauthorized() {
    let addr = start_server().await;
    let (_alice, _) = player(&addr, "alice").await;

    let mut imposter = connect(&addr).await;
    send(
        &mut imposter,
        ClientCommand::Register {
            name: "alice".into(),
            password: "guess".into(),
        },
    )
    .await;

    let event = recv(&mut imposter).await.payload;
    assert!(is_error(401)(&event), "got {event:?}");
}

#[tokio::test]
async fn test_register_new_player_is_broadcast_on_leaderboard() {
    let addr = start_server().await;
    let (mut alice, alice_id) = player(&addr, "alice").await;
    let (_bob, bob_id) = player(&addr, "bob").await;

    let event = recv_until(&mut alice, |e| {
        matches!(e, ServerEvent::LeaderboardChanged { entries } if entries.len() == 2)
    })
    .await;
    assert_eq!(
        event,
        ServerEvent::LeaderboardChanged {
            entries: vec![
                LeaderboardEntry { player_id: alice_id, wins: 0 },
                LeaderboardEntry { player_id: bob_id, wins: 0 },
            ],
        }
    );
}

#[tokio::test]
async fn test_register_same_credentials_keeps_player_id() {
    let addr = start_server().await;
    let (first, id) = player(&addr, "alice").await;
    drop(first);

    let (_second, again) = player(&addr, "alice").await;
    assert_eq!(id, again);
}

#[tokio::test]
async fn test_malformed_frame_is_bad_request_and_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("{not json".into())).await.expect("send");
    let event = recv(&mut ws).await.payload;
    assert!(is_error(400)(&event), "got {event:?}");

    // Text frames with valid JSON are accepted too.
    let register = serde_json::to_string(&Envelope::new(
        1,
        ClientCommand::Register {
            name: "bob".into(),
            password: "pw".into(),
        },
    ))
    .expect("encode");
    ws.send(Message::Text(register.into())).await.expect("send");
    let event = recv(&mut ws).await.payload;
    assert!(matches!(event, ServerEvent::Registered { .. }), "got {event:?}");
}

// =========================================================================
// Rooms
// =========================================================================

#[tokio::test]
async fn test_open_room_is_broadcast_to_lobby() {
    let addr = start_server().await;
    let (mut alice, alice_id) = player(&addr, "alice").await;
    let (mut bob, _) = player(&addr, "bob").await;

    send(&mut alice, ClientCommand::OpenRoom).await;

    let event = recv_until(&mut bob, |e| {
        matches!(e, ServerEvent::RoomListChanged { rooms } if !rooms.is_empty())
    })
    .await;
    let ServerEvent::RoomListChanged { rooms } = event else {
        unreachable!()
    };
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].occupants, vec![alice_id]);

    send(&mut bob, ClientCommand::ListRooms).await;
    let listing = recv_until(&mut bob, |e| matches!(e, ServerEvent::RoomListChanged { .. })).await;
    assert_eq!(listing, ServerEvent::RoomListChanged { rooms });
}

#[tokio::test]
async fn test_join_own_room_is_conflict() {
    let addr = start_server().await;
    let (mut alice, _) = player(&addr, "alice").await;

    send(&mut alice, ClientCommand::OpenRoom).await;
    let ServerEvent::RoomOpened { room_id } =
        recv_until(&mut alice, |e| matches!(e, ServerEvent::RoomOpened { .. })).await
    else {
        unreachable!()
    };
    send(&mut alice, ClientCommand::JoinRoom { room_id }).await;

    recv_until(&mut alice, is_error(409)).await;
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let addr = start_server().await;
    let (mut alice, _) = player(&addr, "alice").await;

    send(&mut alice, ClientCommand::JoinRoom { room_id: RoomId(99) }).await;

    recv_until(&mut alice, is_error(404)).await;
}

// =========================================================================
// Full game
// =========================================================================

#[tokio::test]
async fn test_full_game_hit_kill_win() {
    let addr = start_server().await;
    let (mut alice, alice_id) = player(&addr, "alice").await;
    let (mut bob, bob_id) = player(&addr, "bob").await;
    let session_id = matched(&mut alice, &mut bob).await;

    send(
        &mut alice,
        ClientCommand::SubmitFleet {
            session_id,
            ships: one_ship(5, 5, 1),
        },
    )
    .await;
    send(
        &mut bob,
        ClientCommand::SubmitFleet {
            session_id,
            ships: one_ship(0, 0, 2),
        },
    )
    .await;

    let started = recv_until(&mut bob, |e| matches!(e, ServerEvent::SessionStarted { .. })).await;
    assert_eq!(
        started,
        ServerEvent::SessionStarted {
            session_id,
            ships: one_ship(0, 0, 2),
            turn: alice_id,
        }
    );
    recv_until(&mut alice, |e| matches!(e, ServerEvent::TurnChanged { .. })).await;

    send(&mut alice, ClientCommand::Attack { session_id, x: 0, y: 0 }).await;
    let hit = recv_until(&mut bob, |e| matches!(e, ServerEvent::AttackResolved { .. })).await;
    assert!(matches!(
        hit,
        ServerEvent::AttackResolved { outcome: AttackOutcome::Hit, .. }
    ));

    send(&mut alice, ClientCommand::Attack { session_id, x: 1, y: 0 }).await;
    let kill = recv_until(&mut bob, |e| matches!(e, ServerEvent::AttackResolved { .. })).await;
    assert!(matches!(
        kill,
        ServerEvent::AttackResolved { outcome: AttackOutcome::Kill, .. }
    ));
    // The winning shot is followed directly by the finish.
    assert_eq!(
        recv(&mut bob).await.payload,
        ServerEvent::SessionFinished {
            session_id,
            winner: Some(alice_id),
        }
    );

    let board = recv_until(&mut alice, |e| {
        matches!(e, ServerEvent::LeaderboardChanged { entries } if entries.iter().any(|x| x.wins > 0))
    })
    .await;
    assert_eq!(
        board,
        ServerEvent::LeaderboardChanged {
            entries: vec![
                LeaderboardEntry {
                    player_id: alice_id,
                    wins: 1,
                },
                LeaderboardEntry {
                    player_id: bob_id,
                    wins: 0,
                },
            ],
        }
    );

    // The session is gone once finished.
    send(&mut alice, ClientCommand::Attack { session_id, x: 2, y: 0 }).await;
    recv_until(&mut alice, is_error(404)).await;
}

#[tokio::test]
async fn test_attack_out_of_turn_is_conflict() {
    let addr = start_server().await;
    let (mut alice, _) = player(&addr, "alice").await;
    let (mut bob, _) = player(&addr, "bob").await;
    let session_id = matched(&mut alice, &mut bob).await;

    send(&mut alice, ClientCommand::SubmitFleet { session_id, ships: one_ship(5, 5, 1) }).await;
    send(&mut bob, ClientCommand::SubmitFleet { session_id, ships: one_ship(0, 0, 2) }).await;
    recv_until(&mut bob, |e| matches!(e, ServerEvent::TurnChanged { .. })).await;

    send(&mut bob, ClientCommand::Attack { session_id, x: 5, y: 5 }).await;

    recv_until(&mut bob, is_error(409)).await;
}

#[tokio::test]
async fn test_random_attack_resolves_for_both_players() {
    let addr = start_server().await;
    let (mut alice, alice_id) = player(&addr, "alice").await;
    let (mut bob, _) = player(&addr, "bob").await;
    let session_id = matched(&mut alice, &mut bob).await;

    send(&mut alice, ClientCommand::SubmitFleet { session_id, ships: one_ship(5, 5, 1) }).await;
    send(&mut bob, ClientCommand::SubmitFleet { session_id, ships: one_ship(0, 0, 2) }).await;
    recv_until(&mut alice, |e| matches!(e, ServerEvent::TurnChanged { .. })).await;

    send(&mut alice, ClientCommand::RandomAttack { session_id }).await;

    for ws in [&mut alice, &mut bob] {
        let event = recv_until(ws, |e| matches!(e, ServerEvent::AttackResolved { .. })).await;
        assert!(matches!(
            event,
            ServerEvent::AttackResolved { attacker, .. } if attacker == alice_id
        ));
    }
}

#[tokio::test]
async fn test_disconnect_abandons_session() {
    let addr = start_server().await;
    let (mut alice, _) = player(&addr, "alice").await;
    let (mut bob, _) = player(&addr, "bob").await;
    let session_id = matched(&mut alice, &mut bob).await;

    bob.close(None).await.expect("close");
    drop(bob);

    let finished =
        recv_until(&mut alice, |e| matches!(e, ServerEvent::SessionFinished { .. })).await;
    assert_eq!(
        finished,
        ServerEvent::SessionFinished {
            session_id,
            winner: None,
        }
    );
}
