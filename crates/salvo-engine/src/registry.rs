//! Room registry: pairs waiting players into sessions.
//!
//! A room is opened by one player and sits in the open pool until a second
//! player joins. Joining matches it exactly once: it leaves the pool, gets
//! a session id, and never comes back.

use std::collections::BTreeMap;

use salvo_protocol::{PlayerId, RoomId, RoomListEntry, SessionId};

use crate::EngineError;

/// A room and its (at most two) occupants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    /// The opener first, then the joiner.
    pub occupants: Vec<PlayerId>,
    /// Set once, when the room matches.
    pub session_id: Option<SessionId>,
}

impl Room {
    /// Open rooms have one occupant and no session.
    pub fn is_open(&self) -> bool {
        self.session_id.is_none() && self.occupants.len() == 1
    }
}

/// The outcome of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub room_id: RoomId,
    pub session_id: SessionId,
    /// `[opener, joiner]`. The opener moves first.
    pub players: [PlayerId; 2],
}

/// Owns every room and hands out room and session ids.
///
/// Not synchronised by itself. The engine keeps it behind one mutex, which
/// makes each `join_room` atomic: of two racing joins on the same room,
/// exactly one sees it open.
#[derive(Debug)]
pub struct RoomRegistry {
    /// `BTreeMap` so listings come out in creation order.
    rooms: BTreeMap<RoomId, Room>,
    next_room_id: u64,
    next_session_id: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
            next_room_id: 1,
            next_session_id: 1,
        }
    }

    /// Opens a room with `player_id` as its only occupant.
    pub fn open_room(&mut self, player_id: PlayerId) -> RoomId {
        let room_id = RoomId(self.next_room_id);
        self.next_room_id += 1;
        self.rooms.insert(
            room_id,
            Room {
                id: room_id,
                occupants: vec![player_id],
                session_id: None,
            },
        );
        tracing::info!(%room_id, %player_id, "room opened");
        room_id
    }

    /// Puts `player_id` into `room_id` and allocates the session id.
    ///
    /// # Errors
    /// - [`EngineError::RoomNotFound`] if there is no such room
    /// - [`EngineError::RoomFull`] if it already matched
    /// - [`EngineError::SelfJoin`] if `player_id` opened it
    pub fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> Result<Match, EngineError> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(EngineError::RoomNotFound(room_id))?;

        if !room.is_open() {
            return Err(EngineError::RoomFull(room_id));
        }
        let opener = room.occupants[0];
        if opener == player_id {
            return Err(EngineError::SelfJoin(player_id, room_id));
        }

        let session_id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        room.occupants.push(player_id);
        room.session_id = Some(session_id);

        tracing::info!(%room_id, %session_id, %opener, joiner = %player_id, "room matched");
        Ok(Match {
            room_id,
            session_id,
            players: [opener, player_id],
        })
    }

    /// Snapshot of every open room, oldest first.
    pub fn list_open_rooms(&self) -> Vec<RoomListEntry> {
        self.rooms
            .values()
            .filter(|room| room.is_open())
            .map(|room| RoomListEntry {
                room_id: room.id,
                occupants: room.occupants.clone(),
            })
            .collect()
    }

    /// Removes every open room `player_id` is waiting in.
    ///
    /// Returns `true` if the open listing changed.
    pub fn withdraw_player(&mut self, player_id: PlayerId) -> bool {
        let before = self.rooms.len();
        self.rooms
            .retain(|_, room| !(room.is_open() && room.occupants.contains(&player_id)));
        let removed = before - self.rooms.len();
        if removed > 0 {
            tracing::info!(%player_id, removed, "open rooms withdrawn");
        }
        removed > 0
    }

    /// Drops the matched room that produced `session_id`.
    pub fn forget_session(&mut self, session_id: SessionId) {
        self.rooms
            .retain(|_, room| room.session_id != Some(session_id));
    }

    pub fn room(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    /// Number of rooms, open or matched.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    #[test]
    fn test_open_room_returns_unique_ids_and_lists_them() {
        let mut reg = RoomRegistry::new();
        let r1 = reg.open_room(pid(1));
        let r2 = reg.open_room(pid(2));

        assert_ne!(r1, r2);
        let listing = reg.list_open_rooms();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].room_id, r1);
        assert_eq!(listing[0].occupants, vec![pid(1)]);
    }

    #[test]
    fn test_join_room_matches_opener_first() {
        let mut reg = RoomRegistry::new();
        let room = reg.open_room(pid(1));

        let m = reg.join_room(pid(2), room).unwrap();

        assert_eq!(m.players, [pid(1), pid(2)]);
        assert_eq!(m.room_id, room);
        assert!(reg.list_open_rooms().is_empty(), "matched rooms leave the pool");
        assert_eq!(reg.room(room).unwrap().session_id, Some(m.session_id));
    }

    #[test]
    fn test_join_room_second_joiner_gets_room_full() {
        let mut reg = RoomRegistry::new();
        let room = reg.open_room(pid(1));
        reg.join_room(pid(2), room).unwrap();

        assert_eq!(reg.join_room(pid(3), room), Err(EngineError::RoomFull(room)));
        assert_eq!(reg.join_room(pid(1), room), Err(EngineError::RoomFull(room)));
    }

    #[test]
    fn test_join_room_unknown_room_is_not_found() {
        let mut reg = RoomRegistry::new();
        assert_eq!(
            reg.join_room(pid(1), RoomId(42)),
            Err(EngineError::RoomNotFound(RoomId(42)))
        );
    }

    #[test]
    fn test_join_room_own_room_is_self_join() {
        let mut reg = RoomRegistry::new();
        let room = reg.open_room(pid(1));

        assert_eq!(
            reg.join_room(pid(1), room),
            Err(EngineError::SelfJoin(pid(1), room))
        );
        assert!(reg.room(room).unwrap().is_open(), "room untouched");
    }

    #[test]
    fn test_join_room_allocates_distinct_session_ids() {
        let mut reg = RoomRegistry::new();
        let r1 = reg.open_room(pid(1));
        let r2 = reg.open_room(pid(3));

        let m1 = reg.join_room(pid(2), r1).unwrap();
        let m2 = reg.join_room(pid(4), r2).unwrap();

        assert_ne!(m1.session_id, m2.session_id);
    }

    #[test]
    fn test_withdraw_player_removes_only_their_open_rooms() {
        let mut reg = RoomRegistry::new();
        let mine = reg.open_room(pid(1));
        let matched = reg.open_room(pid(1));
        reg.join_room(pid(2), matched).unwrap();
        let theirs = reg.open_room(pid(3));

        assert!(reg.withdraw_player(pid(1)));

        assert!(reg.room(mine).is_none());
        assert!(reg.room(matched).is_some(), "matched rooms stay until their session ends");
        assert!(reg.room(theirs).is_some());
        assert!(!reg.withdraw_player(pid(1)), "nothing left to withdraw");
    }

    #[test]
    fn test_forget_session_drops_matched_room() {
        let mut reg = RoomRegistry::new();
        let room = reg.open_room(pid(1));
        let m = reg.join_room(pid(2), room).unwrap();

        reg.forget_session(m.session_id);

        assert!(reg.is_empty());
        assert_eq!(reg.join_room(pid(3), room), Err(EngineError::RoomNotFound(room)));
    }
}
