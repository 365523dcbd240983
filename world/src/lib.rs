#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level graph store.
//!
//! A [`Level`] owns the rooms of a generated layout, the symmetric adjacency
//! relation between them, the designated start/finish rooms and the set of
//! dangerous rooms. Every structural mutation bumps a version counter so that
//! derived results can be cached against a [`LevelStamp`] and invalidated as
//! soon as the level changes.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicU64, Ordering},
};

use level_eval_core::{ConnectionPolicy, LevelError, LevelId, LevelStamp, Room, RoomCoord};

static NEXT_LEVEL_ID: AtomicU64 = AtomicU64::new(1);

/// Mutable graph of rooms and connections describing one generated level.
///
/// Levels do not implement `Clone`: the identifier allocated at
/// construction must stay unique to one instance for cache keys to be sound.
#[derive(Debug)]
pub struct Level {
    id: LevelId,
    total_size: u64,
    policy: ConnectionPolicy,
    rooms: BTreeSet<Room>,
    connections: BTreeMap<Room, Vec<Room>>,
    start_room: Option<Room>,
    finish_room: Option<Room>,
    dangerous_rooms: BTreeSet<Room>,
    version: u64,
}

impl Level {
    /// Creates an empty level holding at most `total_size` tiles.
    #[must_use]
    pub fn new(total_size: u64, policy: ConnectionPolicy) -> Self {
        let id = LevelId::new(NEXT_LEVEL_ID.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(level_id = id.get(), total_size, ?policy, "created level");
        Self {
            id,
            total_size,
            policy,
            rooms: BTreeSet::new(),
            connections: BTreeMap::new(),
            start_room: None,
            finish_room: None,
            dangerous_rooms: BTreeSet::new(),
            version: 0,
        }
    }

    /// Identifier allocated to this level instance.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Number of structural mutations applied so far.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Captures the identity and current version of the level.
    #[must_use]
    pub const fn stamp(&self) -> LevelStamp {
        LevelStamp::new(self.id, self.version)
    }

    /// Maximum tile count the level could hold, used to normalise scores.
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Storage policy selected for repeated connections.
    #[must_use]
    pub const fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Iterator over the registered rooms in ascending order.
    pub fn rooms(&self) -> impl ExactSizeIterator<Item = &Room> + '_ {
        self.rooms.iter()
    }

    /// Number of registered rooms.
    #[must_use]
    pub fn num_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Reports whether the room is registered in the level.
    #[must_use]
    pub fn contains_room(&self, room: Room) -> bool {
        self.rooms.contains(&room)
    }

    /// Room the level starts in, if one was designated.
    #[must_use]
    pub const fn start_room(&self) -> Option<Room> {
        self.start_room
    }

    /// Room the level finishes in, if one was designated.
    #[must_use]
    pub const fn finish_room(&self) -> Option<Room> {
        self.finish_room
    }

    /// Iterator over the rooms marked as dangerous.
    pub fn dangerous_rooms(&self) -> impl ExactSizeIterator<Item = &Room> + '_ {
        self.dangerous_rooms.iter()
    }

    /// Reports whether the room was marked as dangerous.
    #[must_use]
    pub fn is_dangerous(&self, room: Room) -> bool {
        self.dangerous_rooms.contains(&room)
    }

    /// Registers a room. Returns `false` without bumping the version when the
    /// room is already present.
    pub fn add_room(&mut self, room: Room) -> bool {
        if !self.rooms.insert(room) {
            return false;
        }

        self.bump();
        true
    }

    /// Connects two registered rooms in both directions.
    ///
    /// Returns whether either side's adjacency changed. Under
    /// [`ConnectionPolicy::Distinct`] a repeated connection is a no-op; under
    /// [`ConnectionPolicy::Parallel`] it is always recorded again.
    pub fn add_connection(&mut self, first: Room, second: Room) -> Result<bool, LevelError> {
        self.ensure_registered(first)?;
        self.ensure_registered(second)?;

        let forward = self.link(first, second);
        let backward = self.link(second, first);
        let changed = forward || backward;
        if changed {
            self.bump();
        }

        Ok(changed)
    }

    /// Connects the rooms anchored at the two coordinates.
    pub fn connect_at(&mut self, first: RoomCoord, second: RoomCoord) -> Result<bool, LevelError> {
        let first = self.resolve(first)?;
        let second = self.resolve(second)?;
        self.add_connection(first, second)
    }

    /// Finds the room anchored at `(x, y)` by scanning the registered rooms.
    #[must_use]
    pub fn find_room(&self, x: u32, y: u32) -> Option<Room> {
        self.rooms
            .iter()
            .find(|room| room.x() == x && room.y() == y)
            .copied()
    }

    /// Designates the room anchored at `(x, y)` as the start room.
    ///
    /// Returns whether the designation changed. An unresolved coordinate is
    /// reported as [`LevelError::RoomNotFound`] and leaves the previous start
    /// room in place.
    pub fn set_start_room(&mut self, x: u32, y: u32) -> Result<bool, LevelError> {
        let room = self.resolve(RoomCoord::new(x, y))?;
        if self.start_room == Some(room) {
            return Ok(false);
        }

        self.start_room = Some(room);
        self.bump();
        Ok(true)
    }

    /// Designates the room anchored at `(x, y)` as the finish room.
    ///
    /// Behaves like [`Level::set_start_room`].
    pub fn set_finish_room(&mut self, x: u32, y: u32) -> Result<bool, LevelError> {
        let room = self.resolve(RoomCoord::new(x, y))?;
        if self.finish_room == Some(room) {
            return Ok(false);
        }

        self.finish_room = Some(room);
        self.bump();
        Ok(true)
    }

    /// Marks the room anchored at `(x, y)` as dangerous.
    pub fn set_dangerous_room(&mut self, x: u32, y: u32) -> Result<bool, LevelError> {
        let room = self.resolve(RoomCoord::new(x, y))?;
        if !self.dangerous_rooms.insert(room) {
            return Ok(false);
        }

        self.bump();
        Ok(true)
    }

    /// Rooms adjacent to `room`, materialised into a new list.
    #[must_use]
    pub fn connections(&self, room: Room) -> Vec<Room> {
        self.neighbors(room).to_vec()
    }

    /// Rooms adjacent to `room`; empty when the room has no connections.
    #[must_use]
    pub fn neighbors(&self, room: Room) -> &[Room] {
        self.connections
            .get(&room)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of connections recorded for `room`.
    #[must_use]
    pub fn degree(&self, room: Room) -> usize {
        self.neighbors(room).len()
    }

    fn resolve(&self, coord: RoomCoord) -> Result<Room, LevelError> {
        self.find_room(coord.x(), coord.y())
            .ok_or(LevelError::RoomNotFound { coord })
    }

    fn ensure_registered(&self, room: Room) -> Result<(), LevelError> {
        if self.rooms.contains(&room) {
            Ok(())
        } else {
            Err(LevelError::UnregisteredRoom { room })
        }
    }

    fn link(&mut self, from: Room, to: Room) -> bool {
        let adjacent = self.connections.entry(from).or_default();
        match self.policy {
            ConnectionPolicy::Distinct if adjacent.contains(&to) => false,
            ConnectionPolicy::Distinct | ConnectionPolicy::Parallel => {
                adjacent.push(to);
                true
            }
        }
    }

    fn bump(&mut self) {
        self.version += 1;
        tracing::trace!(level_id = self.id.get(), version = self.version, "level mutated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(policy: ConnectionPolicy) -> (Level, [Room; 3]) {
        let rooms = [
            Room::new(0, 0, 2, 2),
            Room::new(2, 0, 1, 2),
            Room::new(3, 0, 2, 2),
        ];
        let mut level = Level::new(16, policy);
        for room in rooms {
            assert!(level.add_room(room));
        }
        (level, rooms)
    }

    #[test]
    fn add_room_is_idempotent() {
        let mut level = Level::new(10, ConnectionPolicy::Distinct);
        let room = Room::new(1, 1, 2, 2);

        assert!(level.add_room(room));
        let version = level.version();
        assert!(!level.add_room(room));

        assert_eq!(level.num_rooms(), 1);
        assert_eq!(level.version(), version, "re-adding must not bump the version");
    }

    #[test]
    fn connections_are_symmetric() {
        let (mut level, [a, b, c]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.add_connection(a, b), Ok(true));
        assert_eq!(level.add_connection(c, b), Ok(true));

        assert_eq!(level.connections(a), vec![b]);
        assert_eq!(level.connections(b), vec![a, c]);
        assert_eq!(level.connections(c), vec![b]);
    }

    #[test]
    fn distinct_policy_collapses_repeated_connections() {
        let (mut level, [a, b, _]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.add_connection(a, b), Ok(true));
        let version = level.version();
        assert_eq!(level.add_connection(b, a), Ok(false));

        assert_eq!(level.degree(a), 1);
        assert_eq!(level.version(), version);
    }

    #[test]
    fn parallel_policy_keeps_repeated_connections() {
        let (mut level, [a, b, _]) = corridor(ConnectionPolicy::Parallel);

        assert_eq!(level.add_connection(a, b), Ok(true));
        let version = level.version();
        assert_eq!(level.add_connection(a, b), Ok(true));

        assert_eq!(level.connections(a), vec![b, b]);
        assert_eq!(level.connections(b), vec![a, a]);
        assert_eq!(level.version(), version + 1);
    }

    #[test]
    fn connecting_unregistered_room_is_rejected() {
        let (mut level, [a, _, _]) = corridor(ConnectionPolicy::Distinct);
        let stray = Room::new(9, 9, 1, 1);
        let version = level.version();

        assert_eq!(
            level.add_connection(a, stray),
            Err(LevelError::UnregisteredRoom { room: stray })
        );
        assert!(level.connections(a).is_empty());
        assert_eq!(level.version(), version);
    }

    #[test]
    fn connect_at_resolves_coordinates() {
        let (mut level, [a, _, c]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(
            level.connect_at(RoomCoord::new(0, 0), RoomCoord::new(3, 0)),
            Ok(true)
        );
        assert_eq!(level.connections(a), vec![c]);
        assert_eq!(
            level.connect_at(RoomCoord::new(0, 0), RoomCoord::new(1, 0)),
            Err(LevelError::RoomNotFound {
                coord: RoomCoord::new(1, 0)
            })
        );
    }

    #[test]
    fn find_room_matches_anchor_only() {
        let (level, [_, b, _]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.find_room(2, 0), Some(b));
        assert_eq!(level.find_room(1, 0), None, "interior tiles do not resolve");
    }

    #[test]
    fn start_room_replaces_previous_designation() {
        let (mut level, [a, b, _]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.set_start_room(0, 0), Ok(true));
        assert_eq!(level.start_room(), Some(a));
        let version = level.version();

        assert_eq!(level.set_start_room(0, 0), Ok(false));
        assert_eq!(level.version(), version);

        assert_eq!(level.set_start_room(2, 0), Ok(true));
        assert_eq!(level.start_room(), Some(b));
        assert_eq!(level.version(), version + 1);
    }

    #[test]
    fn unresolved_finish_room_keeps_previous_value() {
        let (mut level, [_, _, c]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.set_finish_room(3, 0), Ok(true));
        let version = level.version();

        assert_eq!(
            level.set_finish_room(8, 8),
            Err(LevelError::RoomNotFound {
                coord: RoomCoord::new(8, 8)
            })
        );
        assert_eq!(level.finish_room(), Some(c));
        assert_eq!(level.version(), version);
    }

    #[test]
    fn dangerous_rooms_accumulate() {
        let (mut level, [a, _, c]) = corridor(ConnectionPolicy::Distinct);

        assert_eq!(level.set_dangerous_room(0, 0), Ok(true));
        assert_eq!(level.set_dangerous_room(3, 0), Ok(true));
        assert_eq!(level.set_dangerous_room(3, 0), Ok(false));

        let dangerous: Vec<Room> = level.dangerous_rooms().copied().collect();
        assert_eq!(dangerous, vec![a, c]);
        assert!(level.is_dangerous(a));
    }

    #[test]
    fn levels_receive_distinct_identifiers() {
        let first = Level::new(4, ConnectionPolicy::Distinct);
        let second = Level::new(4, ConnectionPolicy::Distinct);

        assert_ne!(first.id(), second.id());
        assert_ne!(first.stamp(), second.stamp());
    }

    #[test]
    fn version_never_decreases() {
        let (mut level, [a, b, c]) = corridor(ConnectionPolicy::Parallel);
        let mut last = level.version();

        let _ = level.add_connection(a, b);
        assert!(level.version() > last);
        last = level.version();

        let _ = level.set_start_room(0, 0);
        assert!(level.version() > last);
        last = level.version();

        let _ = level.add_room(c);
        assert_eq!(level.version(), last);
    }
}
