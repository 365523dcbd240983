#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the level evaluation workspace.
//!
//! This crate defines the value types that connect the level store, the
//! shortest-path engine and the metric scorers. A [`Room`] is the atomic unit
//! of a layout, a [`LevelStamp`] captures which revision of which level a
//! derived result belongs to, and [`LevelError`] enumerates every condition a
//! caller may observe while building or scoring a level.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a room's upper-left corner, used to look rooms up by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomCoord {
    x: u32,
    y: u32,
}

impl RoomCoord {
    /// Creates a new room coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

impl fmt::Display for RoomCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangular room, compared and hashed by value.
///
/// Two rooms with identical fields are interchangeable. The derived ordering
/// (x, then y, then size) is what gives level traversals a deterministic order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Room {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Room {
    /// Creates a room anchored at `(x, y)` spanning `w` by `h` tiles.
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Column of the room's upper-left tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row of the room's upper-left tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Width of the room in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.w
    }

    /// Height of the room in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.h
    }

    /// Coordinate used to resolve the room by position.
    #[must_use]
    pub const fn origin(&self) -> RoomCoord {
        RoomCoord::new(self.x, self.y)
    }

    /// Number of tiles covered by the room.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} room at ({}, {})", self.w, self.h, self.x, self.y)
    }
}

/// Selects how repeated connections between the same pair of rooms are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionPolicy {
    /// Set-backed adjacency: a repeated connection collapses into the existing one.
    #[default]
    Distinct,
    /// Multiset-backed adjacency: every connection is kept, e.g. a door and a
    /// portal joining the same two rooms.
    Parallel,
}

/// Process-unique identifier allocated to each level instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(u64);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifies one revision of one level.
///
/// Derived results keyed by a stamp stay valid exactly as long as the level
/// they were computed from has not been mutated: every mutation bumps the
/// version, so a stale stamp never compares equal to the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelStamp {
    id: LevelId,
    version: u64,
}

impl LevelStamp {
    /// Bundles a level identifier with a version counter.
    #[must_use]
    pub const fn new(id: LevelId, version: u64) -> Self {
        Self { id, version }
    }

    /// Identifier of the stamped level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Version of the level at the time the stamp was taken.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

/// Designated rooms a level must provide before path-based scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomRole {
    /// The room the player enters the level through.
    Start,
    /// The room the player must reach to complete the level.
    Finish,
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Finish => f.write_str("finish"),
        }
    }
}

/// Conditions reported while building or scoring a level.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum LevelError {
    /// No registered room is anchored at the requested coordinate.
    #[error("no room is anchored at {coord}")]
    RoomNotFound {
        /// Coordinate that failed to resolve.
        coord: RoomCoord,
    },
    /// A room was wired into a relation before being added to the level.
    #[error("{room} is not registered in the level")]
    UnregisteredRoom {
        /// Room missing from the level.
        room: Room,
    },
    /// A path-based metric was scored against a level lacking a start or finish room.
    #[error("level not fully specified: no {role} room")]
    LevelNotFullySpecified {
        /// Designation that is missing.
        role: RoomRole,
    },
    /// The metric has no meaningful value for this level.
    #[error("{metric} is undefined for this level: {reason}")]
    Undefined {
        /// Title of the metric that could not be scored.
        metric: &'static str,
        /// Short description of the degenerate input.
        reason: &'static str,
    },
    /// The finish room cannot be reached from the start room.
    #[error("{finish} is unreachable from {start}")]
    FinishUnreachable {
        /// Designated start room.
        start: Room,
        /// Designated finish room.
        finish: Room,
    },
}

#[cfg(test)]
mod tests {
    use super::{LevelError, LevelId, LevelStamp, Room, RoomCoord, RoomRole};

    #[test]
    fn room_area_multiplies_dimensions() {
        assert_eq!(Room::new(3, 4, 2, 5).area(), 10);
        assert_eq!(Room::new(0, 0, 0, 7).area(), 0);
    }

    #[test]
    fn room_area_does_not_overflow_u32() {
        let room = Room::new(0, 0, u32::MAX, 2);
        assert_eq!(room.area(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn rooms_compare_by_value() {
        assert_eq!(Room::new(1, 2, 3, 4), Room::new(1, 2, 3, 4));
        assert_ne!(Room::new(1, 2, 3, 4), Room::new(1, 2, 4, 3));
        assert!(Room::new(0, 9, 1, 1) < Room::new(1, 0, 1, 1));
    }

    #[test]
    fn origin_matches_anchor() {
        assert_eq!(Room::new(7, 3, 2, 2).origin(), RoomCoord::new(7, 3));
    }

    #[test]
    fn stamps_differ_across_versions_and_levels() {
        let first = LevelStamp::new(LevelId::new(1), 4);
        assert_eq!(first, LevelStamp::new(LevelId::new(1), 4));
        assert_ne!(first, LevelStamp::new(LevelId::new(1), 5));
        assert_ne!(first, LevelStamp::new(LevelId::new(2), 4));
    }

    #[test]
    fn room_round_trips_through_bincode() {
        let room = Room::new(5, 7, 2, 3);
        let bytes = bincode::serialize(&room).expect("serialize");
        let restored: Room = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, room);
    }

    #[test]
    fn errors_render_readable_messages() {
        let missing = LevelError::LevelNotFullySpecified {
            role: RoomRole::Finish,
        };
        assert_eq!(missing.to_string(), "level not fully specified: no finish room");

        let not_found = LevelError::RoomNotFound {
            coord: RoomCoord::new(3, 1),
        };
        assert_eq!(not_found.to_string(), "no room is anchored at (3, 1)");
    }
}
