use std::{fs, path::Path};

use anyhow::{Context, Result};
use level_eval_core::{ConnectionPolicy, Room, RoomCoord};
use level_eval_world::Level;
use serde::{Deserialize, Serialize};

/// Level layout as written in a TOML level file.
///
/// ```toml
/// total_size = 16
/// rooms = [{ x = 0, y = 0, w = 2, h = 2 }, { x = 2, y = 0, w = 2, h = 2 }]
/// connections = [[{ x = 0, y = 0 }, { x = 2, y = 0 }]]
/// start = { x = 0, y = 0 }
/// finish = { x = 2, y = 0 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LevelDescription {
    /// Tile capacity of the level's bounding area.
    pub(crate) total_size: u64,
    /// Records repeated connections instead of collapsing them.
    #[serde(default)]
    pub(crate) parallel_connections: bool,
    /// Rooms composing the level.
    pub(crate) rooms: Vec<Room>,
    /// Connected room pairs, each room named by its anchor.
    #[serde(default)]
    pub(crate) connections: Vec<(RoomCoord, RoomCoord)>,
    /// Anchor of the start room.
    #[serde(default)]
    pub(crate) start: Option<RoomCoord>,
    /// Anchor of the finish room.
    #[serde(default)]
    pub(crate) finish: Option<RoomCoord>,
    /// Anchors of the dangerous rooms.
    #[serde(default)]
    pub(crate) dangerous: Vec<RoomCoord>,
}

impl LevelDescription {
    /// Reads and parses a level file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse level file {}", path.display()))
    }

    /// Parses a level description from TOML.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds the level through its public mutators.
    pub(crate) fn build(&self) -> Result<Level> {
        let policy = if self.parallel_connections {
            ConnectionPolicy::Parallel
        } else {
            ConnectionPolicy::Distinct
        };
        let mut level = Level::new(self.total_size, policy);

        for room in &self.rooms {
            if !level.add_room(*room) {
                tracing::warn!(%room, "ignoring duplicate room");
            }
        }

        for (first, second) in &self.connections {
            let _ = level
                .connect_at(*first, *second)
                .with_context(|| format!("cannot connect {first} to {second}"))?;
        }

        if let Some(start) = self.start {
            let _ = level
                .set_start_room(start.x(), start.y())
                .context("invalid start room")?;
        }
        if let Some(finish) = self.finish {
            let _ = level
                .set_finish_room(finish.x(), finish.y())
                .context("invalid finish room")?;
        }
        for coord in &self.dangerous {
            let _ = level
                .set_dangerous_room(coord.x(), coord.y())
                .context("invalid dangerous room")?;
        }

        tracing::info!(
            level_id = level.id().get(),
            rooms = level.num_rooms(),
            version = level.version(),
            "loaded level"
        );

        Ok(level)
    }
}
