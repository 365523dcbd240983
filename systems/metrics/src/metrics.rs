use std::collections::{BTreeMap, BTreeSet};

use level_eval_core::{LevelError, Room, RoomRole};
use level_eval_system_navigation::PathEngine;
use level_eval_world::Level;

use crate::MetricKind;

/// Occupied tiles over the level's capacity.
pub(crate) fn density(level: &Level) -> Result<f64, LevelError> {
    let capacity = capacity(level, MetricKind::Density)?;
    Ok(occupied_area(level) as f64 / capacity)
}

/// Room count over the level's capacity, i.e. relative to a level filled with 1x1 rooms.
pub(crate) fn room_count(level: &Level) -> Result<f64, LevelError> {
    let capacity = capacity(level, MetricKind::RoomCount)?;
    Ok(level.num_rooms() as f64 / capacity)
}

/// Mean room area relative to the largest room the generator may place.
pub(crate) fn average_room_size(level: &Level, max_room_area: u64) -> Result<f64, LevelError> {
    let rooms = require_rooms(level, MetricKind::AverageRoomSize)?;
    if max_room_area == 0 {
        return Err(undefined(MetricKind::AverageRoomSize, "maximum room area is zero"));
    }

    Ok(occupied_area(level) as f64 / (rooms * max_room_area as f64))
}

/// Mean of `1 / (degree - 1)` over rooms with at least two connections.
///
/// Dead ends and isolated rooms do not contribute.
pub(crate) fn map_linearity(level: &Level) -> Result<f64, LevelError> {
    let mut total = 0.0;
    let mut count = 0usize;

    for &room in level.rooms() {
        let degree = level.degree(room);
        if degree < 2 {
            continue;
        }

        count += 1;
        total += 1.0 / (degree - 1) as f64;
    }

    if count == 0 {
        return Err(undefined(
            MetricKind::MapLinearity,
            "no room has two or more connections",
        ));
    }

    Ok(total / count as f64)
}

/// Share of rooms left off the optimal start-to-finish path.
pub(crate) fn path_redundancy(level: &Level, engine: &mut PathEngine) -> Result<f64, LevelError> {
    let route = optimal_path(level, engine)?;
    let rooms = level.num_rooms() as f64;
    Ok((rooms - route.len() as f64) / rooms)
}

/// Mean distance of off-path rooms to the optimal path, over `num_rooms / 2`.
pub(crate) fn exploration(level: &Level, engine: &mut PathEngine) -> Result<f64, LevelError> {
    let route: BTreeSet<Room> = optimal_path(level, engine)?.into_iter().collect();
    let ceiling = room_ceiling(level);
    let mut off_path: BTreeMap<Room, u32> = level
        .rooms()
        .filter(|room| !route.contains(*room))
        .map(|room| (*room, ceiling))
        .collect();

    if off_path.is_empty() {
        return Ok(0.0);
    }

    for &path_room in &route {
        let search = engine.search(level, path_room, None)?;
        for (room, closest) in &mut off_path {
            if let Some(distance) = search.distance(*room) {
                *closest = (*closest).min(distance);
            }
        }
    }

    let mean = mean_distance(off_path.values());
    Ok(mean / (level.num_rooms() as f64 / 2.0))
}

/// Mean distance from path rooms to the nearest dangerous room, over `num_rooms`.
///
/// Levels without dangerous rooms are maximally safe and score exactly `1.0`,
/// whatever their topology.
pub(crate) fn proximity_to_danger(
    level: &Level,
    engine: &mut PathEngine,
) -> Result<f64, LevelError> {
    let _ = designated_rooms(level)?;
    if level.dangerous_rooms().next().is_none() {
        return Ok(1.0);
    }

    let route = optimal_path(level, engine)?;
    let ceiling = room_ceiling(level);
    let mut closest_danger: BTreeMap<Room, u32> =
        route.iter().map(|room| (*room, ceiling)).collect();

    for &source in level.dangerous_rooms() {
        let search = engine.search(level, source, None)?;
        for (room, closest) in &mut closest_danger {
            if let Some(distance) = search.distance(*room) {
                *closest = (*closest).min(distance);
            }
        }
    }

    let mean = mean_distance(closest_danger.values());
    Ok(mean / level.num_rooms() as f64)
}

fn optimal_path(level: &Level, engine: &mut PathEngine) -> Result<Vec<Room>, LevelError> {
    let (start, finish) = designated_rooms(level)?;
    let search = engine.search(level, start, Some(finish))?;
    let route = search.path(finish);
    if route.is_empty() {
        return Err(LevelError::FinishUnreachable { start, finish });
    }

    Ok(route.to_vec())
}

fn designated_rooms(level: &Level) -> Result<(Room, Room), LevelError> {
    let start = level
        .start_room()
        .ok_or(LevelError::LevelNotFullySpecified {
            role: RoomRole::Start,
        })?;
    let finish = level
        .finish_room()
        .ok_or(LevelError::LevelNotFullySpecified {
            role: RoomRole::Finish,
        })?;

    Ok((start, finish))
}

fn capacity(level: &Level, metric: MetricKind) -> Result<f64, LevelError> {
    let _ = require_rooms(level, metric)?;
    if level.total_size() == 0 {
        return Err(undefined(metric, "total size is zero"));
    }

    Ok(level.total_size() as f64)
}

fn require_rooms(level: &Level, metric: MetricKind) -> Result<f64, LevelError> {
    match level.num_rooms() {
        0 => Err(undefined(metric, "level has no rooms")),
        rooms => Ok(rooms as f64),
    }
}

fn occupied_area(level: &Level) -> u64 {
    level.rooms().map(Room::area).sum()
}

// Seed for "closest" searches; unreachable rooms never beat it.
fn room_ceiling(level: &Level) -> u32 {
    u32::try_from(level.num_rooms()).unwrap_or(u32::MAX)
}

fn mean_distance<'a>(distances: impl ExactSizeIterator<Item = &'a u32>) -> f64 {
    let count = distances.len();
    let total: u64 = distances.map(|distance| u64::from(*distance)).sum();
    total as f64 / count as f64
}

fn undefined(metric: MetricKind, reason: &'static str) -> LevelError {
    LevelError::Undefined {
        metric: metric.title(),
        reason,
    }
}
