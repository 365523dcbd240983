#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest-path engine over a level's room graph.
//!
//! [`PathEngine::search`] runs a single-source Dijkstra search from a start
//! room, optionally stopping once a finish room is settled, and reconstructs
//! the path to every settled room. Every connection has unit weight, so the
//! search settles rooms in breadth-first order; the priority queue keeps the
//! general form so weighted connections would only change the relaxation step.
//!
//! Results are memoized per engine, keyed by the level's [`LevelStamp`], so
//! scoring several metrics against the same unmodified level reuses searches
//! while any mutation of the level forces a recomputation.

mod cache;
mod heap;

use std::{collections::HashMap, rc::Rc};

use level_eval_core::{LevelError, LevelId, LevelStamp, Room};
use level_eval_world::Level;

pub use cache::{CacheStats, MemoCache};
pub use heap::IndexedMinHeap;

/// Cache key identifying one search against one revision of one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchKey {
    level: LevelStamp,
    start: Room,
    finish: Option<Room>,
}

impl SearchKey {
    /// Creates a key for a search from `start`, optionally stopping at `finish`.
    #[must_use]
    pub const fn new(level: LevelStamp, start: Room, finish: Option<Room>) -> Self {
        Self {
            level,
            start,
            finish,
        }
    }

    /// Stamp of the level the search ran against.
    #[must_use]
    pub const fn level(&self) -> LevelStamp {
        self.level
    }

    /// Room the search started from.
    #[must_use]
    pub const fn start(&self) -> Room {
        self.start
    }

    /// Room the search stopped at, if one was requested.
    #[must_use]
    pub const fn finish(&self) -> Option<Room> {
        self.finish
    }
}

/// Distances and reconstructed paths produced by one search.
///
/// Both maps cover every room of the level. Rooms the search never settled,
/// either because they are unreachable or because the search stopped early at
/// the finish room, keep the [sentinel](ShortestPaths::sentinel) distance and
/// an empty path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortestPaths {
    start: Room,
    finish: Option<Room>,
    sentinel: u32,
    distances: HashMap<Room, u32>,
    paths: HashMap<Room, Vec<Room>>,
}

impl ShortestPaths {
    /// Room the search started from.
    #[must_use]
    pub const fn start(&self) -> Room {
        self.start
    }

    /// Room the search stopped at, if one was requested.
    #[must_use]
    pub const fn finish(&self) -> Option<Room> {
        self.finish
    }

    /// Placeholder distance of unsettled rooms: one more than the room count.
    #[must_use]
    pub const fn sentinel(&self) -> u32 {
        self.sentinel
    }

    /// Hop count from the start room, or `None` for rooms outside the level.
    #[must_use]
    pub fn distance(&self, room: Room) -> Option<u32> {
        self.distances.get(&room).copied()
    }

    /// Rooms visited from the start room to `room`, both inclusive.
    #[must_use]
    pub fn path(&self, room: Room) -> &[Room] {
        self.paths.get(&room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reports whether the search settled `room`.
    #[must_use]
    pub fn is_settled(&self, room: Room) -> bool {
        !self.path(room).is_empty()
    }

    /// Number of rooms the search settled.
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.paths.values().filter(|path| !path.is_empty()).count()
    }

    /// Distance of every room in the level.
    #[must_use]
    pub fn distances(&self) -> &HashMap<Room, u32> {
        &self.distances
    }

    /// Path to every room in the level.
    #[must_use]
    pub fn paths(&self) -> &HashMap<Room, Vec<Room>> {
        &self.paths
    }
}

/// Memoizing shortest-path engine, meant to live for one scoring run.
#[derive(Debug, Default)]
pub struct PathEngine {
    cache: MemoCache<SearchKey, Rc<ShortestPaths>>,
    computations: u64,
}

impl PathEngine {
    /// Creates an engine with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest distances and paths from `start`, stopping at `finish` if given.
    ///
    /// Repeated calls with the same arguments against an unmodified level
    /// return the cached result. Fails with [`LevelError::UnregisteredRoom`]
    /// when `start` or `finish` is not part of the level.
    pub fn search(
        &mut self,
        level: &Level,
        start: Room,
        finish: Option<Room>,
    ) -> Result<Rc<ShortestPaths>, LevelError> {
        let key = SearchKey::new(level.stamp(), start, finish);
        let computations = &mut self.computations;
        let mut computed = false;

        let paths = self.cache.get_or_try_insert_with(key, || {
            let paths = run_search(level, start, finish)?;
            *computations += 1;
            computed = true;
            tracing::debug!(
                level_id = level.id().get(),
                version = level.version(),
                rooms = level.num_rooms(),
                settled = paths.settled_count(),
                early_exit = finish.is_some(),
                "computed shortest paths"
            );
            Ok::<_, LevelError>(Rc::new(paths))
        })?;

        if !computed {
            tracing::trace!(
                level_id = level.id().get(),
                version = level.version(),
                "reused cached shortest paths"
            );
        }

        Ok(Rc::clone(paths))
    }

    /// Number of searches actually executed, excluding cache hits.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Hit and miss counters of the underlying cache.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of search results currently cached.
    #[must_use]
    pub fn cached_searches(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached result computed for the level, returning how many
    /// entries were released.
    pub fn forget(&mut self, level: LevelId) -> usize {
        self.cache.retain(|key, _| key.level().id() != level)
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn run_search(
    level: &Level,
    start: Room,
    finish: Option<Room>,
) -> Result<ShortestPaths, LevelError> {
    let rooms: Vec<Room> = level.rooms().copied().collect();
    let index: HashMap<Room, usize> = rooms
        .iter()
        .enumerate()
        .map(|(node, room)| (*room, node))
        .collect();

    let start_node = node_of(&index, start)?;
    let finish_node = finish.map(|room| node_of(&index, room)).transpose()?;
    let sentinel = sentinel_distance(rooms.len());

    let mut keys = vec![sentinel; rooms.len()];
    keys[start_node] = 0;
    let mut queue = IndexedMinHeap::from_keys(&keys);
    let mut settled: Vec<Option<u32>> = vec![None; rooms.len()];
    let mut previous: Vec<Option<usize>> = vec![None; rooms.len()];

    while let Some((node, distance)) = queue.pop() {
        // Everything still queued is unreachable once the sentinel surfaces.
        if distance >= sentinel {
            break;
        }

        settled[node] = Some(distance);
        if finish_node == Some(node) {
            break;
        }

        for neighbor in level.neighbors(rooms[node]) {
            let Some(&neighbor_node) = index.get(neighbor) else {
                continue;
            };

            if queue.decrease_key(neighbor_node, distance + 1) {
                previous[neighbor_node] = Some(node);
            }
        }
    }

    let mut distances = HashMap::with_capacity(rooms.len());
    let mut paths = HashMap::with_capacity(rooms.len());
    for (node, room) in rooms.iter().enumerate() {
        let (distance, path) = match settled[node] {
            Some(distance) => (distance, trace_back(node, start_node, &previous, &rooms)),
            None => (sentinel, Vec::new()),
        };
        let _ = distances.insert(*room, distance);
        let _ = paths.insert(*room, path);
    }

    Ok(ShortestPaths {
        start,
        finish,
        sentinel,
        distances,
        paths,
    })
}

fn node_of(index: &HashMap<Room, usize>, room: Room) -> Result<usize, LevelError> {
    index
        .get(&room)
        .copied()
        .ok_or(LevelError::UnregisteredRoom { room })
}

fn sentinel_distance(room_count: usize) -> u32 {
    u32::try_from(room_count)
        .ok()
        .and_then(|count| count.checked_add(1))
        .unwrap_or(u32::MAX)
}

fn trace_back(node: usize, start: usize, previous: &[Option<usize>], rooms: &[Room]) -> Vec<Room> {
    let mut path = vec![rooms[node]];
    let mut current = node;

    while current != start {
        let Some(parent) = previous[current] else {
            break;
        };
        path.push(rooms[parent]);
        current = parent;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use level_eval_core::ConnectionPolicy;

    fn diamond() -> (Level, [Room; 4]) {
        let rooms = [
            Room::new(0, 0, 1, 1),
            Room::new(1, 0, 1, 1),
            Room::new(0, 1, 1, 1),
            Room::new(1, 1, 1, 1),
        ];
        let [a, b, c, d] = rooms;
        let mut level = Level::new(4, ConnectionPolicy::Distinct);
        for room in rooms {
            let _ = level.add_room(room);
        }
        for (first, second) in [(a, b), (a, c), (b, d), (c, d)] {
            assert_eq!(level.add_connection(first, second), Ok(true));
        }
        (level, rooms)
    }

    #[test]
    fn ties_resolve_through_lowest_room() {
        let (level, [a, b, c, d]) = diamond();

        let result = run_search(&level, a, None).expect("start is registered");

        assert_eq!(result.distance(d), Some(2));
        assert_eq!(result.path(d), &[a, c, d], "room (0, 1) sorts before (1, 0)");
        assert_eq!(result.path(b), &[a, b]);
        assert_eq!(result.path(a), &[a]);
    }

    #[test]
    fn sentinel_is_one_past_room_count() {
        assert_eq!(sentinel_distance(0), 1);
        assert_eq!(sentinel_distance(12), 13);
        assert_eq!(sentinel_distance(usize::MAX), u32::MAX);
    }

    #[test]
    fn trace_back_stops_at_start() {
        let rooms = [Room::new(0, 0, 1, 1), Room::new(1, 0, 1, 1), Room::new(2, 0, 1, 1)];
        let previous = [None, Some(0), Some(1)];

        assert_eq!(trace_back(2, 0, &previous, &rooms), rooms.to_vec());
        assert_eq!(trace_back(0, 0, &previous, &rooms), vec![rooms[0]]);
    }
}
