#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level quality metrics and the pipeline that scores them.
//!
//! Each [`Metric`] reads a [`Level`] and produces a single float, nominally in
//! `[0, 1]`. A [`MetricSuite`] owns one [`PathEngine`] for the duration of a
//! scoring run so that the path-based metrics share shortest-path searches
//! against the same unmodified level.

mod config;
mod metrics;

use std::collections::HashSet;

use level_eval_core::{LevelError, LevelId};
use level_eval_system_navigation::PathEngine;
use level_eval_world::Level;
use serde::{Deserialize, Serialize};

pub use config::{ConfigError, MetricsConfig, DEFAULT_MAX_ROOM_AREA};

/// Scoring strategies available to a suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Occupied tiles over total capacity.
    Density,
    /// Average distance of off-path rooms from the optimal path.
    Exploration,
    /// Average branching of rooms that are not dead ends.
    MapLinearity,
    /// Share of rooms not used by the optimal path.
    PathRedundancy,
    /// Average distance from the optimal path to danger; higher is safer.
    ProximityToDanger,
    /// Mean room area relative to the largest allowed room.
    AverageRoomSize {
        /// Area of the largest room the generator may place.
        max_room_area: u64,
    },
    /// Room count relative to a level filled with 1x1 rooms.
    RoomCount,
}

impl Metric {
    /// Stable, unique display name of the metric.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.kind().title()
    }

    /// Configuration-level identifier of the metric.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Density => MetricKind::Density,
            Self::Exploration => MetricKind::Exploration,
            Self::MapLinearity => MetricKind::MapLinearity,
            Self::PathRedundancy => MetricKind::PathRedundancy,
            Self::ProximityToDanger => MetricKind::ProximityToDanger,
            Self::AverageRoomSize { .. } => MetricKind::AverageRoomSize,
            Self::RoomCount => MetricKind::RoomCount,
        }
    }

    /// Scores the level in its current state without mutating it.
    ///
    /// Path-based metrics fail with [`LevelError::LevelNotFullySpecified`]
    /// when the start or finish room is missing, and every metric reports
    /// [`LevelError::Undefined`] instead of dividing by zero.
    pub fn score(&self, level: &Level, engine: &mut PathEngine) -> Result<f64, LevelError> {
        match *self {
            Self::Density => metrics::density(level),
            Self::Exploration => metrics::exploration(level, engine),
            Self::MapLinearity => metrics::map_linearity(level),
            Self::PathRedundancy => metrics::path_redundancy(level, engine),
            Self::ProximityToDanger => metrics::proximity_to_danger(level, engine),
            Self::AverageRoomSize { max_room_area } => {
                metrics::average_room_size(level, max_room_area)
            }
            Self::RoomCount => metrics::room_count(level),
        }
    }
}

/// Identifier of a metric as written in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// See [`Metric::Density`].
    Density,
    /// See [`Metric::Exploration`].
    Exploration,
    /// See [`Metric::MapLinearity`].
    MapLinearity,
    /// See [`Metric::PathRedundancy`].
    PathRedundancy,
    /// See [`Metric::ProximityToDanger`].
    ProximityToDanger,
    /// See [`Metric::AverageRoomSize`].
    AverageRoomSize,
    /// See [`Metric::RoomCount`].
    RoomCount,
}

impl MetricKind {
    /// Every metric, in the order a standard suite reports them.
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Density,
        MetricKind::Exploration,
        MetricKind::MapLinearity,
        MetricKind::PathRedundancy,
        MetricKind::ProximityToDanger,
        MetricKind::AverageRoomSize,
        MetricKind::RoomCount,
    ];

    /// Display name shared with [`Metric::title`].
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Density => "Density",
            Self::Exploration => "Exploration",
            Self::MapLinearity => "Map Linearity",
            Self::PathRedundancy => "Path Redundancy",
            Self::ProximityToDanger => "Proximity to Danger",
            Self::AverageRoomSize => "Average Room Size",
            Self::RoomCount => "Room Count",
        }
    }

    /// Builds the metric, applying `max_room_area` where the metric needs it.
    #[must_use]
    pub const fn into_metric(self, max_room_area: u64) -> Metric {
        match self {
            Self::Density => Metric::Density,
            Self::Exploration => Metric::Exploration,
            Self::MapLinearity => Metric::MapLinearity,
            Self::PathRedundancy => Metric::PathRedundancy,
            Self::ProximityToDanger => Metric::ProximityToDanger,
            Self::AverageRoomSize => Metric::AverageRoomSize { max_room_area },
            Self::RoomCount => Metric::RoomCount,
        }
    }
}

/// Outcome of scoring one metric against one level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricScore {
    title: &'static str,
    score: Result<f64, LevelError>,
}

impl MetricScore {
    /// Display name of the scored metric.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.title
    }

    /// Score, or the reason the metric could not be scored.
    #[must_use]
    pub const fn result(&self) -> &Result<f64, LevelError> {
        &self.score
    }

    /// Score, if the metric was defined for the level.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.score.as_ref().ok().copied()
    }

    /// Reason the metric could not be scored, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&LevelError> {
        self.score.as_ref().err()
    }
}

/// Scores of every metric in a suite for one level, in suite order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    scores: Vec<MetricScore>,
}

impl ScoreReport {
    /// Iterator over every metric outcome.
    pub fn iter(&self) -> impl Iterator<Item = &MetricScore> {
        self.scores.iter()
    }

    /// Outcome of the metric with the provided title.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&MetricScore> {
        self.scores.iter().find(|score| score.title == title)
    }

    /// Score of the metric with the provided title, if it was defined.
    #[must_use]
    pub fn value(&self, title: &str) -> Option<f64> {
        self.get(title).and_then(MetricScore::value)
    }

    /// Successful `(title, score)` pairs, in suite order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.scores
            .iter()
            .filter_map(|score| score.value().map(|value| (score.title, value)))
    }

    /// Reports whether every metric produced a score.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.scores.iter().all(|score| score.score.is_ok())
    }

    /// Number of metrics in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Reports whether the report holds no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Ordered set of metrics scored together with a shared path engine.
#[derive(Debug)]
pub struct MetricSuite {
    metrics: Vec<Metric>,
    engine: PathEngine,
}

impl MetricSuite {
    /// Creates a suite scoring the provided metrics in order.
    ///
    /// Titles label the scores handed to reporting, so two metrics sharing a
    /// title are rejected with [`ConfigError::DuplicateMetric`].
    pub fn new(metrics: Vec<Metric>) -> Result<Self, ConfigError> {
        let mut titles = HashSet::with_capacity(metrics.len());
        for metric in &metrics {
            if !titles.insert(metric.title()) {
                return Err(ConfigError::DuplicateMetric(metric.title()));
            }
        }

        Ok(Self {
            metrics,
            engine: PathEngine::new(),
        })
    }

    /// Suite of all seven metrics in the standard reporting order.
    #[must_use]
    pub fn standard(max_room_area: u64) -> Self {
        Self {
            metrics: MetricKind::ALL
                .iter()
                .map(|kind| kind.into_metric(max_room_area))
                .collect(),
            engine: PathEngine::new(),
        }
    }

    /// Builds the suite described by a validated configuration.
    pub fn from_config(config: &MetricsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(
            config
                .metrics
                .iter()
                .map(|kind| kind.into_metric(config.max_room_area))
                .collect(),
        )
    }

    /// Metrics scored by the suite, in reporting order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Shortest-path engine shared by the suite's metrics.
    #[must_use]
    pub fn engine(&self) -> &PathEngine {
        &self.engine
    }

    /// Scores every metric against the level.
    ///
    /// Failures are recorded per metric; one undefined metric never prevents
    /// the others from being scored.
    pub fn score(&mut self, level: &Level) -> ScoreReport {
        let engine = &mut self.engine;
        let scores = self
            .metrics
            .iter()
            .map(|metric| {
                let score = metric.score(level, engine);
                match &score {
                    Ok(value) => tracing::debug!(
                        level_id = level.id().get(),
                        metric = metric.title(),
                        value,
                        "scored metric"
                    ),
                    Err(error) => tracing::warn!(
                        level_id = level.id().get(),
                        metric = metric.title(),
                        %error,
                        "metric could not be scored"
                    ),
                }
                MetricScore {
                    title: metric.title(),
                    score,
                }
            })
            .collect();

        ScoreReport { scores }
    }

    /// Releases cached searches for a level that will not be scored again.
    pub fn finish_level(&mut self, level: LevelId) -> usize {
        self.engine.forget(level)
    }
}

impl Default for MetricSuite {
    fn default() -> Self {
        Self::standard(DEFAULT_MAX_ROOM_AREA)
    }
}
