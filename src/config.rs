//! Track configuration
//!
//! Every tunable of the simulation lives here, grouped by concern. All
//! sections default to the arcade tuning so a partial JSON file only needs
//! the fields it overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Configuration problems, surfaced before the first tick
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("segment length must be positive, got {0}")]
    SegmentLength(f32),
    #[error("lane width must be positive, got {0}")]
    LaneWidth(f32),
    #[error("initial segment count must be at least 1")]
    NoInitialSegments,
    #[error("active segment count {active} is below initial count {initial}")]
    ActiveBelowInitial { initial: usize, active: usize },
    #[error("lane count must be between 1 and {max}, got {count}")]
    LaneCount { count: usize, max: usize },
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("collectible probabilities sum to {0}, which exceeds 1")]
    CollectibleSum(f32),
    #[error("traffic speed range is inverted: {min} > {max}")]
    SpeedRange { min: f32, max: f32 },
    #[error("stopping distance {stopping} exceeds braking distance {braking}")]
    StoppingBeyondBraking { stopping: f32, braking: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{name} range is inverted: {min} > {max}")]
    InvertedRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("scenery tile length must be positive, got {0}")]
    SceneryLength(f32),
    #[error("scenery needs at least one variant")]
    NoSceneryVariants,
    #[error("spawning is enabled but the actor template registry is empty")]
    EmptyTemplates,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Segment window layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Length of every segment along the track axis
    pub segment_length: f32,
    /// Segments created up front; the window never shrinks below this
    pub initial_count: usize,
    /// Ceiling on live segments
    pub active_count: usize,
    pub lane_count: usize,
    pub lane_width: f32,
    /// How far ahead of the player the frontier is kept
    pub spawn_ahead_offset: f32,
    /// Distance behind the player before the oldest segment is recycled
    pub recycle_distance: f32,
    /// Extra slack added to `recycle_distance`
    pub recycle_offset: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            segment_length: SEGMENT_LENGTH,
            initial_count: INITIAL_SEGMENTS,
            active_count: ACTIVE_SEGMENTS,
            lane_count: LANE_COUNT,
            lane_width: LANE_WIDTH,
            spawn_ahead_offset: SEGMENT_LENGTH * 2.0,
            recycle_distance: RECYCLE_DISTANCE,
            recycle_offset: 0.0,
        }
    }
}

/// Per-lane spawn probabilities and budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub traffic_probability: f32,
    /// Global cap on live traffic actors
    pub max_traffic: usize,
    pub min_traffic_speed: f32,
    pub max_traffic_speed: f32,
    pub gold_probability: f32,
    pub silver_probability: f32,
    pub bronze_probability: f32,
    /// Half-range of the z jitter applied to collectibles
    pub collectible_jitter: f32,
    /// Stationary obstacles; 0 disables the layer
    pub obstacle_probability: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            traffic_probability: 0.3,
            max_traffic: MAX_TRAFFIC,
            min_traffic_speed: MIN_TRAFFIC_SPEED,
            max_traffic_speed: MAX_TRAFFIC_SPEED,
            gold_probability: 0.05,
            silver_probability: 0.10,
            bronze_probability: 0.20,
            collectible_jitter: COLLECTIBLE_JITTER,
            obstacle_probability: 0.0,
        }
    }
}

impl SpawnConfig {
    /// Whether any layer can ever spawn an actor
    pub fn spawning_enabled(&self) -> bool {
        self.traffic_probability > 0.0
            || self.obstacle_probability > 0.0
            || self.collectible_total() > 0.0
    }

    /// Cumulative collectible probability (gold + silver + bronze)
    pub fn collectible_total(&self) -> f32 {
        self.gold_probability + self.silver_probability + self.bronze_probability
    }
}

/// Traffic behaviour once spawned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub braking_distance: f32,
    pub stopping_distance: f32,
    /// Fraction of the leader's speed targeted while braking
    pub leader_speed_factor: f32,
    pub brake_blend_rate: f32,
    /// Speed regained per second once the lane ahead clears
    pub reaccel_rate: f32,
    /// Distance behind the player at which any actor is removed
    pub despawn_distance: f32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            braking_distance: BRAKING_DISTANCE,
            stopping_distance: STOPPING_DISTANCE,
            leader_speed_factor: LEADER_SPEED_FACTOR,
            brake_blend_rate: BRAKE_BLEND_RATE,
            reaccel_rate: 4.0,
            despawn_distance: DESPAWN_DISTANCE,
        }
    }
}

/// Run scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub multiplier: f32,
    /// Seconds between difficulty bumps
    pub difficulty_interval: f32,
    pub difficulty_step: f32,
    pub max_difficulty: f32,
    /// Player top speed used to normalise the speed bonus
    pub player_max_speed: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            difficulty_interval: 30.0,
            difficulty_step: 0.2,
            max_difficulty: 3.0,
            player_max_speed: 30.0,
        }
    }
}

/// Backdrop tiles streamed alongside the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    pub tile_length: f32,
    /// Number of interchangeable tile variants the host can draw
    pub variant_count: usize,
    /// Fixed placement of every tile relative to the track (z is ignored)
    pub anchor: Vec3,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            tile_length: SCENERY_TILE_LENGTH,
            variant_count: 1,
            anchor: Vec3::new(-200.0, 400.0, 0.0),
        }
    }
}

/// Decorative clouds recycled from a fixed pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Pool size; 0 disables clouds
    pub max_count: usize,
    pub min_scale: f32,
    pub max_scale: f32,
    /// How far ahead of the player a cloud appears
    pub spawn_distance: f32,
    /// Distance behind the player at which a cloud is deactivated
    pub destroy_distance: f32,
    /// Seconds between placements
    pub min_interval: f32,
    pub max_interval: f32,
    pub horizontal_range: f32,
    pub vertical_range: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            max_count: MAX_CLOUDS,
            min_scale: 0.5,
            max_scale: 2.0,
            spawn_distance: 100.0,
            destroy_distance: 20.0,
            min_interval: 0.5,
            max_interval: 2.0,
            horizontal_range: 15.0,
            vertical_range: 10.0,
        }
    }
}

/// Complete track configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub stream: StreamConfig,
    pub spawn: SpawnConfig,
    pub traffic: TrafficConfig,
    pub score: ScoreConfig,
    pub scenery: SceneryConfig,
    pub clouds: CloudConfig,
}

impl TrackConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded track config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stream = &self.stream;
        if !(stream.segment_length > 0.0) {
            return Err(ConfigError::SegmentLength(stream.segment_length));
        }
        if !(stream.lane_width > 0.0) {
            return Err(ConfigError::LaneWidth(stream.lane_width));
        }
        if stream.initial_count == 0 {
            return Err(ConfigError::NoInitialSegments);
        }
        if stream.active_count < stream.initial_count {
            return Err(ConfigError::ActiveBelowInitial {
                initial: stream.initial_count,
                active: stream.active_count,
            });
        }
        if stream.lane_count == 0 || stream.lane_count > MAX_LANES {
            return Err(ConfigError::LaneCount {
                count: stream.lane_count,
                max: MAX_LANES,
            });
        }
        non_negative("spawn_ahead_offset", stream.spawn_ahead_offset)?;
        non_negative("recycle_distance", stream.recycle_distance)?;
        non_negative("recycle_offset", stream.recycle_offset)?;

        let spawn = &self.spawn;
        probability("traffic_probability", spawn.traffic_probability)?;
        probability("gold_probability", spawn.gold_probability)?;
        probability("silver_probability", spawn.silver_probability)?;
        probability("bronze_probability", spawn.bronze_probability)?;
        probability("obstacle_probability", spawn.obstacle_probability)?;
        if spawn.collectible_total() > 1.0 {
            return Err(ConfigError::CollectibleSum(spawn.collectible_total()));
        }
        non_negative("min_traffic_speed", spawn.min_traffic_speed)?;
        if spawn.min_traffic_speed > spawn.max_traffic_speed {
            return Err(ConfigError::SpeedRange {
                min: spawn.min_traffic_speed,
                max: spawn.max_traffic_speed,
            });
        }
        non_negative("collectible_jitter", spawn.collectible_jitter)?;

        let traffic = &self.traffic;
        non_negative("stopping_distance", traffic.stopping_distance)?;
        if traffic.stopping_distance > traffic.braking_distance {
            return Err(ConfigError::StoppingBeyondBraking {
                stopping: traffic.stopping_distance,
                braking: traffic.braking_distance,
            });
        }
        non_negative("leader_speed_factor", traffic.leader_speed_factor)?;
        non_negative("brake_blend_rate", traffic.brake_blend_rate)?;
        non_negative("reaccel_rate", traffic.reaccel_rate)?;
        non_negative("despawn_distance", traffic.despawn_distance)?;

        let score = &self.score;
        non_negative("multiplier", score.multiplier)?;
        non_negative("difficulty_interval", score.difficulty_interval)?;
        non_negative("difficulty_step", score.difficulty_step)?;
        non_negative("player_max_speed", score.player_max_speed)?;

        let scenery = &self.scenery;
        if !(scenery.tile_length > 0.0) {
            return Err(ConfigError::SceneryLength(scenery.tile_length));
        }
        if scenery.variant_count == 0 {
            return Err(ConfigError::NoSceneryVariants);
        }

        let clouds = &self.clouds;
        non_negative("min_scale", clouds.min_scale)?;
        ordered("cloud scale", clouds.min_scale, clouds.max_scale)?;
        non_negative("min_interval", clouds.min_interval)?;
        ordered("cloud interval", clouds.min_interval, clouds.max_interval)?;
        non_negative("spawn_distance", clouds.spawn_distance)?;
        non_negative("destroy_distance", clouds.destroy_distance)?;
        non_negative("horizontal_range", clouds.horizontal_range)?;
        non_negative("vertical_range", clouds.vertical_range)?;

        Ok(())
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn ordered(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
