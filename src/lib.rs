//! Endless Road - engine-agnostic endless highway simulation
//!
//! Core modules:
//! - `sim`: Deterministic track simulation (segment streaming, spawning, actor lifecycle)
//! - `config`: Data-driven track tuning, loaded from JSON
//! - `session`: Run bookkeeping (distance score, difficulty, gems, game over)

pub mod config;
pub mod session;
pub mod sim;

pub use config::{ConfigError, TrackConfig};
pub use session::{RunPhase, RunScore};
pub use sim::{SegmentStream, StreamEvent, TickInput};

/// Simulation constants and arcade-tuned defaults
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Track layout
    pub const SEGMENT_LENGTH: f32 = 50.0;
    pub const INITIAL_SEGMENTS: usize = 5;
    pub const ACTIVE_SEGMENTS: usize = 7;
    pub const LANE_COUNT: usize = 4;
    pub const LANE_WIDTH: f32 = 4.0;
    /// Distance behind the player before a segment may be recycled
    pub const RECYCLE_DISTANCE: f32 = 40.0;

    /// Hard upper bound on lanes (one bit each in the occupancy mask)
    pub const MAX_LANES: usize = 32;

    /// Traffic defaults
    pub const MIN_TRAFFIC_SPEED: f32 = 5.0;
    pub const MAX_TRAFFIC_SPEED: f32 = 15.0;
    pub const MAX_TRAFFIC: usize = 24;
    pub const BRAKING_DISTANCE: f32 = 10.0;
    pub const STOPPING_DISTANCE: f32 = 5.0;
    pub const DESPAWN_DISTANCE: f32 = 30.0;
    /// Braking targets this fraction of the leader's speed
    pub const LEADER_SPEED_FACTOR: f32 = 0.9;
    /// Lerp rate multiplier applied while braking
    pub const BRAKE_BLEND_RATE: f32 = 5.0;

    /// Collectible z jitter half-range
    pub const COLLECTIBLE_JITTER: f32 = 5.0;

    /// Backdrop tiles are culled this many tile lengths behind the player
    pub const SCENERY_CULL_TILES: f32 = 2.0;
    pub const SCENERY_TILE_LENGTH: f32 = 100.0;
    pub const MAX_CLOUDS: usize = 20;
}

/// Lateral offset of a lane centre, lanes spread symmetrically around x = 0
#[inline]
pub fn lane_offset(lane: usize, lane_count: usize, lane_width: f32) -> f32 {
    (lane as f32 - (lane_count as f32 - 1.0) * 0.5) * lane_width
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}
