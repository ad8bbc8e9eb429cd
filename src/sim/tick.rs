//! Per-tick input and output
//!
//! The host fills a `TickInput` every frame and drains `StreamEvent`s
//! afterwards. Nothing here reads a clock.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, ActorKind, CollectibleTier};
use super::contact::Contact;
use super::scenery::{CloudId, TileId};
use super::segment::SegmentId;

/// Player car defaults (matches the arcade traffic footprint)
pub const PLAYER_HALF_LENGTH: f32 = 2.25;
pub const PLAYER_HALF_WIDTH: f32 = 1.0;

/// What the simulation needs to know about the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerProbe {
    /// z is the reference position along the track
    pub pos: Vec3,
    /// Current forward speed (traffic braking behind the player matches it)
    pub speed: f32,
    pub half_length: f32,
    pub half_width: f32,
}

impl PlayerProbe {
    /// Player at `reference_z`, centred laterally, standing still
    pub fn at(reference_z: f32) -> Self {
        Self {
            pos: Vec3::new(0.0, 0.0, reference_z),
            speed: 0.0,
            half_length: PLAYER_HALF_LENGTH,
            half_width: PLAYER_HALF_WIDTH,
        }
    }

    pub fn with_lateral(mut self, x: f32) -> Self {
        self.pos.x = x;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn reference(&self) -> f32 {
        self.pos.z
    }

    pub fn rear(&self) -> f32 {
        self.pos.z - self.half_length
    }
}

impl Default for PlayerProbe {
    fn default() -> Self {
        Self::at(0.0)
    }
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub player: PlayerProbe,
    /// Contacts reported by the host's physics since the last tick
    pub contacts: Vec<Contact>,
}

impl TickInput {
    pub fn at(reference_z: f32) -> Self {
        Self {
            player: PlayerProbe::at(reference_z),
            contacts: Vec::new(),
        }
    }

    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }
}

/// Something the host may want to render, play, or count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// A segment was created or recycled at `position`
    SegmentPlaced {
        segment: SegmentId,
        position: f32,
        recycled: bool,
    },
    ActorSpawned {
        actor: ActorId,
        kind: ActorKind,
        segment: SegmentId,
        lane: usize,
    },
    ActorDespawned {
        actor: ActorId,
        kind: ActorKind,
    },
    /// The player hit traffic; both are now stopped for good
    TrafficCollision {
        actor: ActorId,
    },
    CollectiblePicked {
        actor: ActorId,
        tier: CollectibleTier,
        value: u32,
    },
    /// Population of `segment` stopped at `lane` because the budget is spent
    TrafficBudgetReached {
        segment: SegmentId,
        lane: usize,
    },
    SceneryPlaced {
        tile: TileId,
        position: f32,
        variant: usize,
    },
    SceneryCulled {
        tile: TileId,
    },
    /// A pooled cloud was moved ahead of the player
    CloudPlaced {
        cloud: CloudId,
        position: Vec3,
    },
    CloudCulled {
        cloud: CloudId,
    },
}
