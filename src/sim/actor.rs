//! Actors and the template registry
//!
//! Actors are logical records only. Anything visual belongs to the host.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::segment::SegmentId;

/// Stable, monotonically increasing actor identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Collectible value tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollectibleTier {
    Bronze,
    Silver,
    Gold,
}

impl CollectibleTier {
    /// Points awarded on pickup
    pub fn value(self) -> u32 {
        match self {
            CollectibleTier::Bronze => 1,
            CollectibleTier::Silver => 5,
            CollectibleTier::Gold => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Traffic,
    /// Stationary blocker
    Obstacle,
    Collectible { tier: CollectibleTier },
}

impl ActorKind {
    pub fn is_traffic(self) -> bool {
        matches!(self, ActorKind::Traffic)
    }

    /// Whether traffic behind this actor must brake for it
    pub fn blocks_lane(self) -> bool {
        matches!(self, ActorKind::Traffic | ActorKind::Obstacle)
    }

    pub fn template_key(self) -> TemplateKey {
        match self {
            ActorKind::Traffic => TemplateKey::Traffic,
            ActorKind::Obstacle => TemplateKey::Obstacle,
            ActorKind::Collectible { tier } => TemplateKey::Collectible(tier),
        }
    }
}

/// A live traffic vehicle, obstacle, or collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    /// x lateral, y height, z along track
    pub pos: Vec3,
    pub speed: f32,
    /// Speed assigned at spawn, regained after braking
    pub cruise_speed: f32,
    /// Stopped by a collision with the player; never cleared
    pub frozen: bool,
    pub braking: bool,
    /// Point value (collectibles only)
    pub value: u32,
    pub half_length: f32,
    pub half_width: f32,
    /// Where it was spawned; the actor does not follow the segment afterwards
    pub origin: SegmentId,
    pub lane: usize,
}

impl Actor {
    /// Rear edge along the track axis
    pub fn rear(&self) -> f32 {
        self.pos.z - self.half_length
    }

    /// Front edge along the track axis
    pub fn front(&self) -> f32 {
        self.pos.z + self.half_length
    }

    /// Permanently stop after hitting the player
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.braking = false;
        self.speed = 0.0;
    }
}

/// Registry key for actor templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemplateKey {
    Traffic,
    Obstacle,
    Collectible(CollectibleTier),
}

/// Default footprint for an actor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorTemplate {
    pub half_length: f32,
    pub half_width: f32,
    /// Spawn height
    pub height: f32,
}

/// Kind -> template lookup, iterated in key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorTemplates {
    templates: BTreeMap<TemplateKey, ActorTemplate>,
}

impl ActorTemplates {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Car-sized traffic, crate-sized obstacles, coin-sized collectibles
    pub fn arcade() -> Self {
        let collectible = ActorTemplate {
            half_length: 0.5,
            half_width: 0.5,
            height: 0.0,
        };
        Self::empty()
            .with(
                TemplateKey::Traffic,
                ActorTemplate {
                    half_length: 2.25,
                    half_width: 1.0,
                    height: 0.0,
                },
            )
            .with(
                TemplateKey::Obstacle,
                ActorTemplate {
                    half_length: 1.0,
                    half_width: 1.0,
                    height: 0.0,
                },
            )
            .with(TemplateKey::Collectible(CollectibleTier::Bronze), collectible)
            .with(TemplateKey::Collectible(CollectibleTier::Silver), collectible)
            .with(TemplateKey::Collectible(CollectibleTier::Gold), collectible)
    }

    pub fn with(mut self, key: TemplateKey, template: ActorTemplate) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: TemplateKey, template: ActorTemplate) {
        self.templates.insert(key, template);
    }

    pub fn remove(&mut self, key: TemplateKey) -> Option<ActorTemplate> {
        self.templates.remove(&key)
    }

    pub fn get(&self, key: TemplateKey) -> Option<&ActorTemplate> {
        self.templates.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }
}
