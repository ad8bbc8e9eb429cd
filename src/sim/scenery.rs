//! Backdrop streaming: scenery tiles and pooled clouds
//!
//! Neither interacts with actors. Tiles are laid end to end ahead of the
//! player and dropped once they are two tile lengths behind. Clouds come from
//! a fixed pool reused round-robin, so the oldest placement is the one that
//! gets moved when the pool is exhausted.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::tick::StreamEvent;
use crate::config::{CloudConfig, SceneryConfig};
use crate::consts::SCENERY_CULL_TILES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// Pool slot index; stable for the lifetime of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CloudId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneryTile {
    pub id: TileId,
    /// Start of the tile along the track axis
    pub position: f32,
    /// Which of the host's tile variants to show
    pub variant: usize,
}

/// Streams backdrop tiles ahead of the player
#[derive(Debug, Clone)]
pub struct SceneryStreamer {
    config: SceneryConfig,
    tiles: VecDeque<SceneryTile>,
    /// Position of the most recently placed tile
    last_position: f32,
    next_id: u32,
}

impl SceneryStreamer {
    /// Empty streamer; the first `update` lays a tile at `reference`
    pub fn new(config: SceneryConfig, reference: f32) -> Self {
        Self {
            last_position: reference - config.tile_length,
            config,
            tiles: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Place at most one tile ahead, then cull everything too far behind
    pub fn update<R: RandomSource>(
        &mut self,
        reference: f32,
        rng: &mut R,
        events: &mut Vec<StreamEvent>,
    ) {
        let length = self.config.tile_length;
        if reference > self.last_position - length {
            self.place(self.last_position + length, rng, events);
        }

        let cull = self.cull_distance();
        while self
            .tiles
            .front()
            .is_some_and(|tile| reference - tile.position > cull)
        {
            if let Some(tile) = self.tiles.pop_front() {
                log::trace!("Culled scenery tile {:?} at z={}", tile.id, tile.position);
                events.push(StreamEvent::SceneryCulled { tile: tile.id });
            }
        }
    }

    fn place<R: RandomSource>(&mut self, position: f32, rng: &mut R, events: &mut Vec<StreamEvent>) {
        let count = self.config.variant_count.max(1);
        let variant = ((rng.next_unit() * count as f32) as usize).min(count - 1);
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.last_position = position;
        self.tiles.push_back(SceneryTile {
            id,
            position,
            variant,
        });
        events.push(StreamEvent::SceneryPlaced {
            tile: id,
            position,
            variant,
        });
    }

    pub fn cull_distance(&self) -> f32 {
        self.config.tile_length * SCENERY_CULL_TILES
    }

    /// World placement of a tile (the anchor with the tile's z)
    pub fn placement(&self, tile: &SceneryTile) -> Vec3 {
        Vec3::new(self.config.anchor.x, self.config.anchor.y, tile.position)
    }

    /// Live tiles, rearmost first
    pub fn tiles(&self) -> impl Iterator<Item = &SceneryTile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub id: CloudId,
    pub active: bool,
    pub pos: Vec3,
    pub scale: f32,
    /// Rotation about the vertical axis, degrees
    pub yaw: f32,
}

/// Fixed-size cloud pool, reused round-robin on a randomised timer
#[derive(Debug, Clone)]
pub struct CloudPool {
    config: CloudConfig,
    slots: Vec<Cloud>,
    cursor: usize,
    /// Seconds since the pool was created
    clock: f32,
    next_spawn: f32,
}

impl CloudPool {
    pub fn new(config: CloudConfig) -> Self {
        let slots = (0..config.max_count)
            .map(|i| Cloud {
                id: CloudId(i as u32),
                active: false,
                pos: Vec3::ZERO,
                scale: 1.0,
                yaw: 0.0,
            })
            .collect();
        Self {
            config,
            slots,
            cursor: 0,
            clock: 0.0,
            next_spawn: 0.0,
        }
    }

    /// Advance the spawn timer by `dt`, then deactivate clouds left behind
    pub fn update<R: RandomSource>(
        &mut self,
        reference: f32,
        dt: f32,
        rng: &mut R,
        events: &mut Vec<StreamEvent>,
    ) {
        if self.slots.is_empty() {
            return;
        }
        self.clock += dt;
        if self.clock >= self.next_spawn {
            self.spawn(reference, rng, events);
            self.next_spawn =
                self.clock + rng.range(self.config.min_interval, self.config.max_interval);
        }
        self.cull(reference, events);
    }

    /// Move the next slot in rotation ahead of the player
    pub fn spawn<R: RandomSource>(
        &mut self,
        reference: f32,
        rng: &mut R,
        events: &mut Vec<StreamEvent>,
    ) -> Option<CloudId> {
        if self.slots.is_empty() {
            return None;
        }
        let h = self.config.horizontal_range;
        let v = self.config.vertical_range;
        let pos = Vec3::new(
            rng.range(-h, h),
            rng.range(-v, v),
            reference + self.config.spawn_distance,
        );
        let scale = rng.range(self.config.min_scale, self.config.max_scale);
        let yaw = rng.range(0.0, 360.0);

        let index = self.cursor;
        self.cursor = (index + 1) % self.slots.len();
        let cloud = &mut self.slots[index];
        cloud.active = true;
        cloud.pos = pos;
        cloud.scale = scale;
        cloud.yaw = yaw;
        events.push(StreamEvent::CloudPlaced {
            cloud: cloud.id,
            position: pos,
        });
        Some(cloud.id)
    }

    fn cull(&mut self, reference: f32, events: &mut Vec<StreamEvent>) {
        let limit = self.config.destroy_distance;
        for cloud in self.slots.iter_mut().filter(|c| c.active) {
            if reference - cloud.pos.z > limit {
                cloud.active = false;
                events.push(StreamEvent::CloudCulled { cloud: cloud.id });
            }
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Cloud> {
        self.slots.iter().filter(|c| c.active)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
