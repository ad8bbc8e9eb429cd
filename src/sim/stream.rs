//! Segment stream: the sliding window of track around the player
//!
//! The stream owns everything the simulation mutates (pool, spawner, actors,
//! counters, RNG), so independent tracks can run side by side.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorTemplates};
use super::lifecycle::ActorLifecycle;
use super::pool::SegmentPool;
use super::rng::{PcgSource, RandomSource};
use super::scenery::{CloudPool, SceneryStreamer};
use super::segment::{Segment, SegmentId};
use super::spawner::ActorSpawner;
use super::tick::{StreamEvent, TickInput};
use crate::config::{ConfigError, StreamConfig, TrackConfig};

/// Counters and positions for diagnostics/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    pub time_ticks: u64,
    pub reference: f32,
    pub frontier: f32,
    pub segment_positions: Vec<f32>,
    pub live_traffic: usize,
    pub live_actors: usize,
    pub player_stopped: bool,
    pub recycled_total: u64,
    pub scenery_tiles: usize,
    pub active_clouds: usize,
}

pub struct SegmentStream<R: RandomSource = PcgSource> {
    config: StreamConfig,
    pool: SegmentPool,
    spawner: ActorSpawner,
    lifecycle: ActorLifecycle,
    scenery: SceneryStreamer,
    clouds: CloudPool,
    rng: R,
    actors: Vec<Actor>,
    events: Vec<StreamEvent>,
    /// Where the next placed segment starts
    frontier: f32,
    reference: f32,
    /// The player hit traffic at some point this session
    player_stopped: bool,
    time_ticks: u64,
    recycled_total: u64,
}

impl SegmentStream<PcgSource> {
    /// Stream with the arcade templates and a seeded PCG source
    pub fn seeded(config: &TrackConfig, seed: u64, reference: f32) -> Result<Self, ConfigError> {
        Self::new(config, ActorTemplates::arcade(), PcgSource::new(seed), reference)
    }
}

impl<R: RandomSource> SegmentStream<R> {
    /// Validate `config`, lay down the initial window and populate it
    pub fn new(
        config: &TrackConfig,
        templates: ActorTemplates,
        rng: R,
        reference: f32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let stream_config = config.stream.clone();
        let spawner = ActorSpawner::new(config.spawn.clone(), &stream_config, templates)?;
        let pool = SegmentPool::new(
            stream_config.active_count,
            stream_config.segment_length,
            stream_config.lane_count,
        );

        let mut stream = Self {
            frontier: reference - stream_config.segment_length,
            lifecycle: ActorLifecycle::new(config.traffic.clone(), stream_config.lane_width),
            scenery: SceneryStreamer::new(config.scenery.clone(), reference),
            clouds: CloudPool::new(config.clouds.clone()),
            config: stream_config,
            pool,
            spawner,
            rng,
            actors: Vec::new(),
            events: Vec::new(),
            reference,
            player_stopped: false,
            time_ticks: 0,
            recycled_total: 0,
        };

        let ids = stream
            .pool
            .acquire_initial(stream.config.initial_count, stream.frontier)?;
        for id in ids {
            stream.frontier += stream.config.segment_length;
            stream.place(id, false);
        }
        stream
            .scenery
            .update(reference, &mut stream.rng, &mut stream.events);

        log::info!(
            "Segment stream ready: {} segments from z={} to z={}, {} lanes",
            stream.pool.len(),
            stream.pool.oldest().map_or(0.0, |s| s.position),
            stream.frontier,
            stream.config.lane_count
        );
        Ok(stream)
    }

    /// Advance one step with the player at `reference` and no contacts
    pub fn tick(&mut self, reference: f32, dt: f32) {
        self.step(&TickInput::at(reference), dt);
    }

    /// Advance the whole subsystem one step
    pub fn step(&mut self, input: &TickInput, dt: f32) {
        self.time_ticks += 1;
        self.reference = input.player.reference();

        if self
            .lifecycle
            .apply_contacts(&input.contacts, &mut self.actors, &mut self.events)
        {
            self.player_stopped = true;
        }

        self.manage_segments();
        self.scenery
            .update(self.reference, &mut self.rng, &mut self.events);
        self.clouds
            .update(self.reference, dt, &mut self.rng, &mut self.events);

        self.lifecycle.step(&mut self.actors, &input.player, dt);
        self.lifecycle.despawn(
            &mut self.actors,
            self.reference,
            &mut self.spawner,
            &mut self.events,
        );
    }

    /// Spawn at most one segment ahead, then recycle everything left behind
    fn manage_segments(&mut self) {
        let p = self.reference;
        let length = self.config.segment_length;
        let slack = (self.config.active_count - self.config.initial_count) as f32 * length;

        if p + self.config.spawn_ahead_offset > self.frontier - slack {
            match self.pool.allocate(self.frontier) {
                Some(id) => {
                    self.frontier += length;
                    self.place(id, false);
                }
                None => self.recycle(),
            }
        }

        let line = p - self.config.recycle_distance - self.config.recycle_offset;
        while self.pool.oldest().is_some_and(|s| s.position < line) {
            self.recycle();
        }
    }

    fn recycle(&mut self) {
        let id = self.pool.recycle_oldest(self.frontier);
        self.frontier += self.config.segment_length;
        self.recycled_total += 1;
        log::debug!(
            "Recycled segment {:?} to z={} (player at z={})",
            id,
            self.frontier - self.config.segment_length,
            self.reference
        );
        self.place(id, true);
    }

    /// Announce a placed segment and populate it
    fn place(&mut self, id: SegmentId, recycled: bool) {
        let Some(segment) = self.pool.get_mut(id) else {
            return;
        };
        self.events.push(StreamEvent::SegmentPlaced {
            segment: id,
            position: segment.position,
            recycled,
        });
        self.spawner
            .populate(segment, &mut self.rng, &mut self.actors, &mut self.events);
    }

    /// Feed the run's difficulty to the obstacle layer
    pub fn set_difficulty(&mut self, difficulty: f32) {
        self.spawner.set_difficulty(difficulty);
    }

    pub fn difficulty(&self) -> f32 {
        self.spawner.difficulty()
    }

    /// Restart the random sequence (deterministic replays)
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    /// Live actors in spawn order
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn live_traffic(&self) -> usize {
        self.spawner.live_traffic()
    }

    pub fn segment_count(&self) -> usize {
        self.pool.len()
    }

    /// Live segments in position order
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.pool.iter()
    }

    pub fn frontier(&self) -> f32 {
        self.frontier
    }

    pub fn reference(&self) -> f32 {
        self.reference
    }

    pub fn player_stopped(&self) -> bool {
        self.player_stopped
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn scenery(&self) -> &SceneryStreamer {
        &self.scenery
    }

    pub fn clouds(&self) -> &CloudPool {
        &self.clouds
    }

    /// Take every event buffered since the last drain
    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            time_ticks: self.time_ticks,
            reference: self.reference,
            frontier: self.frontier,
            segment_positions: self.pool.iter().map(|s| s.position).collect(),
            live_traffic: self.live_traffic(),
            live_actors: self.actors.len(),
            player_stopped: self.player_stopped,
            recycled_total: self.recycled_total,
            scenery_tiles: self.scenery.len(),
            active_clouds: self.clouds.active().count(),
        }
    }
}
