//! Probabilistic population of segments
//!
//! Each lane is evaluated once per population pass, in index order. The
//! collectible, traffic and obstacle layers use independent draws, so a lane
//! can hold a coin and a car at the same time but never two vehicles.

use glam::Vec3;

use super::actor::{Actor, ActorId, ActorKind, ActorTemplate, ActorTemplates, CollectibleTier};
use super::lanes::LaneOccupancyTracker;
use super::rng::RandomSource;
use super::segment::Segment;
use super::tick::StreamEvent;
use crate::config::{ConfigError, SpawnConfig, StreamConfig};
use crate::lane_offset;

#[derive(Debug, Clone)]
pub struct ActorSpawner {
    config: SpawnConfig,
    lane_width: f32,
    templates: ActorTemplates,
    /// Traffic and obstacles share this layer
    vehicle_claims: LaneOccupancyTracker,
    pickup_claims: LaneOccupancyTracker,
    live_traffic: usize,
    /// Scales the obstacle layer; 1.0 is the configured probability
    difficulty: f32,
    next_id: u32,
}

impl ActorSpawner {
    pub fn new(
        config: SpawnConfig,
        stream: &StreamConfig,
        templates: ActorTemplates,
    ) -> Result<Self, ConfigError> {
        if config.spawning_enabled() && templates.is_empty() {
            return Err(ConfigError::EmptyTemplates);
        }
        Ok(Self {
            config,
            lane_width: stream.lane_width,
            templates,
            vehicle_claims: LaneOccupancyTracker::new(),
            pickup_claims: LaneOccupancyTracker::new(),
            live_traffic: 0,
            difficulty: 1.0,
            next_id: 1,
        })
    }

    /// Live traffic actors counted against the budget
    pub fn live_traffic(&self) -> usize {
        self.live_traffic
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Obstacles get denser as the run gets harder
    pub fn set_difficulty(&mut self, difficulty: f32) {
        self.difficulty = difficulty.max(0.0);
    }

    /// Per-lane obstacle chance at the current difficulty
    pub fn obstacle_chance(&self) -> f32 {
        (self.config.obstacle_probability * self.difficulty).clamp(0.0, 1.0)
    }

    /// Populate `segment` once per cycle; returns how many actors spawned
    pub fn populate<R: RandomSource>(
        &mut self,
        segment: &mut Segment,
        rng: &mut R,
        actors: &mut Vec<Actor>,
        events: &mut Vec<StreamEvent>,
    ) -> usize {
        if segment.populated {
            return 0;
        }
        segment.populated = true;
        self.vehicle_claims.begin_pass(segment.id);
        self.pickup_claims.begin_pass(segment.id);

        let mut spawned = 0;
        for lane in 0..segment.lane_count {
            if self.live_traffic >= self.config.max_traffic {
                log::debug!(
                    "Traffic budget {} reached, segment {:?} left empty from lane {}",
                    self.config.max_traffic,
                    segment.id,
                    lane
                );
                events.push(StreamEvent::TrafficBudgetReached {
                    segment: segment.id,
                    lane,
                });
                break;
            }

            if let Some(tier) = self.roll_collectible(rng) {
                spawned += self.spawn_collectible(segment, lane, tier, rng, actors, events) as usize;
            }

            if self.config.traffic_probability > 0.0
                && rng.next_unit() < self.config.traffic_probability
                && !self.vehicle_claims.is_claimed(segment.id, lane)
            {
                spawned += self.spawn_traffic(segment, lane, rng, actors, events) as usize;
            }

            let obstacle_chance = self.obstacle_chance();
            if obstacle_chance > 0.0
                && !self.vehicle_claims.is_claimed(segment.id, lane)
                && rng.next_unit() < obstacle_chance
            {
                spawned += self.spawn_obstacle(segment, lane, actors, events) as usize;
            }
        }

        segment.occupancy = self.vehicle_claims.mask(segment.id);
        spawned
    }

    /// Called when a traffic actor leaves the world
    pub fn release(&mut self, actor: &Actor) {
        if actor.kind.is_traffic() {
            assert!(self.live_traffic > 0, "live traffic counter underflow");
            self.live_traffic -= 1;
        }
    }

    /// Cumulative thresholds, rarest tier first
    fn roll_collectible<R: RandomSource>(&self, rng: &mut R) -> Option<CollectibleTier> {
        if self.config.collectible_total() <= 0.0 {
            return None;
        }
        let r = rng.next_unit();
        let gold = self.config.gold_probability;
        let silver = gold + self.config.silver_probability;
        let bronze = silver + self.config.bronze_probability;
        if r < gold {
            Some(CollectibleTier::Gold)
        } else if r < silver {
            Some(CollectibleTier::Silver)
        } else if r < bronze {
            Some(CollectibleTier::Bronze)
        } else {
            None
        }
    }

    fn spawn_collectible<R: RandomSource>(
        &mut self,
        segment: &Segment,
        lane: usize,
        tier: CollectibleTier,
        rng: &mut R,
        actors: &mut Vec<Actor>,
        events: &mut Vec<StreamEvent>,
    ) -> bool {
        let kind = ActorKind::Collectible { tier };
        let Some(template) = self.templates.get(kind.template_key()).copied() else {
            log::trace!("No template for {:?}, skipping", tier);
            return false;
        };
        if !self.pickup_claims.claim(segment.id, lane) {
            return false;
        }
        let jitter = self.config.collectible_jitter;
        let z = segment_center(segment) + rng.range(-jitter, jitter);
        let pos = Vec3::new(self.lane_x(segment, lane), template.height, z);
        let mut actor = self.make_actor(kind, pos, 0.0, template, segment, lane);
        actor.value = tier.value();
        self.push(actor, actors, events);
        true
    }

    fn spawn_traffic<R: RandomSource>(
        &mut self,
        segment: &Segment,
        lane: usize,
        rng: &mut R,
        actors: &mut Vec<Actor>,
        events: &mut Vec<StreamEvent>,
    ) -> bool {
        let kind = ActorKind::Traffic;
        let Some(template) = self.templates.get(kind.template_key()).copied() else {
            return false;
        };
        if !self.vehicle_claims.claim(segment.id, lane) {
            return false;
        }
        let speed = rng.range(self.config.min_traffic_speed, self.config.max_traffic_speed);
        let pos = Vec3::new(self.lane_x(segment, lane), template.height, segment_center(segment));
        let actor = self.make_actor(kind, pos, speed, template, segment, lane);
        self.live_traffic += 1;
        self.push(actor, actors, events);
        true
    }

    fn spawn_obstacle(
        &mut self,
        segment: &Segment,
        lane: usize,
        actors: &mut Vec<Actor>,
        events: &mut Vec<StreamEvent>,
    ) -> bool {
        let kind = ActorKind::Obstacle;
        let Some(template) = self.templates.get(kind.template_key()).copied() else {
            return false;
        };
        if !self.vehicle_claims.claim(segment.id, lane) {
            return false;
        }
        let pos = Vec3::new(self.lane_x(segment, lane), template.height, segment_center(segment));
        let actor = self.make_actor(kind, pos, 0.0, template, segment, lane);
        self.push(actor, actors, events);
        true
    }

    fn make_actor(
        &mut self,
        kind: ActorKind,
        pos: Vec3,
        speed: f32,
        template: ActorTemplate,
        segment: &Segment,
        lane: usize,
    ) -> Actor {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        Actor {
            id,
            kind,
            pos,
            speed,
            cruise_speed: speed,
            frozen: false,
            braking: false,
            value: 0,
            half_length: template.half_length,
            half_width: template.half_width,
            origin: segment.id,
            lane,
        }
    }

    fn push(&self, actor: Actor, actors: &mut Vec<Actor>, events: &mut Vec<StreamEvent>) {
        log::trace!(
            "Spawned {:?} {:?} in segment {:?} lane {} at z={:.1}",
            actor.kind,
            actor.id,
            actor.origin,
            actor.lane,
            actor.pos.z
        );
        events.push(StreamEvent::ActorSpawned {
            actor: actor.id,
            kind: actor.kind,
            segment: actor.origin,
            lane: actor.lane,
        });
        actors.push(actor);
    }

    fn lane_x(&self, segment: &Segment, lane: usize) -> f32 {
        lane_offset(lane, segment.lane_count, self.lane_width)
    }
}

fn segment_center(segment: &Segment) -> f32 {
    segment.position + segment.length * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::TemplateKey;
    use crate::sim::rng::{FixedSource, PcgSource, ScriptedSource};
    use crate::sim::segment::SegmentId;

    fn traffic_only(probability: f32, max_traffic: usize) -> SpawnConfig {
        SpawnConfig {
            traffic_probability: probability,
            max_traffic,
            gold_probability: 0.0,
            silver_probability: 0.0,
            bronze_probability: 0.0,
            ..SpawnConfig::default()
        }
    }

    fn spawner(config: SpawnConfig) -> ActorSpawner {
        ActorSpawner::new(config, &StreamConfig::default(), ActorTemplates::arcade()).unwrap()
    }

    fn segment() -> Segment {
        Segment::new(SegmentId(0), 100.0, 50.0, 4)
    }

    #[test]
    fn test_every_lane_spawns_traffic_under_threshold() {
        let mut spawner = spawner(traffic_only(0.3, 24));
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        let spawned = spawner.populate(&mut seg, &mut FixedSource(0.25), &mut actors, &mut events);
        assert_eq!(spawned, 4);
        assert_eq!(spawner.live_traffic(), 4);
        let lanes: Vec<usize> = actors.iter().map(|a| a.lane).collect();
        assert_eq!(lanes, vec![0, 1, 2, 3]);
        assert!(actors.iter().all(|a| a.kind == ActorKind::Traffic));
        assert_eq!(seg.occupancy.count(), 4);
    }

    #[test]
    fn test_traffic_speed_within_range() {
        let mut spawner = spawner(traffic_only(1.0, 100));
        let mut rng = PcgSource::new(3);
        let mut actors = Vec::new();
        let mut events = Vec::new();
        for i in 0..10 {
            let mut seg = Segment::new(SegmentId(i), i as f32 * 50.0, 50.0, 4);
            spawner.populate(&mut seg, &mut rng, &mut actors, &mut events);
        }
        assert_eq!(actors.len(), 40);
        for actor in &actors {
            assert!((5.0..=15.0).contains(&actor.speed));
            assert_eq!(actor.speed, actor.cruise_speed);
        }
    }

    #[test]
    fn test_budget_stops_remaining_lanes() {
        let mut spawner = spawner(traffic_only(0.3, 2));
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        spawner.populate(&mut seg, &mut FixedSource(0.0), &mut actors, &mut events);
        assert_eq!(spawner.live_traffic(), 2);
        assert_eq!(actors.len(), 2);
        assert!(events.contains(&StreamEvent::TrafficBudgetReached {
            segment: SegmentId(0),
            lane: 2
        }));
    }

    #[test]
    fn test_second_populate_is_noop() {
        let mut spawner = spawner(traffic_only(0.3, 24));
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        spawner.populate(&mut seg, &mut FixedSource(0.1), &mut actors, &mut events);
        let again = spawner.populate(&mut seg, &mut FixedSource(0.1), &mut actors, &mut events);
        assert_eq!(again, 0);
        assert_eq!(actors.len(), 4);
        assert_eq!(spawner.live_traffic(), 4);
    }

    #[test]
    fn test_collectible_tier_thresholds() {
        let config = SpawnConfig {
            traffic_probability: 0.0,
            ..SpawnConfig::default()
        };
        let cases = [
            (0.01, Some(CollectibleTier::Gold)),
            (0.07, Some(CollectibleTier::Silver)),
            (0.15, Some(CollectibleTier::Bronze)),
            (0.34, Some(CollectibleTier::Bronze)),
            (0.35, None),
        ];
        for (draw, expected) in cases {
            let spawner = spawner(config.clone());
            assert_eq!(spawner.roll_collectible(&mut FixedSource(draw)), expected, "draw {draw}");
        }
    }

    #[test]
    fn test_silver_spawns_with_value_and_jitter() {
        let config = SpawnConfig {
            traffic_probability: 0.0,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config);
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        spawner.populate(&mut seg, &mut FixedSource(0.07), &mut actors, &mut events);
        assert_eq!(actors.len(), 4);
        for actor in &actors {
            assert_eq!(
                actor.kind,
                ActorKind::Collectible {
                    tier: CollectibleTier::Silver
                }
            );
            assert_eq!(actor.value, 5);
            assert!((actor.pos.z - 125.0).abs() <= 5.0);
        }
        assert_eq!(spawner.live_traffic(), 0);
        // pickups do not claim vehicle lanes
        assert_eq!(seg.occupancy.count(), 0);
    }

    #[test]
    fn test_collectible_and_traffic_layers_are_independent() {
        let mut spawner = spawner(SpawnConfig::default());
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        // lane 0: gold, jitter, traffic, speed; lanes 1-3 miss both layers
        let mut rng =
            ScriptedSource::new(vec![0.01, 0.5, 0.1, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9]);
        spawner.populate(&mut seg, &mut rng, &mut actors, &mut events);
        assert_eq!(actors.len(), 2);
        assert!(actors.iter().all(|a| a.lane == 0));
        assert_eq!(spawner.live_traffic(), 1);
    }

    #[test]
    fn test_missing_tier_template_is_skipped() {
        let config = SpawnConfig {
            traffic_probability: 0.0,
            ..SpawnConfig::default()
        };
        let mut templates = ActorTemplates::arcade();
        templates.remove(TemplateKey::Collectible(CollectibleTier::Silver));
        let mut spawner =
            ActorSpawner::new(config, &StreamConfig::default(), templates).unwrap();
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        let spawned = spawner.populate(&mut seg, &mut FixedSource(0.07), &mut actors, &mut events);
        assert_eq!(spawned, 0);
        assert!(actors.is_empty());
    }

    #[test]
    fn test_empty_registry_rejected_when_spawning() {
        let result = ActorSpawner::new(
            SpawnConfig::default(),
            &StreamConfig::default(),
            ActorTemplates::empty(),
        );
        assert!(matches!(result, Err(ConfigError::EmptyTemplates)));

        let disabled = SpawnConfig {
            traffic_probability: 0.0,
            gold_probability: 0.0,
            silver_probability: 0.0,
            bronze_probability: 0.0,
            ..SpawnConfig::default()
        };
        assert!(
            ActorSpawner::new(disabled, &StreamConfig::default(), ActorTemplates::empty()).is_ok()
        );
    }

    #[test]
    fn test_obstacles_never_share_lane_with_traffic() {
        let config = SpawnConfig {
            traffic_probability: 0.5,
            obstacle_probability: 0.5,
            gold_probability: 0.0,
            silver_probability: 0.0,
            bronze_probability: 0.0,
            max_traffic: 100,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config);
        let mut rng = PcgSource::new(11);
        let mut actors = Vec::new();
        let mut events = Vec::new();
        for i in 0..50 {
            let mut seg = Segment::new(SegmentId(i), i as f32 * 50.0, 50.0, 4);
            let start = actors.len();
            spawner.populate(&mut seg, &mut rng, &mut actors, &mut events);
            let mut lanes: Vec<usize> = actors[start..].iter().map(|a| a.lane).collect();
            let before = lanes.len();
            lanes.dedup();
            assert_eq!(lanes.len(), before, "two vehicles in one lane of segment {i}");
        }
        assert!(actors.iter().any(|a| a.kind == ActorKind::Obstacle));
        assert!(actors.iter().all(|a| a.kind != ActorKind::Obstacle || a.speed == 0.0));
    }

    #[test]
    fn test_difficulty_raises_obstacle_chance() {
        let config = SpawnConfig {
            traffic_probability: 0.0,
            obstacle_probability: 0.2,
            gold_probability: 0.0,
            silver_probability: 0.0,
            bronze_probability: 0.0,
            ..SpawnConfig::default()
        };
        let mut spawner = spawner(config);
        let mut actors = Vec::new();
        let mut events = Vec::new();

        let mut calm = Segment::new(SegmentId(0), 0.0, 50.0, 4);
        spawner.populate(&mut calm, &mut FixedSource(0.3), &mut actors, &mut events);
        assert!(actors.is_empty());

        spawner.set_difficulty(2.0);
        assert_eq!(spawner.obstacle_chance(), 0.4);
        let mut hard = Segment::new(SegmentId(1), 50.0, 50.0, 4);
        spawner.populate(&mut hard, &mut FixedSource(0.3), &mut actors, &mut events);
        assert_eq!(actors.len(), 4);
        assert!(actors.iter().all(|a| a.kind == ActorKind::Obstacle));

        spawner.set_difficulty(10.0);
        assert_eq!(spawner.obstacle_chance(), 1.0);
    }

    #[test]
    fn test_release_decrements_traffic() {
        let mut spawner = spawner(traffic_only(1.0, 24));
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        spawner.populate(&mut seg, &mut FixedSource(0.5), &mut actors, &mut events);
        spawner.release(&actors[0]);
        assert_eq!(spawner.live_traffic(), 3);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_release_underflow_panics() {
        let mut spawner = spawner(traffic_only(1.0, 24));
        let mut seg = segment();
        let mut actors = Vec::new();
        let mut events = Vec::new();
        spawner.populate(&mut seg, &mut FixedSource(0.5), &mut actors, &mut events);
        for actor in actors.iter().chain(actors.iter()) {
            spawner.release(actor);
        }
    }
}
