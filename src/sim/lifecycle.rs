//! Actor lifecycle: contacts, forward motion, braking, despawn
//!
//! Braking decisions for a tick are made against a snapshot taken before any
//! actor moves, so the result does not depend on iteration order.

use super::actor::{Actor, ActorId, ActorKind};
use super::contact::Contact;
use super::spawner::ActorSpawner;
use super::tick::{PlayerProbe, StreamEvent};
use crate::config::TrafficConfig;
use crate::lerp;

/// Something a traffic actor may have to brake for
#[derive(Debug, Clone, Copy)]
struct Blocker {
    id: Option<ActorId>,
    x: f32,
    z: f32,
    rear: f32,
    speed: f32,
}

/// What a traffic actor sees ahead in its lane
#[derive(Debug, Clone, Copy, PartialEq)]
struct Leader {
    /// Bumper-to-bumper distance (negative when overlapping)
    gap: f32,
    speed: f32,
}

#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    config: TrafficConfig,
    lane_width: f32,
}

impl ActorLifecycle {
    pub fn new(config: TrafficConfig, lane_width: f32) -> Self {
        Self { config, lane_width }
    }

    /// React to player contacts; returns true if the player hit traffic
    pub fn apply_contacts(
        &self,
        contacts: &[Contact],
        actors: &mut Vec<Actor>,
        events: &mut Vec<StreamEvent>,
    ) -> bool {
        let mut crashed = false;
        for contact in contacts {
            let Some(id) = contact.player_actor() else {
                continue;
            };
            let Some(index) = actors.iter().position(|a| a.id == id) else {
                continue;
            };
            let actor = &mut actors[index];
            match actor.kind {
                ActorKind::Traffic => {
                    crashed = true;
                    if !actor.frozen {
                        actor.freeze();
                        log::info!("Player collided with traffic {:?}", id);
                        events.push(StreamEvent::TrafficCollision { actor: id });
                    }
                }
                ActorKind::Collectible { tier } => {
                    let value = actor.value;
                    actors.remove(index);
                    log::debug!("Picked up {:?} worth {}", tier, value);
                    events.push(StreamEvent::CollectiblePicked {
                        actor: id,
                        tier,
                        value,
                    });
                }
                ActorKind::Obstacle => {}
            }
        }
        crashed
    }

    /// Advance every actor by `dt`
    pub fn step(&self, actors: &mut [Actor], player: &PlayerProbe, dt: f32) {
        let blockers: Vec<Blocker> = actors
            .iter()
            .filter(|a| a.kind.blocks_lane())
            .map(|a| Blocker {
                id: Some(a.id),
                x: a.pos.x,
                z: a.pos.z,
                rear: a.rear(),
                speed: a.speed,
            })
            .chain(std::iter::once(Blocker {
                id: None,
                x: player.pos.x,
                z: player.pos.z,
                rear: player.rear(),
                speed: player.speed,
            }))
            .collect();

        for actor in actors.iter_mut().filter(|a| a.kind.is_traffic()) {
            if actor.frozen {
                continue;
            }
            let leader = self.leader(actor, &blockers);
            self.adjust_speed(actor, leader, dt);
            actor.pos.z += actor.speed * dt;
        }
    }

    /// Remove actors that fell behind; returns how many were removed
    pub fn despawn(
        &self,
        actors: &mut Vec<Actor>,
        reference: f32,
        spawner: &mut ActorSpawner,
        events: &mut Vec<StreamEvent>,
    ) -> usize {
        let line = reference - self.config.despawn_distance;
        let before = actors.len();
        actors.retain(|actor| {
            if actor.pos.z < line {
                spawner.release(actor);
                events.push(StreamEvent::ActorDespawned {
                    actor: actor.id,
                    kind: actor.kind,
                });
                false
            } else {
                true
            }
        });
        before - actors.len()
    }

    /// Nearest blocker ahead in the same lane within braking distance
    fn leader(&self, actor: &Actor, blockers: &[Blocker]) -> Option<Leader> {
        let half_lane = self.lane_width * 0.5;
        blockers
            .iter()
            .filter(|b| b.id != Some(actor.id))
            .filter(|b| (b.x - actor.pos.x).abs() < half_lane && b.z > actor.pos.z)
            .map(|b| Leader {
                gap: b.rear - actor.front(),
                speed: b.speed,
            })
            .filter(|l| l.gap <= self.config.braking_distance)
            .min_by(|a, b| a.gap.total_cmp(&b.gap))
    }

    fn adjust_speed(&self, actor: &mut Actor, leader: Option<Leader>, dt: f32) {
        let stop = self.config.stopping_distance;
        let brake = self.config.braking_distance;
        match leader {
            Some(leader) if leader.gap <= stop => {
                actor.speed = 0.0;
                actor.braking = true;
            }
            Some(leader) => {
                let span = (brake - stop).max(f32::EPSILON);
                let intensity = 1.0 - (leader.gap - stop) / span;
                let target = leader.speed * self.config.leader_speed_factor;
                actor.speed = lerp(
                    actor.speed,
                    target,
                    intensity * dt * self.config.brake_blend_rate,
                );
                actor.braking = true;
            }
            None => {
                actor.braking = false;
                if actor.speed < actor.cruise_speed {
                    actor.speed =
                        (actor.speed + self.config.reaccel_rate * dt).min(actor.cruise_speed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SpawnConfig, StreamConfig};
    use crate::consts::SIM_DT;
    use crate::sim::actor::{ActorTemplates, CollectibleTier};
    use crate::sim::segment::SegmentId;
    use glam::Vec3;

    fn lifecycle() -> ActorLifecycle {
        ActorLifecycle::new(TrafficConfig::default(), 4.0)
    }

    fn traffic(id: u32, x: f32, z: f32, speed: f32) -> Actor {
        Actor {
            id: ActorId(id),
            kind: ActorKind::Traffic,
            pos: Vec3::new(x, 0.0, z),
            speed,
            cruise_speed: speed,
            frozen: false,
            braking: false,
            value: 0,
            half_length: 2.0,
            half_width: 1.0,
            origin: SegmentId(0),
            lane: 0,
        }
    }

    fn far_player() -> PlayerProbe {
        PlayerProbe::at(-1000.0)
    }

    #[test]
    fn test_free_traffic_moves_forward() {
        let mut actors = vec![traffic(1, 2.0, 0.0, 10.0)];
        lifecycle().step(&mut actors, &far_player(), 0.5);
        assert_eq!(actors[0].pos.z, 5.0);
        assert!(!actors[0].braking);
    }

    #[test]
    fn test_stops_inside_stopping_distance() {
        // gap = (10 - 2) - (4 + 2) = 2
        let mut actors = vec![traffic(1, 2.0, 4.0, 10.0), traffic(2, 2.0, 10.0, 0.0)];
        lifecycle().step(&mut actors, &far_player(), SIM_DT);
        assert_eq!(actors[0].speed, 0.0);
        assert!(actors[0].braking);
        assert_eq!(actors[0].pos.z, 4.0);
    }

    #[test]
    fn test_brakes_toward_leader_speed() {
        // gap = (20 - 2) - (8 + 2) = 8: inside braking, outside stopping
        let mut actors = vec![traffic(1, 2.0, 8.0, 12.0), traffic(2, 2.0, 20.0, 6.0)];
        lifecycle().step(&mut actors, &far_player(), SIM_DT);
        let follower = &actors[0];
        assert!(follower.braking);
        assert!(follower.speed < 12.0);
        assert!(follower.speed > 6.0 * 0.9);
    }

    #[test]
    fn test_other_lane_is_ignored() {
        let mut actors = vec![traffic(1, 2.0, 8.0, 12.0), traffic(2, -2.0, 12.0, 0.0)];
        lifecycle().step(&mut actors, &far_player(), SIM_DT);
        assert!(!actors[0].braking);
        assert_eq!(actors[0].speed, 12.0);
    }

    fn obstacle(id: u32, x: f32, z: f32) -> Actor {
        let mut actor = traffic(id, x, z, 0.0);
        actor.kind = ActorKind::Obstacle;
        actor.half_length = 1.0;
        actor
    }

    #[test]
    fn test_stops_behind_obstacle() {
        // gap = (10 - 1) - (4 + 2) = 3
        let mut actors = vec![traffic(1, 2.0, 4.0, 10.0), obstacle(2, 2.0, 10.0)];
        lifecycle().step(&mut actors, &far_player(), SIM_DT);
        assert_eq!(actors[0].speed, 0.0);
        assert!(actors[0].braking);
        assert_eq!(actors[1].pos.z, 10.0);
    }

    #[test]
    fn test_slows_approaching_obstacle_without_hitting_it() {
        let life = lifecycle();
        // gap = (10 - 1) - (0 + 2) = 7: braking zone
        let mut actors = vec![traffic(1, 2.0, 0.0, 10.0), obstacle(2, 2.0, 10.0)];
        life.step(&mut actors, &far_player(), SIM_DT);
        assert!(actors[0].braking);
        assert!(actors[0].speed < 10.0);
        for _ in 0..600 {
            life.step(&mut actors, &far_player(), SIM_DT);
        }
        assert!(actors[0].speed < 0.5);
        assert!(actors[1].rear() - actors[0].front() > 0.0);
        assert_eq!(actors[1].pos.z, 10.0);
    }

    #[test]
    fn test_brakes_behind_player() {
        let player = PlayerProbe::at(10.0).with_lateral(2.0).with_speed(0.0);
        // gap = (10 - 2.25) - (3 + 2) = 2.75
        let mut actors = vec![traffic(1, 2.0, 3.0, 12.0)];
        lifecycle().step(&mut actors, &player, SIM_DT);
        assert_eq!(actors[0].speed, 0.0);
    }

    #[test]
    fn test_reaccelerates_gradually_after_braking() {
        let life = lifecycle();
        let mut actors = vec![traffic(1, 2.0, 0.0, 12.0)];
        actors[0].speed = 2.0;
        actors[0].braking = true;
        life.step(&mut actors, &far_player(), 0.5);
        assert!(!actors[0].braking);
        assert_eq!(actors[0].speed, 4.0);
        for _ in 0..20 {
            life.step(&mut actors, &far_player(), 0.5);
        }
        assert_eq!(actors[0].speed, 12.0);
    }

    #[test]
    fn test_frozen_never_moves() {
        let life = lifecycle();
        let mut actors = vec![traffic(1, 2.0, 50.0, 10.0)];
        actors[0].freeze();
        for _ in 0..1000 {
            life.step(&mut actors, &far_player(), SIM_DT);
        }
        assert_eq!(actors[0].pos.z, 50.0);
        assert_eq!(actors[0].speed, 0.0);
        assert!(actors[0].frozen);
    }

    #[test]
    fn test_traffic_contact_freezes_once() {
        let life = lifecycle();
        let mut actors = vec![traffic(1, 2.0, 0.0, 10.0)];
        let mut events = Vec::new();
        let contacts = [Contact::with_player(ActorId(1))];
        assert!(life.apply_contacts(&contacts, &mut actors, &mut events));
        assert!(life.apply_contacts(&contacts, &mut actors, &mut events));
        assert!(actors[0].frozen);
        assert_eq!(
            events,
            vec![StreamEvent::TrafficCollision { actor: ActorId(1) }]
        );
    }

    #[test]
    fn test_collectible_contact_removes_and_reports_value() {
        let life = lifecycle();
        let mut coin = traffic(7, 2.0, 0.0, 0.0);
        coin.kind = ActorKind::Collectible {
            tier: CollectibleTier::Gold,
        };
        coin.value = 10;
        let mut actors = vec![coin];
        let mut events = Vec::new();
        let crashed = life.apply_contacts(&[Contact::with_player(ActorId(7))], &mut actors, &mut events);
        assert!(!crashed);
        assert!(actors.is_empty());
        assert_eq!(
            events,
            vec![StreamEvent::CollectiblePicked {
                actor: ActorId(7),
                tier: CollectibleTier::Gold,
                value: 10
            }]
        );
    }

    #[test]
    fn test_despawn_threshold() {
        let life = lifecycle();
        let mut spawner = ActorSpawner::new(
            SpawnConfig::default(),
            &StreamConfig::default(),
            ActorTemplates::arcade(),
        )
        .unwrap();
        let reference = 100.0;
        let eps = 0.01;
        let mut behind = traffic(1, 2.0, reference - 30.0 - eps, 0.0);
        behind.kind = ActorKind::Obstacle;
        let mut kept = traffic(2, -2.0, reference - 30.0 + eps, 0.0);
        kept.kind = ActorKind::Obstacle;
        let mut actors = vec![behind, kept];
        let mut events = Vec::new();
        let removed = life.despawn(&mut actors, reference, &mut spawner, &mut events);
        assert_eq!(removed, 1);
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].id, ActorId(2));
        assert_eq!(
            events,
            vec![StreamEvent::ActorDespawned {
                actor: ActorId(1),
                kind: ActorKind::Obstacle
            }]
        );
    }
}
