//! Run bookkeeping
//!
//! Tracks the distance score, difficulty ramp and gem total for one run, fed
//! by the stream's events. Game over is triggered by the first traffic
//! collision.

use serde::{Deserialize, Serialize};

use crate::config::ScoreConfig;
use crate::sim::StreamEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunScore {
    config: ScoreConfig,
    pub phase: RunPhase,
    /// Accumulated distance score
    pub score: f32,
    pub difficulty: f32,
    /// Sum of collected tier values
    pub gems: u32,
    pub pickups: u32,
    /// Seconds since the last difficulty bump
    timer: f32,
}

impl RunScore {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            phase: RunPhase::Playing,
            score: 0.0,
            difficulty: 1.0,
            gems: 0,
            pickups: 0,
            timer: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    /// Whole points shown to the player
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Advance score and difficulty by `dt` at the player's current speed
    pub fn update(&mut self, dt: f32, player_speed: f32) {
        if !self.is_active() {
            return;
        }
        let speed_factor = if self.config.player_max_speed > 0.0 {
            player_speed / self.config.player_max_speed
        } else {
            0.0
        };
        self.score += dt * self.config.multiplier * self.difficulty * (1.0 + speed_factor);

        self.timer += dt;
        if self.config.difficulty_interval > 0.0 && self.timer >= self.config.difficulty_interval {
            self.timer = 0.0;
            self.difficulty =
                (self.difficulty + self.config.difficulty_step).min(self.config.max_difficulty);
            log::info!("Difficulty raised to {:.1}", self.difficulty);
        }
    }

    /// Fold a stream event into the run
    pub fn record(&mut self, event: &StreamEvent) {
        match *event {
            StreamEvent::CollectiblePicked { value, .. } if self.is_active() => {
                self.gems += value;
                self.pickups += 1;
            }
            StreamEvent::TrafficCollision { .. } if self.is_active() => {
                self.phase = RunPhase::GameOver;
                log::info!(
                    "Game over: score {}, gems {}",
                    self.display_score(),
                    self.gems
                );
            }
            _ => {}
        }
    }

    /// Start a fresh run with the same tuning
    pub fn restart(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
