//! Endless Road headless driver
//!
//! Runs a seeded session with an autopilot player and logs diagnostics.
//!
//! Usage: `endless-road [config.json] [seed] [seconds]`

use endless_road::consts::*;
use endless_road::lane_offset;
use endless_road::sim::{PlayerProbe, SegmentStream, TickInput, detect_contacts};
use endless_road::{RunScore, TrackConfig};

/// Autopilot cruising speed (units/s)
const PLAYER_SPEED: f32 = 20.0;
/// How far ahead the autopilot looks for traffic
const LOOKAHEAD: f32 = 30.0;

/// Player controlled by a simple lane-picking autopilot
struct Autopilot {
    z: f32,
    lane: usize,
    speed: f32,
}

impl Autopilot {
    fn new(lane: usize) -> Self {
        Self {
            z: 0.0,
            lane,
            speed: PLAYER_SPEED,
        }
    }

    fn probe(&self, config: &TrackConfig) -> PlayerProbe {
        let x = lane_offset(self.lane, config.stream.lane_count, config.stream.lane_width);
        PlayerProbe::at(self.z).with_lateral(x).with_speed(self.speed)
    }

    /// Move to the lane with the most room ahead
    fn steer(&mut self, stream: &SegmentStream, config: &TrackConfig) {
        let lanes = config.stream.lane_count;
        let clearance = |lane: usize| -> f32 {
            stream
                .actors()
                .iter()
                .filter(|a| a.kind.blocks_lane() && a.lane == lane)
                .map(|a| a.rear() - self.z)
                .filter(|gap| *gap > -2.0)
                .fold(LOOKAHEAD, f32::min)
        };
        let current = clearance(self.lane);
        if current >= LOOKAHEAD {
            return;
        }
        // adjacent lanes only
        let candidates = [self.lane.checked_sub(1), Some(self.lane + 1)];
        let best = candidates
            .into_iter()
            .flatten()
            .filter(|lane| *lane < lanes)
            .max_by(|a, b| clearance(*a).total_cmp(&clearance(*b)));
        if let Some(best) = best.filter(|lane| clearance(*lane) > current) {
            log::debug!("Autopilot: lane {} -> {}", self.lane, best);
            self.lane = best;
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Endless Road (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => match TrackConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("endless-road: {e}");
                std::process::exit(1);
            }
        },
        _ => TrackConfig::default(),
    };
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);

    let mut stream = match SegmentStream::seeded(&config, seed, 0.0) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("endless-road: {e}");
            std::process::exit(1);
        }
    };
    let mut run = RunScore::new(config.score.clone());
    let mut player = Autopilot::new(config.stream.lane_count / 2);

    let total_ticks = (seconds / SIM_DT).ceil() as u64;
    let ticks_per_second = (1.0 / SIM_DT).round() as u64;

    for tick in 1..=total_ticks {
        if run.is_active() {
            player.steer(&stream, &config);
            player.z += player.speed * SIM_DT;
        } else {
            player.speed = 0.0;
        }

        let probe = player.probe(&config);
        let contacts = detect_contacts(stream.actors(), &probe);
        let input = TickInput {
            player: probe,
            contacts,
        };
        stream.step(&input, SIM_DT);

        for event in stream.drain_events() {
            run.record(&event);
        }
        run.update(SIM_DT, player.speed);
        stream.set_difficulty(run.difficulty);

        if tick % ticks_per_second == 0 {
            log::info!(
                "t={:>4}s z={:>7.1} segments={} traffic={} actors={} tiles={} score={} gems={}",
                tick / ticks_per_second,
                player.z,
                stream.segment_count(),
                stream.live_traffic(),
                stream.actors().len(),
                stream.scenery().len(),
                run.display_score(),
                run.gems
            );
        }

        if !run.is_active() {
            log::info!("Run ended at t={:.1}s", tick as f32 * SIM_DT);
            break;
        }
    }

    match serde_json::to_string_pretty(&(stream.snapshot(), &run)) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("endless-road: failed to serialize snapshot: {e}"),
    }
}
