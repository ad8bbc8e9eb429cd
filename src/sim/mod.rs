//! Deterministic track simulation
//!
//! Everything the endless track needs lives here. This module must be pure
//! and deterministic:
//! - Time only advances through `dt` passed in by the host
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ids increase monotonically)
//! - No rendering, physics, or platform dependencies

pub mod actor;
pub mod contact;
pub mod lanes;
pub mod lifecycle;
pub mod pool;
pub mod rng;
pub mod scenery;
pub mod segment;
pub mod spawner;
pub mod stream;
pub mod tick;

pub use actor::{Actor, ActorId, ActorKind, ActorTemplate, ActorTemplates, CollectibleTier, TemplateKey};
pub use contact::{Body, Contact, detect_contacts};
pub use lanes::LaneOccupancyTracker;
pub use lifecycle::ActorLifecycle;
pub use pool::SegmentPool;
pub use rng::{FixedSource, PcgSource, RandomSource, RngState, ScriptedSource};
pub use scenery::{Cloud, CloudId, CloudPool, SceneryStreamer, SceneryTile, TileId};
pub use segment::{Lane, LaneMask, Segment, SegmentId};
pub use spawner::ActorSpawner;
pub use stream::{SegmentStream, StreamSnapshot};
pub use tick::{PlayerProbe, StreamEvent, TickInput};
