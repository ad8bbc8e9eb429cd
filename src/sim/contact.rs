//! Contact feed
//!
//! Hosts with a physics engine report contacts directly. Headless hosts can
//! use `detect_contacts`, a footprint overlap test on the x/z plane.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId};
use super::tick::PlayerProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Player,
    Actor(ActorId),
}

/// An unordered pair of touching bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: Body,
    pub b: Body,
}

impl Contact {
    pub fn new(a: Body, b: Body) -> Self {
        Self { a, b }
    }

    pub fn with_player(actor: ActorId) -> Self {
        Self::new(Body::Player, Body::Actor(actor))
    }

    /// The actor in a player<->actor contact, whichever side it is on
    pub fn player_actor(&self) -> Option<ActorId> {
        match (self.a, self.b) {
            (Body::Player, Body::Actor(id)) | (Body::Actor(id), Body::Player) => Some(id),
            _ => None,
        }
    }
}

/// Whether the player's footprint overlaps an actor's
pub fn overlaps(player: &PlayerProbe, actor: &Actor) -> bool {
    let dx = (player.pos.x - actor.pos.x).abs();
    let dz = (player.pos.z - actor.pos.z).abs();
    dx < player.half_width + actor.half_width && dz < player.half_length + actor.half_length
}

/// Player contacts for every overlapping actor, in actor order
pub fn detect_contacts(actors: &[Actor], player: &PlayerProbe) -> Vec<Contact> {
    actors
        .iter()
        .filter(|actor| overlaps(player, actor))
        .map(|actor| Contact::with_player(actor.id))
        .collect()
}
