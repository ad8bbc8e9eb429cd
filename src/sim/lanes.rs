//! Lane claims for a single population pass
//!
//! Claims only live for the duration of one spawn pass over a segment. They
//! say nothing about where actors are once they start moving.

use std::collections::HashMap;

use super::segment::{LaneMask, SegmentId};

#[derive(Debug, Clone, Default)]
pub struct LaneOccupancyTracker {
    claims: HashMap<SegmentId, LaneMask>,
}

impl LaneOccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh pass over `segment`, dropping its previous claims
    pub fn begin_pass(&mut self, segment: SegmentId) {
        self.claims.insert(segment, LaneMask::default());
    }

    pub fn is_claimed(&self, segment: SegmentId, lane: usize) -> bool {
        self.claims
            .get(&segment)
            .is_some_and(|mask| mask.contains(lane))
    }

    /// Claim a lane; returns false if it was already claimed
    pub fn claim(&mut self, segment: SegmentId, lane: usize) -> bool {
        let mask = self.claims.entry(segment).or_default();
        if mask.contains(lane) {
            return false;
        }
        mask.insert(lane);
        true
    }

    pub fn claimed_count(&self, segment: SegmentId) -> u32 {
        self.claims.get(&segment).map_or(0, |mask| mask.count())
    }

    pub fn mask(&self, segment: SegmentId) -> LaneMask {
        self.claims.get(&segment).copied().unwrap_or_default()
    }
}
