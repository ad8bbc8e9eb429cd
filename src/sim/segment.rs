//! Track segments and lanes

use serde::{Deserialize, Serialize};

use crate::lane_offset;

/// Stable identity of a pooled segment (survives recycling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

/// One bit per lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneMask(pub u32);

impl LaneMask {
    pub fn contains(self, lane: usize) -> bool {
        lane < 32 && self.0 & (1 << lane) != 0
    }

    pub fn insert(&mut self, lane: usize) {
        debug_assert!(lane < 32);
        self.0 |= 1 << lane;
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// A fixed-length slice of track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    /// Start of the segment along the track axis
    pub position: f32,
    pub length: f32,
    pub lane_count: usize,
    /// Lanes holding a vehicle spawn claim from the last population pass
    pub occupancy: LaneMask,
    /// Already populated for the current cycle
    pub populated: bool,
    /// Times this segment has been recycled
    pub cycle: u32,
}

impl Segment {
    pub fn new(id: SegmentId, position: f32, length: f32, lane_count: usize) -> Self {
        Self {
            id,
            position,
            length,
            lane_count,
            occupancy: LaneMask::default(),
            populated: false,
            cycle: 0,
        }
    }

    /// Far edge of the segment
    pub fn end(&self) -> f32 {
        self.position + self.length
    }

    /// Move to a new position and reset per-cycle state
    pub fn reposition(&mut self, position: f32) {
        self.position = position;
        self.occupancy.clear();
        self.populated = false;
        self.cycle += 1;
    }

    pub fn lanes(&self, lane_width: f32) -> impl Iterator<Item = Lane> + '_ {
        (0..self.lane_count).map(move |index| Lane {
            index,
            offset: lane_offset(index, self.lane_count, lane_width),
            claimed: self.occupancy.contains(index),
        })
    }
}

/// A lane slot of a segment, derived on demand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub index: usize,
    /// Lateral offset of the lane centre
    pub offset: f32,
    pub claimed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_mask() {
        let mut mask = LaneMask::default();
        assert!(!mask.contains(2));
        mask.insert(2);
        mask.insert(2);
        assert!(mask.contains(2));
        assert_eq!(mask.count(), 1);
        assert!(!mask.contains(40));
        mask.clear();
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_reposition_resets_cycle_state() {
        let mut segment = Segment::new(SegmentId(0), 0.0, 50.0, 4);
        segment.occupancy.insert(1);
        segment.populated = true;
        segment.reposition(250.0);
        assert_eq!(segment.position, 250.0);
        assert_eq!(segment.end(), 300.0);
        assert_eq!(segment.occupancy, LaneMask::default());
        assert!(!segment.populated);
        assert_eq!(segment.cycle, 1);
        assert_eq!(segment.id, SegmentId(0));
    }

    #[test]
    fn test_lanes_report_offsets_and_claims() {
        let mut segment = Segment::new(SegmentId(3), 0.0, 50.0, 4);
        segment.occupancy.insert(3);
        let lanes: Vec<Lane> = segment.lanes(4.0).collect();
        assert_eq!(lanes.len(), 4);
        assert_eq!(lanes[0].offset, -6.0);
        assert!(lanes[3].claimed);
        assert!(!lanes[0].claimed);
    }
}
