//! Capacity-bounded segment pool
//!
//! Segments live in a FIFO ordered by position. Placement is monotonic, so
//! the front of the queue is always the oldest and rearmost segment.

use std::collections::VecDeque;

use super::segment::{Segment, SegmentId};
use crate::config::ConfigError;

#[derive(Debug, Clone)]
pub struct SegmentPool {
    segments: VecDeque<Segment>,
    capacity: usize,
    length: f32,
    lane_count: usize,
}

impl SegmentPool {
    pub fn new(capacity: usize, length: f32, lane_count: usize) -> Self {
        Self {
            segments: VecDeque::with_capacity(capacity),
            capacity,
            length,
            lane_count,
        }
    }

    /// Allocate `n` consecutive segments at `start, start + L, ...`
    pub fn acquire_initial(&mut self, n: usize, start: f32) -> Result<Vec<SegmentId>, ConfigError> {
        if n == 0 {
            return Err(ConfigError::NoInitialSegments);
        }
        if !(self.length > 0.0) {
            return Err(ConfigError::SegmentLength(self.length));
        }
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            match self.allocate(start + i as f32 * self.length) {
                Some(id) => ids.push(id),
                None => {
                    return Err(ConfigError::ActiveBelowInitial {
                        initial: n,
                        active: self.capacity,
                    });
                }
            }
        }
        Ok(ids)
    }

    /// Create a fresh segment at `position`, or `None` once at capacity
    pub fn allocate(&mut self, position: f32) -> Option<SegmentId> {
        if self.segments.len() >= self.capacity {
            return None;
        }
        let id = SegmentId(self.segments.len() as u32);
        self.segments
            .push_back(Segment::new(id, position, self.length, self.lane_count));
        Some(id)
    }

    /// Move the oldest segment to `frontier` and hand it back for repopulation
    pub fn recycle_oldest(&mut self, frontier: f32) -> SegmentId {
        let mut segment = self
            .segments
            .pop_front()
            .expect("segment pool empty during recycle");
        debug_assert!(
            self.segments.back().is_none_or(|b| b.position < frontier),
            "recycle target overlaps a live segment"
        );
        segment.reposition(frontier);
        let id = segment.id;
        self.segments.push_back(segment);
        id
    }

    pub fn oldest(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn newest(&self) -> Option<&Segment> {
        self.segments.back()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Segments in position order
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
