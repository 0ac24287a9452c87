//! Lane geometry: lane count, width and lateral centers.

/// Index of a lane, 0 = rightmost (the lane closed by the roadworks).
pub type LaneIndex = usize;

/// Fixed cross-section of the road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    /// Total road width across all lanes.
    pub road_width: f32,
    /// Number of lanes.
    pub lane_count: usize,
}

impl LaneGeometry {
    pub fn new(road_width: f32, lane_count: usize) -> Self {
        Self {
            road_width,
            lane_count: lane_count.max(1),
        }
    }

    pub fn lane_width(&self) -> f32 {
        self.road_width / self.lane_count as f32
    }

    /// Lateral offset of a lane's center from the road axis.
    pub fn center(&self, lane: LaneIndex) -> f32 {
        -self.road_width / 2.0 + (lane as f32 + 0.5) * self.lane_width()
    }

    /// Lateral offset of the marking between `lane` and `lane + 1`.
    pub fn boundary(&self, lane: LaneIndex) -> f32 {
        -self.road_width / 2.0 + (lane as f32 + 1.0) * self.lane_width()
    }

    pub fn contains(&self, lane: LaneIndex) -> bool {
        lane < self.lane_count
    }

    /// Lane whose band contains the lateral offset, clamped to the road.
    pub fn lane_at(&self, lateral: f32) -> LaneIndex {
        let raw = ((lateral + self.road_width / 2.0) / self.lane_width()).floor();
        (raw.max(0.0) as usize).min(self.lane_count - 1)
    }
}

impl Default for LaneGeometry {
    fn default() -> Self {
        Self::new(16.0, 4)
    }
}
