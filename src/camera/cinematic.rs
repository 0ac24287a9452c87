//! Scripted camera takeover played when a vehicle reaches the hazard.
//!
//! A sequence eases from the camera's pose at trigger time through three
//! shots (the vehicle, the signal emitter, the worker's helmet), holds on
//! the last one and eases back to the default pose.

use bevy::prelude::*;

use crate::world::{CameraPose, SceneLayout};

/// Segment durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CinematicTimings {
    pub approach: f32,
    pub to_signal: f32,
    pub to_worker: f32,
    pub hold: f32,
    pub release: f32,
}

impl Default for CinematicTimings {
    fn default() -> Self {
        Self {
            approach: 1.0,
            to_signal: 1.0,
            to_worker: 1.0,
            hold: 0.9,
            release: 1.0,
        }
    }
}

impl CinematicTimings {
    pub fn duration(&self, segment: CinematicSegment) -> f32 {
        let seconds = match segment {
            CinematicSegment::Approach => self.approach,
            CinematicSegment::ToSignal => self.to_signal,
            CinematicSegment::ToWorker => self.to_worker,
            CinematicSegment::Hold => self.hold,
            CinematicSegment::Release => self.release,
        };
        seconds.max(0.0)
    }

    pub fn total(&self) -> f32 {
        CinematicSegment::ALL
            .iter()
            .map(|segment| self.duration(*segment))
            .sum()
    }
}

/// Shot placement relative to scene landmarks, in road space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CinematicFraming {
    /// Camera offset from the vehicle's x on the closed lane center.
    pub vehicle_eye: Vec3,
    /// Look-at offset from the vehicle's x on the closed lane center.
    pub vehicle_look: Vec3,
    /// Camera offset from the signal truck on the closed lane center.
    pub signal_eye: Vec3,
    /// Camera offset from the worker's helmet.
    pub worker_eye: Vec3,
}

impl Default for CinematicFraming {
    fn default() -> Self {
        Self {
            vehicle_eye: Vec3::new(-3.2, -2.0, 1.55),
            vehicle_look: Vec3::new(1.8, 0.0, 0.42),
            signal_eye: Vec3::new(-2.9, -2.05, 1.9),
            worker_eye: Vec3::new(-1.25, -1.0, 0.55),
        }
    }
}

impl CinematicFraming {
    /// The three shots for a vehicle at road-space x `vehicle_x`.
    pub fn shots(&self, vehicle_x: f32, layout: &SceneLayout) -> [CameraPose; 3] {
        let lane_axis = Vec3::new(vehicle_x, layout.work_lane_center(), 0.0);
        let truck = Vec3::new(layout.truck_x(), layout.work_lane_center(), 0.0);
        let helmet = layout.worker_helmet;

        [
            CameraPose::new(
                layout.to_world(lane_axis + self.vehicle_eye),
                layout.to_world(lane_axis + self.vehicle_look),
            ),
            CameraPose::new(
                layout.to_world(truck + self.signal_eye),
                layout.to_world(layout.signal_origin),
            ),
            CameraPose::new(
                layout.to_world(helmet + self.worker_eye),
                layout.to_world(helmet),
            ),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CinematicSegment {
    /// Start pose to the vehicle shot.
    Approach,
    /// Vehicle shot to the signal shot.
    ToSignal,
    /// Signal shot to the worker shot.
    ToWorker,
    /// Still on the worker shot.
    Hold,
    /// Worker shot back to the default pose.
    Release,
}

impl CinematicSegment {
    pub const ALL: [Self; 5] = [
        Self::Approach,
        Self::ToSignal,
        Self::ToWorker,
        Self::Hold,
        Self::Release,
    ];

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Approach => Some(Self::ToSignal),
            Self::ToSignal => Some(Self::ToWorker),
            Self::ToWorker => Some(Self::Hold),
            Self::Hold => Some(Self::Release),
            Self::Release => None,
        }
    }

    /// Shot number shown on the HUD, 1 to 3.
    pub fn shot(self) -> u8 {
        match self {
            Self::Approach => 1,
            Self::ToSignal => 2,
            Self::ToWorker | Self::Hold | Self::Release => 3,
        }
    }
}

/// Result of advancing a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CinematicFrame {
    Playing(CameraPose),
    /// The sequence is over; the pose is the exact default pose.
    Finished(CameraPose),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CinematicSequence {
    start: CameraPose,
    shots: [CameraPose; 3],
    finish: CameraPose,
    timings: CinematicTimings,
    segment: CinematicSegment,
    elapsed_in_segment: f32,
}

impl CinematicSequence {
    pub fn new(
        start: CameraPose,
        shots: [CameraPose; 3],
        finish: CameraPose,
        timings: CinematicTimings,
    ) -> Self {
        Self {
            start,
            shots,
            finish,
            timings,
            segment: CinematicSegment::Approach,
            elapsed_in_segment: 0.0,
        }
    }

    pub fn segment(&self) -> CinematicSegment {
        self.segment
    }

    pub fn elapsed_in_segment(&self) -> f32 {
        self.elapsed_in_segment
    }

    pub fn shots(&self) -> &[CameraPose; 3] {
        &self.shots
    }

    /// Move the playhead forward by `dt` seconds, crossing as many segment
    /// boundaries as needed.
    pub fn advance(&mut self, dt: f32) -> CinematicFrame {
        self.elapsed_in_segment += dt.max(0.0);

        loop {
            let duration = self.timings.duration(self.segment);
            if self.elapsed_in_segment < duration {
                return CinematicFrame::Playing(self.pose());
            }
            match self.segment.next() {
                Some(next) => {
                    self.elapsed_in_segment -= duration;
                    self.segment = next;
                }
                None => return CinematicFrame::Finished(self.finish),
            }
        }
    }

    /// Camera pose at the current playhead.
    pub fn pose(&self) -> CameraPose {
        let duration = self.timings.duration(self.segment);
        let progress = if duration > 0.0 {
            self.elapsed_in_segment / duration
        } else {
            1.0
        };
        let t = ease_in_out_cubic(progress);
        let [vehicle, signal, worker] = self.shots;

        match self.segment {
            CinematicSegment::Approach => self.start.lerp(vehicle, t),
            CinematicSegment::ToSignal => vehicle.lerp(signal, t),
            CinematicSegment::ToWorker => signal.lerp(worker, t),
            CinematicSegment::Hold => worker,
            CinematicSegment::Release => worker.lerp(self.finish, t),
        }
    }
}

/// Symmetric cubic ease-in-out; input is clamped to `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> CinematicSequence {
        let layout = SceneLayout::default();
        let shots = CinematicFraming::default().shots(-4.9, &layout);
        CinematicSequence::new(
            CameraPose::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO),
            shots,
            layout.default_camera,
            CinematicTimings::default(),
        )
    }

    #[test]
    fn easing_is_symmetric_and_clamped() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
        let a = ease_in_out_cubic(0.2);
        let b = ease_in_out_cubic(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn segments_play_in_order() {
        let mut seq = sequence();
        let timings = CinematicTimings::default();
        let mut seen = vec![seq.segment()];
        let dt = 0.05;
        let mut elapsed = 0.0;

        loop {
            elapsed += dt;
            match seq.advance(dt) {
                CinematicFrame::Playing(_) => {
                    if seen.last() != Some(&seq.segment()) {
                        seen.push(seq.segment());
                    }
                }
                CinematicFrame::Finished(_) => break,
            }
            assert!(elapsed < timings.total() + 1.0, "sequence never finished");
        }
        assert_eq!(seen, CinematicSegment::ALL.to_vec());
    }

    #[test]
    fn hold_stays_on_worker_shot() {
        let mut seq = sequence();
        let timings = CinematicTimings::default();
        let into_hold = timings.approach + timings.to_signal + timings.to_worker + 0.1;

        let CinematicFrame::Playing(pose) = seq.advance(into_hold) else {
            panic!("sequence ended early");
        };
        assert_eq!(seq.segment(), CinematicSegment::Hold);
        assert_eq!(pose, seq.shots()[2]);
    }

    #[test]
    fn single_large_step_finishes_on_default_pose() {
        let mut seq = sequence();
        let layout = SceneLayout::default();
        let frame = seq.advance(100.0);
        assert_eq!(frame, CinematicFrame::Finished(layout.default_camera));
        assert_eq!(seq.advance(0.016), CinematicFrame::Finished(layout.default_camera));
    }

    #[test]
    fn first_shot_frames_the_closed_lane() {
        let layout = SceneLayout::default();
        let [vehicle, signal, worker] = CinematicFraming::default().shots(-4.9, &layout);

        let lane_y = layout.work_lane_center();
        assert_eq!(
            vehicle.target,
            layout.to_world(Vec3::new(-4.9 + 1.8, lane_y, 0.42))
        );
        assert_eq!(signal.target, layout.to_world(layout.signal_origin));
        assert_eq!(worker.target, layout.to_world(layout.worker_helmet));
        assert!(vehicle.position.y < signal.position.y);
    }

    #[test]
    fn shot_numbers_cap_at_three() {
        assert_eq!(CinematicSegment::Approach.shot(), 1);
        assert_eq!(CinematicSegment::ToSignal.shot(), 2);
        assert_eq!(CinematicSegment::Hold.shot(), 3);
        assert_eq!(CinematicSegment::Release.shot(), 3);
    }
}
