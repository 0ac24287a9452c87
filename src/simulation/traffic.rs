//! Per-frame traffic stepping around the roadworks.
//!
//! Each step partitions vehicles by lane, shapes their speed (hazard slow
//! zone, following distance, merge queue, forced merge), eases them
//! laterally toward their target lane and advances them along the road.
//! The step reports the frame's risk score, whether the hazard signal is
//! active, and any vehicle that crossed the hazard entry.

use std::ops::Range;

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::simulation::merge::{compute_merge_lock, has_safe_gap_for_lane_change};
use crate::simulation::vehicles::{Vehicle, VehicleId, VehicleRegistry};
use crate::world::SceneLayout;

/// Tuning for the traffic step. Speeds and easing rates are expressed per
/// reference frame and scaled by elapsed time.
#[derive(Resource, Debug, Clone)]
pub struct TrafficConfig {
    /// Range the cruise speed is sampled from at spawn.
    pub speed_base_range: Range<f32>,
    /// Reference frames per second; converts speeds and rates to real time.
    pub reference_fps: f32,
    /// Speed factor while crossing the detection mat in the closed lane.
    pub hazard_slow_factor: f32,
    /// Below this distance to the vehicle ahead the vehicle nearly halts.
    pub near_distance: f32,
    pub near_factor: f32,
    /// Below this distance to the vehicle ahead the vehicle slows down.
    pub follow_distance: f32,
    pub follow_factor: f32,
    /// A vehicle never advances closer than this to the one ahead.
    pub min_spacing: f32,
    /// Forced merge starts this far past the mat start.
    pub forced_merge_offset: f32,
    /// Queued vehicles wait this far past the mat start.
    pub queue_hold_offset: f32,
    /// Length of the damping zone before the queue line.
    pub queue_zone: f32,
    pub queue_factor: f32,
    /// Vehicles without a safe gap never pass this far past the mat start.
    pub hard_stop_offset: f32,
    pub brake_factor: f32,
    /// Speed factor while merging out of the closed lane.
    pub merge_factor: f32,
    /// Clearance required behind the vehicle in the target lane.
    pub rear_gap: f32,
    /// Clearance required ahead of the vehicle in the target lane.
    pub front_gap: f32,
    /// Fraction of lateral error removed per reference frame.
    pub lateral_tracking: f32,
    /// Same, while a forced merge is in progress.
    pub lateral_merging: f32,
    /// Yaw per unit of lateral error.
    pub yaw_gain: f32,
    /// Lateral error under which the lane change is considered done.
    pub settle_threshold: f32,
    /// Distance from the merge lane center that counts as arrived.
    pub arrival_epsilon: f32,
    /// Distance past the road end before a vehicle is recycled.
    pub recycle_margin: f32,
    pub recycle_jitter: f32,
    /// Risk is scored for closed-lane vehicles within this x window around
    /// the risk center.
    pub risk_window: (f32, f32),
    /// Risk center measured back from the buffer zone start.
    pub risk_center_offset: f32,
    /// Risk points lost per unit of distance from the risk center.
    pub risk_slope: f32,
    pub spawn_spacing: f32,
    pub spawn_jitter: f32,
    pub seed: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            speed_base_range: 0.22..0.30,
            reference_fps: 60.0,
            hazard_slow_factor: 0.45,
            near_distance: 3.0,
            near_factor: 0.10,
            follow_distance: 6.0,
            follow_factor: 0.55,
            min_spacing: 2.2,
            forced_merge_offset: 2.5,
            queue_hold_offset: 2.0,
            queue_zone: 4.0,
            queue_factor: 0.25,
            hard_stop_offset: 6.0,
            brake_factor: 0.2,
            merge_factor: 0.7,
            rear_gap: 4.5,
            front_gap: 6.5,
            lateral_tracking: 0.06,
            lateral_merging: 0.10,
            yaw_gain: 0.08,
            settle_threshold: 0.02,
            arrival_epsilon: 0.05,
            recycle_margin: 40.0,
            recycle_jitter: 8.0,
            risk_window: (-10.0, 18.0),
            risk_center_offset: 2.0,
            risk_slope: 7.0,
            spawn_spacing: 6.0,
            spawn_jitter: 2.0,
            seed: 99999,
        }
    }
}

impl TrafficConfig {
    pub fn forced_merge_line(&self, layout: &SceneLayout) -> f32 {
        layout.mat_start + self.forced_merge_offset
    }

    pub fn queue_hold_line(&self, layout: &SceneLayout) -> f32 {
        layout.mat_start + self.queue_hold_offset
    }

    pub fn hard_stop_line(&self, layout: &SceneLayout) -> f32 {
        layout.mat_start + self.hard_stop_offset
    }

    pub fn risk_center(&self, layout: &SceneLayout) -> f32 {
        layout.buffer_start() - self.risk_center_offset
    }
}

/// Outcome of one traffic step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Highest risk over closed-lane vehicles near the buffer zone, 0..=100.
    pub risk: u8,
    /// Some vehicle was slowed by the detection mat this frame.
    pub hazard_active: bool,
    /// Closed-lane vehicles that crossed the hazard entry this frame.
    pub crossings: SmallVec<[VehicleId; 2]>,
    /// Merge lock holder used for this frame.
    pub merge_lock: Option<VehicleId>,
    /// Vehicles sent back behind the road start.
    pub recycled: usize,
}

/// Risk bands shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Ok,
    Warning,
    Alert,
}

impl RiskLevel {
    pub fn from_percent(risk: u8) -> Self {
        match risk {
            r if r < 35 => Self::Ok,
            r if r < 70 => Self::Warning,
            _ => Self::Alert,
        }
    }

    pub fn status_text(self) -> &'static str {
        match self {
            Self::Ok => "OK - monitoring active",
            Self::Warning => "CAUTION - workers alerted",
            Self::Alert => "WORKER ALERT - high risk",
        }
    }
}

/// Advance every vehicle by one frame.
///
/// `speed_multiplier` scales simulated time on top of `dt`. Merge lock,
/// following distances and gap checks all read the state at the start of
/// the frame.
pub fn step_traffic(
    registry: &mut VehicleRegistry,
    layout: &SceneLayout,
    config: &TrafficConfig,
    dt: f32,
    speed_multiplier: f32,
) -> StepReport {
    let frames = (dt * config.reference_fps * speed_multiplier).max(0.0);
    let snapshot = registry.as_slice().to_vec();
    let merge_lock = compute_merge_lock(&snapshot, layout, config);

    let lane_count = layout.lanes.lane_count;
    let mut by_lane: Vec<SmallVec<[VehicleId; 16]>> = vec![SmallVec::new(); lane_count];
    // Vehicles changing lane, or still laterally inside another lane's band,
    // also count as leaders for that lane.
    let mut intruders: Vec<SmallVec<[VehicleId; 4]>> = vec![SmallVec::new(); lane_count];
    for (id, vehicle) in snapshot.iter().enumerate() {
        let lane = vehicle.lane.min(lane_count - 1);
        by_lane[lane].push(id);

        let band = layout.lanes.lane_at(vehicle.position.y);
        if vehicle.is_changing_lane() && vehicle.lane_target < lane_count {
            intruders[vehicle.lane_target].push(id);
        }
        if band != lane && band != vehicle.lane_target {
            intruders[band].push(id);
        }
    }
    for ids in &mut by_lane {
        ids.sort_by(|a, b| snapshot[*a].position.x.total_cmp(&snapshot[*b].position.x));
    }

    let (hazard_start, hazard_end) = layout.hazard_span();
    let hazard_entry = layout.hazard_entry();
    let forced_merge_line = config.forced_merge_line(layout);
    let queue_line = config.queue_hold_line(layout);
    let hard_stop = config.hard_stop_line(layout);
    let merge_lane = layout.merge_lane();
    let risk_center = config.risk_center(layout);
    let recycle_at = layout.road_end() + config.recycle_margin;

    let mut report = StepReport {
        merge_lock,
        ..default()
    };
    let mut max_risk = 0.0_f32;
    let mut to_recycle: SmallVec<[VehicleId; 4]> = SmallVec::new();

    for (lane, ids) in by_lane.iter().enumerate() {
        let in_work_lane = lane == layout.work_lane;

        for (order, &id) in ids.iter().enumerate() {
            let current = &snapshot[id];
            let x = current.position.x;
            let next_in_lane = ids.get(order + 1).copied();
            let ahead_x = leader_x(&snapshot, id, next_in_lane, &intruders[lane]);

            let mut speed = current.speed_base;
            let mut stop_line: Option<f32> = None;
            let mut lane_target = current.lane;
            let mut merging = false;

            if in_work_lane && x >= hazard_start && x <= hazard_end {
                speed *= config.hazard_slow_factor;
                report.hazard_active = true;
            }

            if let Some(ahead_x) = ahead_x {
                let distance = ahead_x - x;
                if distance < config.near_distance {
                    speed *= config.near_factor;
                } else if distance < config.follow_distance {
                    speed *= config.follow_factor;
                }
            }

            let queued = in_work_lane && merge_lock.is_some_and(|holder| holder != id);
            let held_in_queue = queued && x >= queue_line;
            if held_in_queue {
                speed = 0.0;
            } else if queued {
                if x >= queue_line - config.queue_zone {
                    speed *= config.queue_factor;
                }
                stop_line = Some(queue_line);
            }

            if in_work_lane && !held_in_queue && x > forced_merge_line && merge_lane != lane {
                if has_safe_gap_for_lane_change(&snapshot, id, merge_lane, layout, config) {
                    lane_target = merge_lane;
                    speed *= config.merge_factor;
                    merging = true;
                } else if x >= hard_stop {
                    speed = 0.0;
                } else {
                    speed *= config.brake_factor;
                    stop_line = Some(stop_line.map_or(hard_stop, |line| line.min(hard_stop)));
                }
            }

            // Lateral easing toward the target lane center.
            let target_y = layout.lanes.center(lane_target);
            let error = target_y - current.position.y;
            let rate = if merging {
                config.lateral_merging
            } else {
                config.lateral_tracking
            };
            let blend = (1.0 - (1.0 - rate).powf(frames)).clamp(0.0, 1.0);
            let y = current.position.y + error * blend;

            let mut settled_lane = current.lane;
            let mut heading_skew = -error * config.yaw_gain;
            if error.abs() < config.settle_threshold {
                settled_lane = lane_target;
                heading_skew = 0.0;
            }

            // Longitudinal advance with soft clamps.
            let mut next_x = x + speed * frames;
            if let Some(line) = stop_line {
                if x < line && next_x > line {
                    next_x = line;
                }
            }
            if let Some(ahead_x) = ahead_x {
                let limit = ahead_x - config.min_spacing;
                if next_x > limit {
                    next_x = limit.max(x);
                }
            }

            if in_work_lane && x < hazard_entry && next_x >= hazard_entry {
                report.crossings.push(id);
            }

            if in_work_lane {
                let dx = next_x - risk_center;
                if dx > config.risk_window.0 && dx < config.risk_window.1 {
                    let risk = (100.0 - (dx.abs() * config.risk_slope).floor()).max(0.0);
                    max_risk = max_risk.max(risk);
                }
            }

            if next_x > recycle_at {
                to_recycle.push(id);
            }

            let vehicle = &mut registry.as_mut_slice()[id];
            vehicle.position = Vec2::new(next_x, y);
            vehicle.speed = speed;
            vehicle.lane = settled_lane;
            vehicle.lane_target = lane_target;
            vehicle.heading_skew = heading_skew;
        }
    }

    report.recycled = to_recycle.len();
    for id in to_recycle {
        registry.recycle(id, layout, config);
    }

    report.risk = max_risk.clamp(0.0, 100.0) as u8;
    report
}

/// Closest vehicle ahead of `id` among its lane successor and the lane's
/// intruders. Equal positions are ordered by id.
fn leader_x(
    snapshot: &[Vehicle],
    id: VehicleId,
    next_in_lane: Option<VehicleId>,
    intruders: &[VehicleId],
) -> Option<f32> {
    let x = snapshot[id].position.x;
    next_in_lane
        .into_iter()
        .chain(intruders.iter().copied())
        .filter(|&other| {
            let other_x = snapshot[other].position.x;
            other != id && (other_x > x || (other_x == x && other > id))
        })
        .map(|other| snapshot[other].position.x)
        .min_by(f32::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (SceneLayout, TrafficConfig, VehicleRegistry) {
        (
            SceneLayout::default(),
            TrafficConfig::default(),
            VehicleRegistry::with_seed(3),
        )
    }

    fn vehicle(registry: &VehicleRegistry, id: VehicleId) -> Vehicle {
        registry.get(id).cloned().expect("vehicle exists")
    }

    #[test]
    fn lone_vehicle_past_merge_line_reaches_next_lane() {
        let (layout, config, mut registry) = setup();
        let id = registry.insert(Vehicle::new(&layout, 0, -2.0, 0.25));

        let target = layout.lanes.center(1);
        let mut converged_at = None;
        for frame in 0..240 {
            step_traffic(&mut registry, &layout, &config, DT, 1.0);
            let v = vehicle(&registry, id);
            if v.lane == 1 && (v.position.y - target).abs() < 0.01 {
                converged_at = Some(frame);
                break;
            }
        }

        assert!(converged_at.is_some(), "vehicle never settled in lane 1");
        let v = vehicle(&registry, id);
        assert_eq!(v.lane_target, 1);
        assert_eq!(v.heading_skew, 0.0);
    }

    #[test]
    fn lateral_error_never_grows_while_target_is_fixed() {
        let (layout, config, mut registry) = setup();
        let id = registry.insert(Vehicle::new(&layout, 0, -2.0, 0.25));

        step_traffic(&mut registry, &layout, &config, DT, 1.0);
        let mut target = vehicle(&registry, id).lane_target;
        let mut last_error = f32::MAX;
        for _ in 0..120 {
            let v = vehicle(&registry, id);
            if v.lane_target != target {
                target = v.lane_target;
                last_error = f32::MAX;
            }
            let error = (v.position.y - layout.lanes.center(target)).abs();
            assert!(error <= last_error);
            last_error = error;
            step_traffic(&mut registry, &layout, &config, DT, 1.0);
        }
    }

    #[test]
    fn rear_vehicle_within_near_distance_crawls() {
        let (layout, config, mut registry) = setup();
        let front = registry.insert(Vehicle::new(&layout, 0, -40.0, 0.28));
        let rear = registry.insert(Vehicle::new(&layout, 0, -42.5, 0.24));

        step_traffic(&mut registry, &layout, &config, DT, 1.0);

        assert!((vehicle(&registry, rear).speed - 0.24 * config.near_factor).abs() < 1e-6);
        assert!((vehicle(&registry, front).speed - 0.28).abs() < 1e-6);
    }

    #[test]
    fn vehicle_at_follow_distance_halves_speed() {
        let (layout, config, mut registry) = setup();
        registry.insert(Vehicle::new(&layout, 2, 10.0, 0.25));
        let rear = registry.insert(Vehicle::new(&layout, 2, 5.0, 0.25));

        step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert!((vehicle(&registry, rear).speed - 0.25 * config.follow_factor).abs() < 1e-6);
    }

    #[test]
    fn blocked_merge_brakes_and_stops_at_hard_stop() {
        let (layout, config, mut registry) = setup();
        let blocked = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.25));
        registry.insert(Vehicle::new(&layout, 1, 0.5, 0.25));

        step_traffic(&mut registry, &layout, &config, DT, 1.0);
        let v = vehicle(&registry, blocked);
        assert_eq!(v.lane_target, 0);
        let expected = 0.25 * config.hazard_slow_factor * config.brake_factor;
        assert!((v.speed - expected).abs() < 1e-6);

        // A long frame cannot carry it past the hard-stop line.
        let (layout, config, mut registry) = setup();
        let blocked = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.25));
        registry.insert(Vehicle::new(&layout, 1, 0.5, 0.25));
        step_traffic(&mut registry, &layout, &config, 5.0, 1.0);
        assert_eq!(vehicle(&registry, blocked).position.x, config.hard_stop_line(&layout));
    }

    #[test]
    fn unsafe_gap_never_sets_merge_target() {
        let (layout, config, mut registry) = setup();
        let blocked = registry.insert(Vehicle::new(&layout, 0, 2.0, 0.25));
        registry.insert(Vehicle::new(&layout, 1, 3.0, 0.25));

        assert!(!has_safe_gap_for_lane_change(
            registry.as_slice(),
            blocked,
            1,
            &layout,
            &config
        ));
        step_traffic(&mut registry, &layout, &config, DT, 1.0);
        let v = vehicle(&registry, blocked);
        assert_eq!(v.lane_target, 0);
        assert_eq!(v.speed, 0.0);
        assert_eq!(v.position.x, 2.0);
    }

    #[test]
    fn second_closed_lane_vehicle_queues_behind_lock_holder() {
        let (layout, config, mut registry) = setup();
        let holder = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.25));
        let queued = registry.insert(Vehicle::new(&layout, 0, -3.2, 0.25));
        registry.insert(Vehicle::new(&layout, 1, 0.5, 0.25));

        let report = step_traffic(&mut registry, &layout, &config, 5.0, 1.0);
        assert_eq!(report.merge_lock, Some(holder));
        assert_eq!(vehicle(&registry, queued).position.x, config.queue_hold_line(&layout));
        assert_eq!(vehicle(&registry, holder).position.x, config.hard_stop_line(&layout));

        // The blocker has driven off; the holder merges, the queue holds.
        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert_eq!(report.merge_lock, Some(holder));
        assert_eq!(vehicle(&registry, holder).lane_target, 1);
        let q = vehicle(&registry, queued);
        assert_eq!(q.speed, 0.0);
        assert_eq!(q.position.x, config.queue_hold_line(&layout));
        assert_eq!(q.lane_target, 0);
    }

    #[test]
    fn vehicle_already_past_queue_line_freezes_in_place() {
        let (layout, config, mut registry) = setup();
        let holder = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.25));
        let queued = registry.insert(Vehicle::new(&layout, 0, -2.0, 0.25));
        assert!(-2.0 > config.queue_hold_line(&layout));

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert_eq!(report.merge_lock, Some(holder));
        let q = vehicle(&registry, queued);
        assert_eq!(q.speed, 0.0);
        assert_eq!(q.position.x, -2.0);
        assert_eq!(q.lane_target, 0);
    }

    #[test]
    fn merging_vehicle_backs_off_when_gap_closes_behind() {
        let (layout, config, mut registry) = setup();
        let mut merging = Vehicle::new(&layout, 0, 0.0, 0.25);
        merging.lane_target = 1;
        merging.position.y += 1.0;
        let merger = registry.insert(merging);
        let closing = registry.insert(Vehicle::new(&layout, 1, -3.0, 0.30));

        step_traffic(&mut registry, &layout, &config, DT, 1.0);

        let m = vehicle(&registry, merger);
        assert_eq!(m.lane_target, 0);
        let expected = 0.25 * config.hazard_slow_factor * config.brake_factor;
        assert!((m.speed - expected).abs() < 1e-6);
        // The car behind already treats the merger as its leader.
        let c = vehicle(&registry, closing);
        assert!((c.speed - 0.30 * config.follow_factor).abs() < 1e-6);
    }

    #[test]
    fn faster_car_in_merge_lane_never_overlaps_merger() {
        const BODY_LENGTH: f32 = 2.0;
        const BODY_WIDTH: f32 = 0.9;

        let (layout, config, mut registry) = setup();
        let merger = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.22));
        let fast = registry.insert(Vehicle::new(&layout, 1, -4.6, 0.30));

        for frame in 0..120 {
            let before = vehicle(&registry, merger);
            let safe =
                has_safe_gap_for_lane_change(registry.as_slice(), merger, 1, &layout, &config);
            step_traffic(&mut registry, &layout, &config, DT, 1.0);

            let m = vehicle(&registry, merger);
            let f = vehicle(&registry, fast);
            if before.lane == 0 && !safe {
                assert_eq!(m.lane_target, 0, "merged into an unsafe gap at frame {frame}");
            }
            let overlapping = (m.position.x - f.position.x).abs() < BODY_LENGTH
                && (m.position.y - f.position.y).abs() < BODY_WIDTH;
            assert!(!overlapping, "bodies overlap at frame {frame}: {m:?} / {f:?}");
        }

        // Once the fast car is clear ahead, the merge goes through.
        assert_eq!(vehicle(&registry, merger).lane_target, 1);
    }

    #[test]
    fn queue_releases_once_holder_has_merged() {
        let (layout, config, mut registry) = setup();
        let holder = registry.insert(Vehicle::new(&layout, 0, 0.0, 0.25));
        let queued = registry.insert(Vehicle::new(&layout, 0, -3.0, 0.25));

        let mut released = false;
        for _ in 0..400 {
            let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
            if report.merge_lock == Some(queued) {
                released = true;
                break;
            }
        }
        assert!(released);
        assert_eq!(vehicle(&registry, holder).lane, 1);
    }

    #[test]
    fn risk_peaks_near_buffer_entrance() {
        let (layout, config, mut registry) = setup();
        let center = config.risk_center(&layout);
        registry.insert(Vehicle::new(&layout, 0, center, 0.25));

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert!(report.risk >= 95 && report.risk <= 100, "risk {}", report.risk);
        assert_eq!(RiskLevel::from_percent(report.risk), RiskLevel::Alert);
    }

    #[test]
    fn risk_is_zero_outside_window_or_lane() {
        let (layout, config, mut registry) = setup();
        let center = config.risk_center(&layout);
        registry.insert(Vehicle::new(&layout, 2, center, 0.25));
        registry.insert(Vehicle::new(&layout, 0, center + 40.0, 0.25));

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert_eq!(report.risk, 0);
        assert!(!report.hazard_active);
    }

    #[test]
    fn hazard_flag_tracks_mat_occupancy() {
        let (layout, config, mut registry) = setup();
        registry.insert(Vehicle::new(&layout, 0, layout.mat_start + 0.1, 0.25));
        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert!(report.hazard_active);
    }

    #[test]
    fn crossing_the_entry_in_closed_lane_is_reported() {
        let (layout, config, mut registry) = setup();
        let entry = layout.hazard_entry();
        let crossing = registry.insert(Vehicle::new(&layout, 0, entry - 0.01, 0.25));
        registry.insert(Vehicle::new(&layout, 1, entry - 0.01, 0.25));

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert_eq!(report.crossings.as_slice(), &[crossing]);

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert!(report.crossings.is_empty());
    }

    #[test]
    fn vehicles_past_road_end_are_recycled() {
        let (layout, config, mut registry) = setup();
        let far = layout.road_end() + config.recycle_margin - 0.01;
        let id = registry.insert(Vehicle::new(&layout, 2, far, 0.25));

        let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
        assert_eq!(report.recycled, 1);
        assert!(vehicle(&registry, id).position.x < layout.road_start());
    }

    #[test]
    fn zero_dt_moves_nothing() {
        let (layout, config, mut registry) = setup();
        registry.insert(Vehicle::new(&layout, 3, 20.0, 0.25));
        let before = registry.as_slice().to_vec();
        step_traffic(&mut registry, &layout, &config, 0.0, 1.0);
        assert_eq!(registry.as_slice()[0].position, before[0].position);
    }

    #[test]
    fn dense_traffic_keeps_invariants() {
        let (layout, config, mut registry) = setup();
        registry.resize(40, &layout, &config);

        for _ in 0..1500 {
            let report = step_traffic(&mut registry, &layout, &config, DT, 1.0);
            assert!(report.risk <= 100);
            for (_, v) in registry.iter() {
                assert!(layout.lanes.contains(v.lane));
                assert!(v.lane_target == v.lane || v.lane_target == v.lane + 1);
                assert!(v.position.y.is_finite());
            }
        }
    }

    #[test]
    fn risk_bands() {
        assert_eq!(RiskLevel::from_percent(0), RiskLevel::Ok);
        assert_eq!(RiskLevel::from_percent(34), RiskLevel::Ok);
        assert_eq!(RiskLevel::from_percent(35), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_percent(69), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_percent(70), RiskLevel::Alert);
    }
}
