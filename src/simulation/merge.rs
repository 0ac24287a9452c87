//! Merge coordination for the closed lane.
//!
//! Only one vehicle at a time may occupy the closed lane or the corridor
//! into the next lane past the hazard entry. Everything here is a pure
//! function of a vehicle snapshot, so running it twice on the same input
//! gives the same answer.

use crate::simulation::traffic::TrafficConfig;
use crate::simulation::vehicles::{Vehicle, VehicleId};
use crate::world::lanes::LaneIndex;
use crate::world::SceneLayout;

/// The furthest vehicle past the hazard entry that is still in the closed
/// lane or its merge corridor. Ties keep the first vehicle found.
pub fn compute_merge_lock(
    vehicles: &[Vehicle],
    layout: &SceneLayout,
    config: &TrafficConfig,
) -> Option<VehicleId> {
    let mut holder: Option<(VehicleId, f32)> = None;

    for (id, vehicle) in vehicles.iter().enumerate() {
        if !is_lock_candidate(vehicle, layout, config) {
            continue;
        }
        match holder {
            Some((_, best_x)) if vehicle.position.x <= best_x => {}
            _ => holder = Some((id, vehicle.position.x)),
        }
    }

    holder.map(|(id, _)| id)
}

/// Whether `vehicle` could move into `target_lane` without cutting in front
/// of or behind another vehicle already there.
///
/// Unsafe when any occupant of the target lane sits strictly inside
/// `(-rear_gap, +front_gap)` of the vehicle along the road.
pub fn has_safe_gap_for_lane_change(
    vehicles: &[Vehicle],
    vehicle: VehicleId,
    target_lane: LaneIndex,
    layout: &SceneLayout,
    config: &TrafficConfig,
) -> bool {
    let Some(me) = vehicles.get(vehicle) else {
        return false;
    };
    if !layout.lanes.contains(target_lane) {
        return false;
    }

    vehicles
        .iter()
        .enumerate()
        .filter(|(id, other)| *id != vehicle && occupies_lane(other, target_lane, layout))
        .all(|(_, other)| {
            let offset = other.position.x - me.position.x;
            !(offset > -config.rear_gap && offset < config.front_gap)
        })
}

fn is_lock_candidate(vehicle: &Vehicle, layout: &SceneLayout, config: &TrafficConfig) -> bool {
    if vehicle.position.x <= layout.hazard_entry() {
        return false;
    }
    vehicle.lane == layout.work_lane
        || vehicle.lane_target == layout.work_lane
        || in_merge_corridor(vehicle.position.y, layout, config.arrival_epsilon)
}

/// Lateral band between the closed lane's center and the merge lane's
/// center, minus the point of arrival at the merge lane.
fn in_merge_corridor(lateral: f32, layout: &SceneLayout, arrival_epsilon: f32) -> bool {
    let from = layout.work_lane_center();
    let to = layout.lanes.center(layout.merge_lane());
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };

    lateral >= lo && lateral <= hi && (lateral - to).abs() > arrival_epsilon
}

fn occupies_lane(vehicle: &Vehicle, lane: LaneIndex, layout: &SceneLayout) -> bool {
    vehicle.lane == lane
        || vehicle.lane_target == lane
        || layout.lanes.lane_at(vehicle.position.y) == lane
}
