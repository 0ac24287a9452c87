//! Free-camera visibility metrics.
//!
//! Counts vehicles that come into view while the user drives the camera,
//! as a rolling per-second rate plus a lifetime total.

use bevy::prelude::*;

use crate::simulation::vehicles::Vehicle;

#[derive(Resource, Debug, Clone)]
pub struct VisibilityConfig {
    /// Window length in seconds.
    pub window: f32,
    /// Below this much window time the rate is left unchanged.
    pub min_window_time: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            window: 1.0,
            min_window_time: 1e-4,
        }
    }
}

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct VisibilityMetrics {
    window_count: u32,
    window_time: f32,
    rate: f32,
    total_seen: u64,
    /// True while sampling in Free mode; false makes the next sample a
    /// baseline.
    sampling: bool,
}

impl VisibilityMetrics {
    /// Newly seen vehicles per second over the last completed window.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn total_seen(&self) -> u64 {
        self.total_seen
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling
    }

    /// Take one sample. `in_view` decides whether a vehicle is inside the
    /// camera's view volume.
    pub fn sample(
        &mut self,
        dt: f32,
        free_camera: bool,
        vehicles: &mut [Vehicle],
        in_view: impl Fn(&Vehicle) -> bool,
        config: &VisibilityConfig,
    ) {
        if !free_camera {
            if self.sampling {
                self.sampling = false;
                self.reset_window();
                self.rate = 0.0;
                for vehicle in vehicles.iter_mut() {
                    vehicle.in_general_view = false;
                }
            }
            return;
        }

        let baseline = !self.sampling;
        if baseline {
            self.sampling = true;
            self.reset_window();
        }

        for vehicle in vehicles.iter_mut() {
            let visible = in_view(&*vehicle);
            if visible && !vehicle.in_general_view && !baseline {
                self.window_count += 1;
                self.total_seen += 1;
            }
            vehicle.in_general_view = visible;
        }

        if baseline {
            return;
        }

        self.window_time += dt.max(0.0);
        if self.window_time >= config.window {
            if self.window_time > config.min_window_time {
                self.rate = self.window_count as f32 / self.window_time;
            }
            self.reset_window();
        }
    }

    fn reset_window(&mut self) {
        self.window_count = 0;
        self.window_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::SceneLayout;

    const DT: f32 = 1.0 / 60.0;

    fn fleet(count: usize) -> Vec<Vehicle> {
        let layout = SceneLayout::default();
        (0..count)
            .map(|i| Vehicle::new(&layout, i % 4, i as f32 * 8.0, 0.25))
            .collect()
    }

    fn visible_before(limit: f32) -> impl Fn(&Vehicle) -> bool {
        move |vehicle: &Vehicle| vehicle.position.x < limit
    }

    #[test]
    fn first_sample_is_a_baseline() {
        let mut metrics = VisibilityMetrics::default();
        let config = VisibilityConfig::default();
        let mut vehicles = fleet(5);

        metrics.sample(DT, true, &mut vehicles, |_| true, &config);

        assert_eq!(metrics.total_seen(), 0);
        assert!(vehicles.iter().all(|v| v.in_general_view));
    }

    #[test]
    fn newly_visible_vehicles_count_once() {
        let mut metrics = VisibilityMetrics::default();
        let config = VisibilityConfig::default();
        let mut vehicles = fleet(5);

        metrics.sample(DT, true, &mut vehicles, visible_before(10.0), &config);
        metrics.sample(DT, true, &mut vehicles, visible_before(20.0), &config);
        metrics.sample(DT, true, &mut vehicles, visible_before(20.0), &config);

        // x = 0 and 8 were in the baseline; only x = 16 is new.
        assert_eq!(metrics.total_seen(), 1);
    }

    #[test]
    fn rate_is_reported_per_completed_window() {
        let mut metrics = VisibilityMetrics::default();
        let config = VisibilityConfig::default();
        let mut vehicles = fleet(4);

        metrics.sample(DT, true, &mut vehicles, |_| false, &config);
        metrics.sample(DT, true, &mut vehicles, |_| true, &config);
        assert_eq!(metrics.rate(), 0.0);

        for _ in 0..70 {
            metrics.sample(DT, true, &mut vehicles, |_| true, &config);
        }
        assert_eq!(metrics.total_seen(), 4);
        assert!(metrics.rate() > 3.0 && metrics.rate() <= 4.0, "rate {}", metrics.rate());
    }

    #[test]
    fn leaving_free_clears_view_flags() {
        let mut metrics = VisibilityMetrics::default();
        let config = VisibilityConfig::default();
        let mut vehicles = fleet(3);

        metrics.sample(DT, true, &mut vehicles, |_| true, &config);
        metrics.sample(DT, false, &mut vehicles, |_| true, &config);

        assert!(!metrics.is_sampling());
        assert!(vehicles.iter().all(|v| !v.in_general_view));

        // Re-entry is another baseline: no spike from the whole fleet.
        metrics.sample(DT, true, &mut vehicles, |_| true, &config);
        assert_eq!(metrics.total_seen(), 0);
    }

    #[test]
    fn zero_time_frames_never_divide() {
        let mut metrics = VisibilityMetrics::default();
        let config = VisibilityConfig::default();
        let mut vehicles = fleet(2);

        metrics.sample(0.0, true, &mut vehicles, |_| false, &config);
        for _ in 0..10 {
            metrics.sample(0.0, true, &mut vehicles, |_| true, &config);
        }
        assert_eq!(metrics.rate(), 0.0);
        assert!(metrics.rate().is_finite());
    }
}
