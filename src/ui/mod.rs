//! Heads-up display: risk readout, traffic status, camera mode and the
//! free-camera visibility counters.

use bevy::prelude::*;

use crate::camera::director::CameraDirector;
use crate::camera::visibility::VisibilityMetrics;
use crate::game_state::{FrameSet, SimulationControl};
use crate::simulation::traffic::RiskLevel;
use crate::simulation::{TrafficDensity, TrafficReport};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(Update, update_hud.in_set(FrameSet::Present));
    }
}

/// Which value a HUD text entity shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudField {
    Risk,
    Pill,
    Traffic,
    Vehicles,
    Camera,
    Sim,
    Signal,
    Seen,
}

/// Everything the HUD displays, gathered once per frame.
#[derive(Debug, Clone, PartialEq)]
struct HudSnapshot {
    risk: u8,
    desired_vehicles: usize,
    vehicles: usize,
    camera: String,
    free_camera: bool,
    sim: &'static str,
    signal_active: bool,
    seen_rate: f32,
    seen_total: u64,
}

impl HudSnapshot {
    fn text(&self, field: HudField) -> String {
        match field {
            HudField::Risk => format!("{}%", self.risk),
            HudField::Pill => RiskLevel::from_percent(self.risk).status_text().to_string(),
            HudField::Traffic => format!("Traffic: {}", self.desired_vehicles),
            HudField::Vehicles => format!("Vehicles: {}", self.vehicles),
            HudField::Camera => format!("Camera: {}", self.camera),
            HudField::Sim => format!("Sim: {}", self.sim),
            HudField::Signal => format!(
                "Signal: {}",
                if self.signal_active { "Alert" } else { "Standby" }
            ),
            HudField::Seen => {
                if self.free_camera {
                    format!("Seen: {:.1}/s ({} total)", self.seen_rate, self.seen_total)
                } else {
                    "Seen: --".to_string()
                }
            }
        }
    }

    fn color(&self, field: HudField) -> Color {
        match field {
            HudField::Risk | HudField::Pill => risk_color(RiskLevel::from_percent(self.risk)),
            HudField::Signal if self.signal_active => ALERT_COLOR,
            _ => TEXT_COLOR,
        }
    }
}

// Colors
const PANEL_BG: Color = Color::srgba(0.03, 0.04, 0.05, 0.88);
const BORDER_COLOR: Color = Color::srgb(0.18, 0.66, 1.0);
const TEXT_COLOR: Color = Color::srgb(0.85, 0.9, 0.95);
const MUTED_TEXT: Color = Color::srgb(0.6, 0.66, 0.72);
const OK_COLOR: Color = Color::srgb(0.35, 0.9, 0.5);
const WARN_COLOR: Color = Color::srgb(1.0, 0.75, 0.2);
const ALERT_COLOR: Color = Color::srgb(1.0, 0.3, 0.25);

fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Ok => OK_COLOR,
        RiskLevel::Warning => WARN_COLOR,
        RiskLevel::Alert => ALERT_COLOR,
    }
}

fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                row_gap: Val::Px(6.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER_COLOR),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("WORKER RISK"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(MUTED_TEXT),
            ));

            for (field, font_size) in [
                (HudField::Risk, 36.0),
                (HudField::Pill, 16.0),
                (HudField::Traffic, 15.0),
                (HudField::Vehicles, 15.0),
                (HudField::Camera, 15.0),
                (HudField::Sim, 15.0),
                (HudField::Signal, 15.0),
                (HudField::Seen, 15.0),
            ] {
                parent.spawn((
                    Text::new(""),
                    TextFont {
                        font_size,
                        ..default()
                    },
                    TextColor(TEXT_COLOR),
                    field,
                ));
            }
        });

    // Bottom control reminder
    commands.spawn((
        Text::new(
            "Space: Pause | 1-4: Speed | +/-: Traffic | F: Follow | T: Top | R: Reset | \
             Drag: Orbit/Pan | Scroll: Zoom",
        ),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(MUTED_TEXT),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn update_hud(
    report: Res<TrafficReport>,
    density: Res<TrafficDensity>,
    control: Res<SimulationControl>,
    director: Res<CameraDirector>,
    metrics: Res<VisibilityMetrics>,
    mut fields: Query<(&HudField, &mut Text, &mut TextColor)>,
) {
    let snapshot = HudSnapshot {
        risk: report.risk.min(100),
        desired_vehicles: density.desired,
        vehicles: report.vehicle_count,
        camera: director.label(),
        free_camera: director.is_free(),
        sim: control.label(),
        signal_active: report.hazard_active,
        seen_rate: metrics.rate(),
        seen_total: metrics.total_seen(),
    };

    for (field, mut text, mut color) in &mut fields {
        let value = snapshot.text(*field);
        if text.0 != value {
            text.0 = value;
        }
        let wanted = snapshot.color(*field);
        if color.0 != wanted {
            color.0 = wanted;
        }
    }
}
