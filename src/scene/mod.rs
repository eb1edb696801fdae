//! Top-down highway scene.
//!
//! Rendering is split in two: [`render_scene`] turns a telemetry frame and a
//! [`SceneConfig`] into a flat list of [`DrawCommand`]s in canvas pixel
//! coordinates, and the UI layer paints that list with egui. Keeping the
//! first half free of any painter makes the layout testable on its own.

pub mod vehicle;

use egui::{Color32, Pos2, Rect, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::telemetry::{Lane, TelemetrySnapshot};

pub use vehicle::{VehicleKind, obstacle_shapes, vehicle_shapes};

pub(crate) const ROAD_GRAY: Color32 = Color32::from_rgb(128, 128, 128);
pub(crate) const TRUNK_BROWN: Color32 = Color32::from_rgb(165, 42, 42);
pub(crate) const LEAF_GREEN: Color32 = Color32::from_rgb(0, 128, 0);

const CENTERLINE_WIDTH: f32 = 2.;
const CENTERLINE_DASH: f32 = 20.;
const CENTERLINE_GAP: f32 = 15.;
/// Smallest tree spacing that still draws trees
pub const MIN_TREE_SPACING: f32 = 1.;
const MAX_TREE_COLUMNS: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole canvas.
    Clear,
    Rect {
        rect: Rect,
        fill: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
    },
    Triangle {
        points: [Pos2; 3],
        fill: Color32,
    },
    DashedLine {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
        dash: f32,
        gap: f32,
    },
}

/// Background traffic placed with the same mapping as the ego vehicle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorativeVehicle {
    pub offset: [f64; 2],
    pub road: Lane,
    pub kind: VehicleKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f32,
    pub height: f32,
    /// Distance from the canvas middle to each road's centerline
    pub road_gap: f32,
    pub road_height: f32,
    pub pixels_per_unit: f32,
    /// Closest the ego vehicle gets to the left and right canvas edges
    pub edge_margin: f32,
    /// How far the ego vehicle may be drawn above or below its road centerline
    pub lane_drift: f32,
    pub tree_start: f32,
    /// Trees are left out below [`MIN_TREE_SPACING`]
    pub tree_spacing: f32,
    /// Distance of each tree row from its road centerline
    pub tree_offset: f32,
    pub traffic: Vec<DecorativeVehicle>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800.,
            height: 400.,
            road_gap: 60.,
            road_height: 100.,
            pixels_per_unit: 10.,
            edge_margin: 15.,
            lane_drift: 40.,
            tree_start: 30.,
            tree_spacing: 100.,
            tree_offset: 60.,
            traffic: vec![
                DecorativeVehicle {
                    offset: [1., 0.],
                    road: Lane::Upper,
                    kind: VehicleKind::Lorry,
                },
                DecorativeVehicle {
                    offset: [-2., 0.],
                    road: Lane::Upper,
                    kind: VehicleKind::Bike,
                },
                DecorativeVehicle {
                    offset: [3., 0.],
                    road: Lane::Lower,
                    kind: VehicleKind::Lorry,
                },
                DecorativeVehicle {
                    offset: [-1., 0.],
                    road: Lane::Lower,
                    kind: VehicleKind::Bike,
                },
            ],
        }
    }
}

impl SceneConfig {
    /// Vertical pixel position of a road's centerline.
    pub fn road_y(&self, road: Lane) -> f32 {
        match road {
            Lane::Upper => self.height / 2. - self.road_gap,
            Lane::Lower => self.height / 2. + self.road_gap,
        }
    }

    /// Maps simulation coordinates onto the canvas, origin at the horizontal
    /// middle of the given road.
    pub fn to_canvas(&self, position: [f64; 2], road: Lane) -> Pos2 {
        pos2(
            self.width / 2. + position[0] as f32 * self.pixels_per_unit,
            self.road_y(road) - position[1] as f32 * self.pixels_per_unit,
        )
    }

    /// Like [`Self::to_canvas`] but kept within the drawable band of the road.
    pub fn to_canvas_clamped(&self, position: [f64; 2], road: Lane) -> Pos2 {
        let p = self.to_canvas(position, road);
        let road_y = self.road_y(road);
        // min/max instead of clamp, a canvas narrower than two margins must not panic
        pos2(
            p.x.max(self.edge_margin).min(self.width - self.edge_margin),
            p.y.max(road_y - self.lane_drift).min(road_y + self.lane_drift),
        )
    }
}

/// What the renderer needs from a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneFrame {
    pub position: [f64; 2],
    pub obstacle: bool,
    pub lane: Lane,
}

impl From<&TelemetrySnapshot> for SceneFrame {
    fn from(value: &TelemetrySnapshot) -> Self {
        Self {
            position: value.position,
            obstacle: value.obstacle_detected,
            lane: value.lane,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub ego: Pos2,
    pub obstacle: Option<Pos2>,
    /// Set when the frame reports an obstacle and the alert tone should sound.
    pub alert: bool,
}

fn road_shapes(config: &SceneConfig, road_y: f32) -> [DrawCommand; 2] {
    [
        DrawCommand::Rect {
            rect: Rect::from_min_size(
                pos2(0., road_y - config.road_height / 2.),
                vec2(config.width, config.road_height),
            ),
            fill: ROAD_GRAY,
        },
        DrawCommand::DashedLine {
            from: pos2(0., road_y),
            to: pos2(config.width, road_y),
            width: CENTERLINE_WIDTH,
            color: Color32::WHITE,
            dash: CENTERLINE_DASH,
            gap: CENTERLINE_GAP,
        },
    ]
}

fn tree_shapes(x: f32, y: f32) -> [DrawCommand; 2] {
    [
        DrawCommand::Rect {
            rect: Rect::from_min_size(pos2(x - 5., y), vec2(10., 20.)),
            fill: TRUNK_BROWN,
        },
        DrawCommand::Triangle {
            points: [pos2(x, y - 30.), pos2(x - 20., y), pos2(x + 20., y)],
            fill: LEAF_GREEN,
        },
    ]
}

/// X positions of the tree columns, from `tree_start` up to the canvas width.
///
/// Spacing below [`MIN_TREE_SPACING`] turns trees off, and the column count is
/// capped so a hand-edited config cannot stall the frame.
fn tree_columns(config: &SceneConfig) -> impl Iterator<Item = f32> {
    let spacing = config.tree_spacing;
    let start = config.tree_start;
    let columns = ((config.width - start) / spacing).ceil();
    let count = if spacing >= MIN_TREE_SPACING && columns.is_finite() && columns > 0. {
        columns.min(MAX_TREE_COLUMNS as f32) as usize
    } else {
        0
    };
    (0..count).map(move |i| start + i as f32 * spacing)
}

pub fn render_scene(config: &SceneConfig, frame: &SceneFrame) -> Scene {
    let mut commands = vec![DrawCommand::Clear];

    let roads = [config.road_y(Lane::Upper), config.road_y(Lane::Lower)];
    for road_y in roads {
        commands.extend(road_shapes(config, road_y));
    }

    for x in tree_columns(config) {
        for road_y in roads {
            commands.extend(tree_shapes(x, road_y - config.tree_offset));
            commands.extend(tree_shapes(x, road_y + config.tree_offset));
        }
    }

    for vehicle in &config.traffic {
        let center = config.to_canvas_clamped(vehicle.offset, vehicle.road);
        commands.extend(vehicle_shapes(center, vehicle.kind));
    }

    let ego = config.to_canvas_clamped(frame.position, frame.lane);
    commands.extend(vehicle_shapes(ego, VehicleKind::Car));

    let obstacle = frame.obstacle.then(|| {
        let center = config.to_canvas(frame.position, frame.lane.opposite());
        commands.extend(obstacle_shapes(center));
        center
    });

    Scene {
        commands,
        ego,
        obstacle,
        alert: frame.obstacle,
    }
}

#[cfg(test)]
mod tests {
    use super::vehicle::{CAR_BLUE, OBSTACLE_RED};
    use super::*;
    use proptest::prelude::*;

    fn frame(position: [f64; 2], obstacle: bool, lane: Lane) -> SceneFrame {
        SceneFrame {
            position,
            obstacle,
            lane,
        }
    }

    fn has_fill(scene: &Scene, color: Color32) -> bool {
        scene
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Rect { fill, .. } if *fill == color))
    }

    #[test]
    fn test_default_roads_straddle_canvas_middle() {
        let config = SceneConfig::default();
        assert_eq!(config.road_y(Lane::Upper), 140.);
        assert_eq!(config.road_y(Lane::Lower), 260.);
    }

    #[test]
    fn test_draw_order_roads_first_ego_last() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([0., 0.], false, Lane::Upper));

        assert_eq!(scene.commands[0], DrawCommand::Clear);
        assert!(matches!(scene.commands[1], DrawCommand::Rect { fill, .. } if fill == ROAD_GRAY));
        assert!(matches!(scene.commands[2], DrawCommand::DashedLine { .. }));
        assert!(matches!(scene.commands[3], DrawCommand::Rect { fill, .. } if fill == ROAD_GRAY));
        assert!(matches!(scene.commands[4], DrawCommand::DashedLine { .. }));

        // ego car is the last five shapes: body and four wheels
        let ego_body = &scene.commands[scene.commands.len() - 5];
        assert!(matches!(ego_body, DrawCommand::Rect { fill, .. } if *fill == CAR_BLUE));
    }

    #[test]
    fn test_tree_rows() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([0., 0.], false, Lane::Upper));
        let trunks = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { fill, .. } if *fill == TRUNK_BROWN))
            .count();
        // x = 30, 130, ..., 730 and four rows
        assert_eq!(trunks, 8 * 4);
    }

    fn trunk_count(scene: &Scene) -> usize {
        scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { fill, .. } if *fill == TRUNK_BROWN))
            .count()
    }

    #[test]
    fn test_tiny_tree_spacing_disables_trees() {
        for tree_spacing in [1e-7, 0.5, 0., -100., f32::NAN] {
            let config = SceneConfig {
                tree_spacing,
                ..SceneConfig::default()
            };
            let scene = render_scene(&config, &frame([0., 0.], false, Lane::Upper));
            assert_eq!(trunk_count(&scene), 0, "spacing {}", tree_spacing);
        }
    }

    #[test]
    fn test_far_tree_start_is_bounded() {
        let config = SceneConfig {
            tree_start: -1e30,
            tree_spacing: MIN_TREE_SPACING,
            ..SceneConfig::default()
        };
        let scene = render_scene(&config, &frame([0., 0.], false, Lane::Upper));
        assert_eq!(trunk_count(&scene), 4 * MAX_TREE_COLUMNS);
    }

    #[test]
    fn test_origin_maps_to_canvas_middle_of_lane() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([0., 0.], false, Lane::Lower));
        assert_eq!(scene.ego, pos2(400., 260.));
    }

    #[test]
    fn test_scale_is_ten_pixels_per_unit() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([12.5, 1.], false, Lane::Upper));
        assert_eq!(scene.ego, pos2(525., 130.));
    }

    #[test]
    fn test_ego_clamped_to_canvas_edges() {
        let config = SceneConfig::default();
        let far_right = render_scene(&config, &frame([500., 0.], false, Lane::Upper));
        assert_eq!(far_right.ego.x, 785.);
        let far_left = render_scene(&config, &frame([-500., 0.], false, Lane::Upper));
        assert_eq!(far_left.ego.x, 15.);
        let drifted = render_scene(&config, &frame([0., -20.], false, Lane::Upper));
        assert_eq!(drifted.ego.y, 180.);
    }

    #[test]
    fn test_no_obstacle_no_alert() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([3., 0.], false, Lane::Upper));
        assert!(scene.obstacle.is_none());
        assert!(!scene.alert);
        assert!(!has_fill(&scene, OBSTACLE_RED));
    }

    #[test]
    fn test_obstacle_drawn_on_other_road() {
        let config = SceneConfig::default();

        let scene = render_scene(&config, &frame([3., 0.], true, Lane::Upper));
        assert!(scene.alert);
        assert!(has_fill(&scene, OBSTACLE_RED));
        assert_eq!(scene.obstacle, Some(pos2(430., config.road_y(Lane::Lower))));

        let scene = render_scene(&config, &frame([3., 0.], true, Lane::Lower));
        assert_eq!(scene.obstacle, Some(pos2(430., config.road_y(Lane::Upper))));
    }

    #[test]
    fn test_obstacle_is_not_clamped() {
        let config = SceneConfig::default();
        let scene = render_scene(&config, &frame([100., 0.], true, Lane::Upper));
        assert_eq!(scene.ego.x, 785.);
        assert_eq!(scene.obstacle.unwrap().x, 1400.);
    }

    #[test]
    fn test_custom_traffic_layout() {
        let config = SceneConfig {
            traffic: vec![DecorativeVehicle {
                offset: [0., 0.],
                road: Lane::Lower,
                kind: VehicleKind::Car,
            }],
            tree_spacing: 0.,
            ..SceneConfig::default()
        };
        let scene = render_scene(&config, &frame([0., 0.], false, Lane::Upper));
        let blue_bodies = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { fill, .. } if *fill == CAR_BLUE))
            .count();
        assert_eq!(blue_bodies, 2);
    }

    #[test]
    fn test_scene_config_partial_json_uses_defaults() {
        let config: SceneConfig = serde_json::from_str(r#"{"width": 1000}"#).unwrap();
        assert_eq!(config.width, 1000.);
        assert_eq!(config.pixels_per_unit, 10.);
        assert_eq!(config.traffic.len(), 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_ego_stays_within_clamp(
            x in -1.0e4f64..1.0e4f64,
            y in -1.0e4f64..1.0e4f64,
            upper in any::<bool>(),
        ) {
            let config = SceneConfig::default();
            let lane = if upper { Lane::Upper } else { Lane::Lower };
            let scene = render_scene(&config, &frame([x, y], false, lane));
            let road_y = config.road_y(lane);
            prop_assert!(scene.ego.x >= 15. && scene.ego.x <= config.width - 15.);
            prop_assert!(scene.ego.y >= road_y - 40. && scene.ego.y <= road_y + 40.);
        }
    }
}
