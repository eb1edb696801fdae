use egui::{Color32, Pos2, Rect, pos2, vec2};
use serde::{Deserialize, Serialize};

use super::DrawCommand;

pub(crate) const CAR_BLUE: Color32 = Color32::from_rgb(0, 0, 255);
pub(crate) const LORRY_ORANGE: Color32 = Color32::from_rgb(255, 165, 0);
pub(crate) const BIKE_PURPLE: Color32 = Color32::from_rgb(128, 0, 128);
pub(crate) const UNKNOWN_GRAY: Color32 = Color32::from_rgb(128, 128, 128);
pub(crate) const OBSTACLE_RED: Color32 = Color32::from_rgb(255, 0, 0);
pub(crate) const WHEEL_BLACK: Color32 = Color32::from_rgb(0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Car,
    Lorry,
    Bike,
    #[serde(other)]
    Other,
}

fn rect_at(center: Pos2, dx: f32, dy: f32, w: f32, h: f32) -> Rect {
    Rect::from_min_size(pos2(center.x + dx, center.y + dy), vec2(w, h))
}

fn boxed_body(center: Pos2, fill: Color32) -> DrawCommand {
    DrawCommand::Rect {
        rect: rect_at(center, -15., -10., 30., 20.),
        fill,
    }
}

/// Four small wheels at the corners of a 30x20 body.
fn car_wheels(center: Pos2) -> [DrawCommand; 4] {
    [(-12., -12.), (4., -12.), (-12., 8.), (4., 8.)].map(|(dx, dy)| DrawCommand::Rect {
        rect: rect_at(center, dx, dy, 8., 4.),
        fill: WHEEL_BLACK,
    })
}

fn lorry_wheels(center: Pos2) -> [DrawCommand; 4] {
    [(-18., -14.), (8., -14.), (-18., 8.), (8., 8.)].map(|(dx, dy)| DrawCommand::Rect {
        rect: rect_at(center, dx, dy, 10., 6.),
        fill: WHEEL_BLACK,
    })
}

/// Body then wheels for a vehicle of the given kind centred on `center`.
pub fn vehicle_shapes(center: Pos2, kind: VehicleKind) -> Vec<DrawCommand> {
    let mut shapes = Vec::with_capacity(5);
    match kind {
        VehicleKind::Car => {
            shapes.push(boxed_body(center, CAR_BLUE));
            shapes.extend(car_wheels(center));
        }
        VehicleKind::Lorry => {
            shapes.push(DrawCommand::Rect {
                rect: rect_at(center, -20., -12., 40., 24.),
                fill: LORRY_ORANGE,
            });
            shapes.extend(lorry_wheels(center));
        }
        VehicleKind::Bike => {
            shapes.push(DrawCommand::Circle {
                center,
                radius: 10.,
                fill: BIKE_PURPLE,
            });
            for dx in [-7., 7.] {
                shapes.push(DrawCommand::Circle {
                    center: pos2(center.x + dx, center.y + 10.),
                    radius: 4.,
                    fill: WHEEL_BLACK,
                });
            }
        }
        VehicleKind::Other => {
            shapes.push(boxed_body(center, UNKNOWN_GRAY));
            shapes.extend(car_wheels(center));
        }
    }
    shapes
}

pub fn obstacle_shapes(center: Pos2) -> Vec<DrawCommand> {
    let mut shapes = vec![boxed_body(center, OBSTACLE_RED)];
    shapes.extend(car_wheels(center));
    shapes
}
