use egui::{Color32, Painter, Rect, Shape, Stroke};

use lanewatch::scene::{DrawCommand, Scene};

pub(crate) mod live;

/// What `DrawCommand::Clear` paints.
pub(crate) const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(236, 240, 226);

/// Paints a rendered scene into `canvas`, whose top-left corner is the
/// scene's pixel origin. Nothing is drawn outside `canvas`.
pub(crate) fn paint_scene(painter: &Painter, canvas: Rect, scene: &Scene) {
    let painter = painter.with_clip_rect(canvas);
    let offset = canvas.min.to_vec2();
    for command in &scene.commands {
        match *command {
            DrawCommand::Clear => {
                painter.rect_filled(canvas, 0., CANVAS_BACKGROUND);
            }
            DrawCommand::Rect { rect, fill } => {
                painter.rect_filled(rect.translate(offset), 0., fill);
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
            } => {
                painter.circle_filled(center + offset, radius, fill);
            }
            DrawCommand::Triangle { points, fill } => {
                painter.add(Shape::convex_polygon(
                    points.map(|p| p + offset).to_vec(),
                    fill,
                    Stroke::NONE,
                ));
            }
            DrawCommand::DashedLine {
                from,
                to,
                width,
                color,
                dash,
                gap,
            } => {
                painter.extend(Shape::dashed_line(
                    &[from + offset, to + offset],
                    Stroke::new(width, color),
                    dash,
                    gap,
                ));
            }
        }
    }
}

/// Linear blend between two colours, `y` in `0..=1`.
pub(crate) fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let channel = |a: u8, b: u8| (a as f32 + y * (b as f32 - a as f32)).clamp(0., 255.) as u8;
    Color32::from_rgb(
        channel(start.r(), end.r()),
        channel(start.g(), end.g()),
        channel(start.b(), end.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_shade_endpoints() {
        assert_eq!(stroke_shade(Color32::BLACK, Color32::WHITE, 0.), Color32::BLACK);
        assert_eq!(stroke_shade(Color32::BLACK, Color32::WHITE, 1.), Color32::WHITE);
        assert_eq!(
            stroke_shade(Color32::BLACK, Color32::WHITE, 2.),
            Color32::WHITE
        );
    }
}
