//! The drawing seam between games and the host surface

use glam::Vec2;

use super::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Immediate-mode 2D surface in logical coordinates.
///
/// Implementations keep no drawing state between frames beyond what
/// `save`/`restore` scope.
pub trait RenderSurface {
    fn clear(&mut self, color: Color);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: f32);
    fn set_alpha(&mut self, alpha: f32);

    /// Axis-aligned rectangle from its top-left corner
    fn fill_rect(&mut self, corner: Vec2, size: Vec2, color: Color);
    fn stroke_rect(&mut self, corner: Vec2, size: Vec2, width: f32, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, closed: bool);

    /// `size` is the font size in logical pixels; text is bold sans-serif
    fn text(&mut self, text: &str, pos: Vec2, size: f32, align: TextAlign, color: Color);

    /// Blit a named image; returns false if the image is not available
    fn image(&mut self, key: &str, corner: Vec2, size: Vec2) -> bool;
}
