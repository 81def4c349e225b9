//! Headless surface that records draw calls

use glam::Vec2;

use super::color::Color;
use super::surface::{RenderSurface, TextAlign};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(f32),
    Alpha(f32),
    FillRect { corner: Vec2, size: Vec2, color: Color },
    StrokeRect { corner: Vec2, size: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, color: Color },
    Polygon { points: usize, color: Color },
    Polyline { points: usize, closed: bool, color: Color },
    Text { text: String, pos: Vec2 },
    Image { key: String },
}

#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    /// Image keys that report as loaded
    images: Vec<String>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(images: &[&str]) -> Self {
        Self {
            commands: Vec::new(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `Clear` calls; one per rendered frame
    pub fn frames(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear(_)))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// save/restore pairs are balanced
    pub fn is_balanced(&self) -> bool {
        let mut depth: i32 = 0;
        for c in &self.commands {
            match c {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }
}

impl RenderSurface for CommandRecorder {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn fill_rect(&mut self, corner: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect { corner, size, color });
    }

    fn stroke_rect(&mut self, corner: Vec2, size: Vec2, _width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeRect { corner, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, _width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle { center, radius, color });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.len(),
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], _width: f32, color: Color, closed: bool) {
        self.commands.push(DrawCommand::Polyline {
            points: points.len(),
            closed,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, _size: f32, _align: TextAlign, _color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn image(&mut self, key: &str, _corner: Vec2, _size: Vec2) -> bool {
        self.commands.push(DrawCommand::Image { key: key.to_string() });
        self.images.iter().any(|k| k == key)
    }
}
