//! Sprite helpers shared by the games
//!
//! Everything is drawn around a center point so callers can translate/rotate
//! first. Colors come in as parameters; only accent details are fixed.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::color::Color;
use super::surface::{RenderSurface, TextAlign};
use crate::sim::ParticleSystem;

const TIRE: Color = Color::from_hex(0x1a1a1a);
const GLASS: Color = Color::rgba(135, 206, 235, 0.8);

/// Draw every live particle, fading with life
pub fn particles(surface: &mut dyn RenderSurface, particles: &ParticleSystem) {
    for p in particles.iter() {
        surface.fill_circle(
            p.pos,
            p.size,
            Color::from_hex(p.color).with_alpha(p.life.clamp(0.0, 1.0)),
        );
    }
}

/// Top-down tractor, cab toward -y
pub fn tractor(surface: &mut dyn RenderSurface, center: Vec2, size: Vec2, rotation: f32, body: Color) {
    surface.save();
    surface.translate(center);
    surface.rotate(rotation);

    let half = size * 0.5;
    // Rear wheels
    let wheel = Vec2::new(size.x * 0.25, size.y * 0.35);
    surface.fill_rect(Vec2::new(-half.x - 4.0, half.y - wheel.y), wheel, TIRE);
    surface.fill_rect(Vec2::new(half.x + 4.0 - wheel.x, half.y - wheel.y), wheel, TIRE);
    // Front wheels
    let front = Vec2::new(size.x * 0.18, size.y * 0.2);
    surface.fill_rect(Vec2::new(-half.x - 2.0, -half.y + 4.0), front, TIRE);
    surface.fill_rect(Vec2::new(half.x + 2.0 - front.x, -half.y + 4.0), front, TIRE);
    // Body and cab
    surface.fill_rect(Vec2::new(-half.x * 0.7, -half.y), Vec2::new(size.x * 0.7, size.y), body);
    surface.fill_rect(Vec2::new(-half.x * 0.55, 0.0), Vec2::new(size.x * 0.55, size.y * 0.35), GLASS);

    surface.restore();
}

/// Quad-rotor drone; `spin` animates the rotors
pub fn drone(surface: &mut dyn RenderSurface, center: Vec2, size: f32, tilt: f32, spin: f32, body: Color) {
    surface.save();
    surface.translate(center);
    surface.rotate(tilt);

    let arm = size * 0.45;
    let dirs = [Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)];
    for d in dirs {
        let tip = d.normalize() * arm;
        surface.stroke_polyline(&[Vec2::ZERO, tip], 4.0, Color::from_hex(0x333333), false);
        let blur = 0.35 + 0.15 * (spin * 3.0).sin();
        surface.fill_circle(tip, size * 0.2, Color::rgba(200, 200, 200, blur));
    }
    surface.fill_circle(Vec2::ZERO, size * 0.22, body);
    surface.fill_circle(Vec2::new(0.0, -size * 0.08), size * 0.07, Color::from_hex(0x00e5ff));

    surface.restore();
}

/// Spiky weed / pest blob
pub fn weed(surface: &mut dyn RenderSurface, center: Vec2, radius: f32, rotation: f32, light: Color, dark: Color) {
    let points: Vec<Vec2> = (0..16)
        .map(|i| {
            let a = rotation + i as f32 * TAU / 16.0;
            let r = if i % 2 == 0 { radius } else { radius * 0.6 };
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect();
    surface.fill_polygon(&points, dark);
    surface.fill_circle(center, radius * 0.45, light);
}

/// Round tree crown seen from above
pub fn tree(surface: &mut dyn RenderSurface, center: Vec2, radius: f32) {
    surface.fill_circle(center + Vec2::new(4.0, 6.0), radius, Color::rgba(0, 0, 0, 0.25));
    surface.fill_circle(center, radius, Color::from_hex(0x1B5E20));
    surface.fill_circle(center - Vec2::splat(radius * 0.3), radius * 0.45, Color::from_hex(0x2E7D32));
}

/// Power pole with cross arm
pub fn pole(surface: &mut dyn RenderSurface, center: Vec2, size: f32) {
    surface.fill_circle(center, size * 0.5, Color::from_hex(0x795548));
    surface.fill_rect(center - Vec2::new(size, 3.0), Vec2::new(size * 2.0, 6.0), Color::from_hex(0x5D4037));
}

/// Red warning badge with an exclamation mark
pub fn alert_badge(surface: &mut dyn RenderSurface, center: Vec2, radius: f32, pulse: f32) {
    let r = radius * (1.0 + 0.15 * pulse.sin());
    surface.fill_circle(center, r, Color::from_hex(0xE74C3C));
    surface.text("!", center, r * 1.4, TextAlign::Center, Color::WHITE);
}

/// Horizontal fill bar; `fraction` is clamped to 0..1
pub fn bar(surface: &mut dyn RenderSurface, corner: Vec2, size: Vec2, fraction: f32, fill: Color) {
    surface.fill_rect(corner, size, Color::rgba(0, 0, 0, 0.5));
    surface.fill_rect(corner, Vec2::new(size.x * fraction.clamp(0.0, 1.0), size.y), fill);
    surface.stroke_rect(corner, size, 1.0, Color::rgba(255, 255, 255, 0.6));
}

/// Scrolling field rows; `offset` is the distance travelled
pub fn field_rows(surface: &mut dyn RenderSurface, offset: f32, spacing: f32, base: Color, stripe: Color) {
    use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
    surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), base);
    let spacing = spacing.max(1.0);
    let mut y = offset.rem_euclid(spacing) - spacing;
    while y < LOGICAL_HEIGHT {
        surface.fill_rect(Vec2::new(0.0, y), Vec2::new(LOGICAL_WIDTH, spacing * 0.5), stripe);
        y += spacing;
    }
}

/// Circular gauge needle from `-3π/4` (0) to `3π/4` (1)
pub fn gauge(surface: &mut dyn RenderSurface, center: Vec2, radius: f32, value: f32, danger: bool) {
    surface.fill_circle(center, radius, Color::rgba(0, 0, 0, 0.6));
    surface.stroke_circle(center, radius, 2.0, Color::WHITE);
    let angle = -PI * 0.75 + value.clamp(0.0, 1.0) * PI * 1.5 - PI / 2.0;
    let tip = center + Vec2::new(angle.cos(), angle.sin()) * radius * 0.85;
    let color = if danger { Color::from_hex(0xE74C3C) } else { Color::from_hex(0xFFC107) };
    surface.stroke_polyline(&[center, tip], 3.0, color, false);
}
