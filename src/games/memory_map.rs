//! Memory Map: memorize a field boundary, then trace it from memory
//!
//! A polygon is shown during the countdown. While playing only faint vertex
//! guides remain and the player drags through the vertices in order. Letting
//! go validates the trace: success scores and moves to a bigger polygon, a
//! failure costs a life and replays the same one.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::GameId;
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH, TICK_MS};
use crate::renderer::{Color, Hud, RenderSurface};
use crate::sim::{Actor, Burst, Game, Gesture, InputMode, ParticleKind, Penalty, Phase, Setup, Shape, World};
use crate::zzfx;

const SND_CHECK: SoundParams = zzfx![1.1, _, 568, 0.02, 0.04, 0.11, 2, 2.3, -9.9, 0.1, _, _, _, 0.09, _, 0.1, _, 0.76, 0.06];
const SND_WIN: SoundParams = zzfx![1.3, _, 347, 0.04, 0.22, 0.32, 2, 1.9, -1.4, _, _, _, _, 0.06, 2.2, _, 0.2, 0.26, 0.26];
const SND_FAIL: SoundParams = zzfx![1.1, _, 160, 0.03, 0.28, 0.4, 3, 2.6, _, 0.3, _, _, _, _, 1.7, _, 0.2, 0.19, 0.59];

const CENTER: Vec2 = Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0);
/// Polygon radius, 35% of the short side
const RADIUS: f32 = LOGICAL_WIDTH * 0.35;
/// A vertex counts as touched strictly inside this distance
const HIT_RADIUS: f32 = 30.0;
/// Squared distance a drag must move before it extends the path
const MIN_SEGMENT_SQ: f32 = 25.0;
const MAX_VERTICES: usize = 8;
const RETRY_DELAY_MS: f64 = 1000.0;
const RETRY_PREVIEW_MS: f64 = 2000.0;
/// Fill animation (20 ticks at 0.05) plus a short hold
const SUCCESS_MS: f64 = 20.0 * TICK_MS + 800.0;
const CHECK_BURST: Burst = Burst::new(ParticleKind::Spark, 10, 0x00D4FF);
const NEON_BLUE: Color = Color::from_hex(0x00D4FF);
const NEON_ORANGE: Color = Color::from_hex(0xFF6700);

/// What a released trace must have done to count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionRule {
    /// Every vertex touched in order
    #[default]
    AllInOrder,
    /// Every vertex in order, then released back on the first vertex
    ClosedLoop,
}

/// A polygon corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex;

#[derive(Debug, Clone, Default)]
pub struct MemoryMap {
    rule: CompletionRule,
    path: Vec<Vec2>,
    drawing: bool,
    /// Index of the vertex to touch next
    next: usize,
    /// Success fill, 0..1
    fill: f32,
    /// Pending replay after a failed trace
    retry_ms: Option<f64>,
}

/// Preview length for `level`: 3 s shrinking to 1 s, whole seconds
pub fn preview_ms(level: u32) -> f64 {
    (3.0 - level as f64 * 0.15).max(1.0).ceil() * 1000.0
}

pub fn vertex_count(level: u32) -> usize {
    (3 + level.saturating_sub(1) as usize / 2).min(MAX_VERTICES)
}

impl MemoryMap {
    pub fn with_rule(rule: CompletionRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    fn clear_trace(&mut self) {
        self.path.clear();
        self.drawing = false;
        self.next = 0;
        self.fill = 0.0;
    }

    /// Fresh polygon for the world's current level
    fn generate(&mut self, world: &mut World<Vertex>) {
        let level = world.level;
        let n = vertex_count(level);
        world.entities.clear();
        for i in 0..n {
            // Irregular shapes from level 4 (angles) and level 6 (radii)
            let angle_noise = if level > 3 { (world.rng.random::<f32>() - 0.5) * 0.5 } else { 0.0 };
            let radius_noise = if level > 5 { (world.rng.random::<f32>() - 0.5) * 0.3 } else { 0.0 };
            let angle = i as f32 * TAU / n as f32 - FRAC_PI_2 + angle_noise;
            let pos = CENTER + Vec2::new(angle.cos(), angle.sin()) * RADIUS * (1.0 + radius_noise);
            world.spawn_entity(Vertex, pos, Shape::circle(HIT_RADIUS));
        }
        self.clear_trace();
        log::info!("memory_map: level {level}, {n} vertices");
    }

    /// Same polygon, nothing touched
    fn reset_vertices(&mut self, world: &mut World<Vertex>) {
        let corners: Vec<Vec2> = world.entities.iter().map(|v| v.pos).collect();
        world.entities.clear();
        for pos in corners {
            world.spawn_entity(Vertex, pos, Shape::circle(HIT_RADIUS));
        }
        self.clear_trace();
    }

    fn touch(&mut self, world: &mut World<Vertex>, p: Vec2) {
        let Some(v) = world.entities.get_mut(self.next) else {
            return;
        };
        if !v.shape.contains(v.pos, p) || !v.resolve() {
            return;
        }
        v.scale = 1.5;
        let origin = v.pos;
        self.next += 1;
        world.emit(origin, CHECK_BURST);
        world.play(SND_CHECK);
    }

    fn complete(&self, world: &World<Vertex>, release: Vec2) -> bool {
        let all_hit = self.next == world.entities.len() && !world.entities.is_empty();
        match self.rule {
            CompletionRule::AllInOrder => all_hit,
            CompletionRule::ClosedLoop => {
                all_hit && world.entities[0].pos.distance_squared(release) < HIT_RADIUS * HIT_RADIUS
            }
        }
    }

    fn release(&mut self, world: &mut World<Vertex>, p: Vec2) {
        self.drawing = false;
        if self.complete(world, p) {
            world.credit(100 + 20 * world.level as u64);
            world.play(SND_WIN);
            world.lifecycle.begin_success(SUCCESS_MS);
            return;
        }

        world.penalize(Penalty::Life, 20.0, Some(SND_FAIL));
        if world.lives > 0 {
            self.retry_ms = Some(RETRY_DELAY_MS);
        }
    }
}

impl Game for MemoryMap {
    type Kind = Vertex;

    fn id(&self) -> GameId {
        GameId::MemoryMap
    }

    fn setup(&self) -> Setup {
        Setup::new(Actor::new(CENTER, Shape::circle(1.0)), InputMode::Trace).countdown(preview_ms(1))
    }

    fn on_start(&mut self, world: &mut World<Vertex>) {
        self.generate(world);
    }

    fn on_gesture(&mut self, world: &mut World<Vertex>, gesture: Gesture) {
        if self.retry_ms.is_some() {
            return;
        }
        match gesture {
            Gesture::Press(p) => {
                self.drawing = true;
                self.path = vec![p];
                self.touch(world, p);
            }
            Gesture::Drag(p) if self.drawing => {
                if self.path.last().is_some_and(|last| last.distance_squared(p) > MIN_SEGMENT_SQ) {
                    self.path.push(p);
                }
                self.touch(world, p);
            }
            Gesture::Release(p) if self.drawing => self.release(world, p),
            _ => {}
        }
    }

    fn step_entities(&mut self, world: &mut World<Vertex>) {
        for v in &mut world.entities {
            v.scale += (1.0 - v.scale) * 0.1;
        }

        if let Some(ms) = self.retry_ms.as_mut() {
            *ms -= TICK_MS;
            if *ms <= 1e-6 {
                self.retry_ms = None;
                self.reset_vertices(world);
                world.lifecycle.begin_countdown(RETRY_PREVIEW_MS);
            }
        }
    }

    fn step_success(&mut self, _world: &mut World<Vertex>) {
        self.fill = (self.fill + 0.05).min(1.0);
    }

    fn on_success_end(&mut self, world: &mut World<Vertex>) {
        world.level += 1;
        self.generate(world);
        world.lifecycle.begin_countdown(preview_ms(world.level));
    }

    fn hud(&self, world: &World<Vertex>) -> Hud {
        Hud::score(format!("{} · NÍVEL {}", world.score, world.level)).with_lives(world.lives)
    }

    fn render(&self, world: &World<Vertex>, surface: &mut dyn RenderSurface) {
        // Blueprint grid
        surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), Color::from_hex(0x0F172A));
        let grid = Color::rgba(56, 189, 248, 0.1);
        for i in 0..=(LOGICAL_WIDTH / 40.0) as u32 {
            let x = i as f32 * 40.0;
            surface.stroke_polyline(&[Vec2::new(x, 0.0), Vec2::new(x, LOGICAL_HEIGHT)], 1.0, grid, false);
        }
        for i in 0..=(LOGICAL_HEIGHT / 40.0) as u32 {
            let y = i as f32 * 40.0;
            surface.stroke_polyline(&[Vec2::new(0.0, y), Vec2::new(LOGICAL_WIDTH, y)], 1.0, grid, false);
        }

        let corners: Vec<Vec2> = world.entities.iter().map(|v| v.pos).collect();
        match world.phase() {
            Phase::Countdown | Phase::Success => {
                if world.phase() == Phase::Success {
                    surface.fill_polygon(&corners, Color::rgba(0, 255, 128, self.fill));
                }
                surface.stroke_polyline(&corners, 3.0, NEON_BLUE, true);
                for &c in &corners {
                    surface.fill_circle(c, 6.0, NEON_BLUE);
                }
            }
            Phase::Playing => {
                for (i, v) in world.entities.iter().enumerate() {
                    let color = if !v.is_active() {
                        Color::from_hex(0x00FF88)
                    } else if i == self.next {
                        Color::WHITE
                    } else {
                        Color::rgba(255, 255, 255, 0.2)
                    };
                    surface.fill_circle(v.pos, 8.0 * v.scale, color);
                    if i == self.next {
                        surface.stroke_circle(v.pos, HIT_RADIUS, 1.0, Color::rgba(255, 255, 255, 0.5));
                    }
                }
            }
            Phase::Menu | Phase::GameOver => {}
        }

        if self.path.len() > 1 {
            surface.stroke_polyline(&self.path, 4.0, NEON_ORANGE, false);
        }
    }
}
