//! Agro Panic: a harvest with tractors roaming the fields
//!
//! Score is seconds survived. Tractors break down on a timer that tightens
//! every 15 s; a tap near a broken one repairs it. More than three broken at
//! once collapses the harvest.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::fleet_monitor::SND_OVER;
use super::{GameId, wrap_angle};
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::renderer::{Color, Hud, RenderSurface, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Condition, Difficulty, Game, Gesture, InputMode, ParticleKind, Ramp, Setup, Shape,
    Spawner, Step, World,
};
use crate::zzfx;

const SND_ALARM: SoundParams = zzfx![1.1, _, 385, 0.03, 0.28, 0.36, 1, 1.57, _, _, _, _, _, 0.1, _, 0.1, _, 0.63, 0.06];
const SND_FIX: SoundParams = zzfx![1.6, _, 1658, 0.01, 0.03, 0.06, _, 1.7, -6.2, _, _, _, _, 0.1, _, 0.1, _, 0.56, 0.06];

const FLEET: usize = 10;
const TRACTOR_SIZE: Vec2 = Vec2::new(40.0, 55.0);
/// Finger-sized repair radius
const REACH: f32 = 50.0;
/// Roaming tractors turn back this far from the edges
const MARGIN: f32 = 30.0;
const MAX_BROKEN: usize = 3;
const FIX_BURST: Burst = Burst::new(ParticleKind::Spark, 15, 0x00E676);
const SMOKE_BURST: Burst = Burst::new(ParticleKind::Smoke, 1, 0x757575);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tractor;

#[derive(Debug, Clone, Default)]
pub struct AgroPanic;

impl Game for AgroPanic {
    type Kind = Tractor;

    fn id(&self) -> GameId {
        GameId::AgroPanic
    }

    fn setup(&self) -> Setup {
        Setup::new(Actor::new(Vec2::ZERO, Shape::circle(1.0)), InputMode::Tap)
            .spawner(Spawner::timed())
            .difficulty(Difficulty::new(
                Ramp::new(2000.0, Step::Add(-300.0), Cadence::Elapsed { every_ms: 15_000.0 }).floor(600.0),
                Ramp::fixed(1.0),
            ))
    }

    fn on_start(&mut self, world: &mut World<Tractor>) {
        // Spread over a 3x4 grid so nobody starts stacked
        let cell = Vec2::new(LOGICAL_WIDTH / 3.0, LOGICAL_HEIGHT / 4.0);
        for i in 0..FLEET {
            let pos = Vec2::new((i % 3) as f32, (i / 3) as f32) * cell + cell / 2.0;
            let vel = Vec2::new(world.rng.random::<f32>() - 0.5, world.rng.random::<f32>() - 0.5) * 1.5;
            let rotation = world.rng.random::<f32>() * TAU;
            let t = world.spawn_entity(Tractor, pos, Shape::circle(REACH));
            t.vel = vel;
            t.rotation = rotation;
        }
    }

    fn on_gesture(&mut self, world: &mut World<Tractor>, gesture: Gesture) {
        let Gesture::Press(p) = gesture else {
            return;
        };
        let mut fixed = Vec::new();
        for t in &mut world.entities {
            if t.condition == Condition::Broken && t.shape.contains(t.pos, p) {
                t.set_condition(Condition::Working);
                t.scale = 1.3;
                fixed.push(t.pos);
            }
        }
        for origin in fixed {
            world.emit(origin, FIX_BURST);
            world.play(SND_FIX);
        }
    }

    fn step_actor(&mut self, _world: &mut World<Tractor>) {}

    /// A breakdown
    fn spawn(&mut self, world: &mut World<Tractor>) {
        let working: Vec<usize> = (0..world.entities.len())
            .filter(|&i| world.entities[i].condition == Condition::Working)
            .collect();
        if working.is_empty() {
            return;
        }
        let i = working[world.rng.random_range(0..working.len())];
        let t = &mut world.entities[i];
        t.set_condition(Condition::Broken);
        t.scale = 1.4;
        log::debug!("tractor {} broke down", t.id);
        world.shake.kick(5.0);
        world.play(SND_ALARM);
    }

    fn step_entities(&mut self, world: &mut World<Tractor>) {
        world.score = (world.elapsed_ms / 1000.0).floor() as u64;

        let mut smoke = Vec::new();
        for t in &mut world.entities {
            if t.scale > 1.0 {
                t.scale += (1.0 - t.scale) * 0.1;
            }

            if t.condition == Condition::Working {
                t.integrate();
                if t.pos.x < MARGIN || t.pos.x > LOGICAL_WIDTH - MARGIN {
                    t.vel.x = -t.vel.x;
                }
                if t.pos.y < MARGIN || t.pos.y > LOGICAL_HEIGHT - MARGIN {
                    t.vel.y = -t.vel.y;
                }
                let heading = t.vel.y.atan2(t.vel.x) + FRAC_PI_2;
                t.rotation += wrap_angle(heading - t.rotation) * 0.1;
            } else {
                // Stalled engines shudder
                t.pos += Vec2::new(world.rng.random::<f32>() - 0.5, world.rng.random::<f32>() - 0.5) * 2.0;
                if world.rng.random::<f32>() > 0.85 {
                    smoke.push(t.pos);
                }
            }
        }
        for origin in smoke {
            world.emit(origin, SMOKE_BURST);
        }
    }

    fn is_lost(&self, world: &World<Tractor>) -> bool {
        world.count_condition(Condition::Broken) > MAX_BROKEN
    }

    fn on_game_over(&mut self, world: &mut World<Tractor>) {
        world.shake.kick(30.0);
        world.play(SND_OVER);
    }

    fn hud(&self, world: &World<Tractor>) -> Hud {
        let broken = world.count_condition(Condition::Broken);
        Hud::score(format!("SAFRA: {}s", world.score)).with_meter(
            format!("QUEBRADOS {broken}/{MAX_BROKEN}"),
            broken as f32 / (MAX_BROKEN + 1) as f32,
            broken >= MAX_BROKEN,
        )
    }

    fn render(&self, world: &World<Tractor>, surface: &mut dyn RenderSurface) {
        // Patchwork of fields between dirt roads
        surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), Color::from_hex(0x5D4037));
        let road = 20.0;
        let field = Vec2::new((LOGICAL_WIDTH - road * 3.0) / 2.0, (LOGICAL_HEIGHT - road * 4.0) / 3.0);
        let rows = Color::rgba(0, 0, 0, 0.15);
        for r in 0..3 {
            for c in 0..2 {
                let corner = Vec2::new(road + c as f32 * (field.x + road), road + r as f32 * (field.y + road));
                let vertical = (r + c) % 2 == 0;
                let base = if vertical { Color::from_hex(0x2E7D32) } else { Color::from_hex(0x388E3C) };
                surface.fill_rect(corner, field, base);
                let mut i = 0.0;
                if vertical {
                    while i < field.x {
                        surface.fill_rect(corner + Vec2::new(i, 0.0), Vec2::new(4.0, field.y), rows);
                        i += 15.0;
                    }
                } else {
                    while i < field.y {
                        surface.fill_rect(corner + Vec2::new(0.0, i), Vec2::new(field.x, 4.0), rows);
                        i += 15.0;
                    }
                }
            }
        }

        let flash = (world.time_ticks / 12) % 2 == 0;
        for t in &world.entities {
            let broken = t.condition == Condition::Broken;
            let body = match (broken, flash) {
                (false, _) => Color::from_hex(0xFFC107),
                (true, true) => Color::from_hex(0xFF1744),
                (true, false) => Color::from_hex(0x78909C),
            };
            shapes::tractor(surface, t.pos, TRACTOR_SIZE * t.scale, t.rotation, body);
            if broken {
                let float = (world.elapsed_ms as f32 / 150.0).sin() * 5.0;
                shapes::alert_badge(surface, t.pos - Vec2::new(0.0, 50.0 - float), 12.0, world.time_ticks as f32 * 0.2);
            }
        }
    }
}
