//! Torque Master: keep a revving tractor airborne through fence gates
//!
//! Gravity pulls the tractor down; every tap kicks it up. The engine tone
//! follows altitude and the top 15% of the screen is the redline.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::FRAC_PI_4;

use super::GameId;
use crate::audio::{SoundParams, Tone};
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH, TICK_MS};
use crate::lerp;
use crate::renderer::{Color, Hud, RenderSurface, shapes};
use crate::sim::{
    Actor, Burst, Difficulty, Game, Gesture, InputMode, ParticleKind, Ramp, Setup, Shape, Spawner,
    Status, World,
};
use crate::zzfx;

const SND_SCORE: SoundParams = zzfx![1.2, _, 556, 0.01, 0.16, 0.15, 1, 1.43, 1.4, _, _, _, _, 0.06, _, 0.1, _, 0.67, 0.08];
const SND_CRASH: SoundParams = zzfx![2.1, _, 160, 0.05, 0.3, 0.58, 3, 2.68, _, 0.2, _, _, _, _, 1.6, _, 0.3, 0.24, 0.67];

const GRAVITY: f32 = 0.25;
const JUMP: f32 = -6.0;
const TRACTOR_X: f32 = 100.0;
const TRACTOR_RADIUS: f32 = 20.0;
const GATE_WIDTH: f32 = 70.0;
const GATE_SPEED: f32 = 3.0;
/// Base gate interval in frames
const GATE_FRAMES: f32 = 100.0;
const GROUND: f32 = LOGICAL_HEIGHT - 40.0;
const REDLINE: f32 = LOGICAL_HEIGHT * 0.15;
const ENGINE_GAIN: f32 = 0.1;
const FLAME: Burst = Burst::new(ParticleKind::Flame, 5, 0xFFD600);
const SMOKE: Burst = Burst::new(ParticleKind::Smoke, 1, 0x323232);
const BLACK_SMOKE: Burst = Burst::new(ParticleKind::Smoke, 1, 0x000000);
const CRASH_BURST: Burst = Burst::new(ParticleKind::Explosion, 25, 0xFF5722);

/// Fence gate; `pos` is the center of the opening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate;

#[derive(Debug, Clone, Default)]
pub struct TorqueMaster {
    ticks: u64,
}

fn redlining(world: &World<Gate>) -> bool {
    world.actor.pos.y < REDLINE
}

/// Opening height, narrowing with score
fn safe_height(score: u64) -> f32 {
    (200.0 - score as f32 * 2.0).max(140.0)
}

fn gate_speed(score: u64) -> f32 {
    GATE_SPEED + score as f32 * 0.05
}

impl Game for TorqueMaster {
    type Kind = Gate;

    fn id(&self) -> GameId {
        GameId::TorqueMaster
    }

    fn setup(&self) -> Setup {
        let actor = Actor::new(Vec2::new(TRACTOR_X, LOGICAL_HEIGHT / 2.0), Shape::circle(TRACTOR_RADIUS));
        Setup::new(actor, InputMode::Tap)
            .spawner(Spawner::timed())
            .difficulty(Difficulty::new(Ramp::fixed(GATE_FRAMES * TICK_MS as f32), Ramp::fixed(1.0)))
    }

    fn on_start(&mut self, world: &mut World<Gate>) {
        world.start_tone(Tone::engine(100.0, ENGINE_GAIN));
    }

    fn on_gesture(&mut self, world: &mut World<Gate>, gesture: Gesture) {
        if let Gesture::Press(_) = gesture {
            world.actor.vel.y = JUMP;
            let exhaust = Vec2::new(TRACTOR_X + 10.0, world.actor.pos.y - 30.0);
            world.emit(exhaust, FLAME);
        }
    }

    fn step_actor(&mut self, world: &mut World<Gate>) {
        self.ticks += 1;

        let actor = &mut world.actor;
        actor.vel.y += GRAVITY;
        actor.pos.y += actor.vel.y;
        let target = (actor.vel.y * 0.1).clamp(-FRAC_PI_4, FRAC_PI_4);
        actor.tilt = lerp(actor.tilt, target, 0.2);

        let exhaust = Vec2::new(TRACTOR_X + 15.0, world.actor.pos.y - 35.0);
        let hot = redlining(world);
        if hot {
            world.shake.kick(3.0);
            if self.ticks % 5 == 0 {
                world.emit(exhaust, BLACK_SMOKE);
            }
        } else if self.ticks % 10 == 0 {
            world.emit(exhaust, SMOKE);
        }

        // Engine pitch follows altitude, unstable at the redline
        let mut frequency = 60.0 + (1.0 - world.actor.pos.y / LOGICAL_HEIGHT) * 300.0;
        if hot {
            frequency += (world.rng.random::<f32>() - 0.5) * 50.0;
        }
        world.retarget_tone(frequency, ENGINE_GAIN);
    }

    fn scroll_speed(&self, world: &World<Gate>) -> f32 {
        gate_speed(world.score)
    }

    fn spawn_interval(&self, world: &World<Gate>) -> f32 {
        let frames = (GATE_FRAMES - (world.score / 5) as f32).max(60.0);
        frames * TICK_MS as f32
    }

    fn spawn(&mut self, world: &mut World<Gate>) {
        let safe = safe_height(world.score);
        let max_top = LOGICAL_HEIGHT - 100.0 - safe;
        let top = world.rng.random_range(50.0..max_top);
        let center = Vec2::new(LOGICAL_WIDTH + 50.0 + GATE_WIDTH / 2.0, top + safe / 2.0);
        world.spawn_entity(Gate, center, Shape::rect(GATE_WIDTH, safe));
        log::debug!("gate opening {top:.0}..{:.0}", top + safe);
    }

    fn step_entities(&mut self, world: &mut World<Gate>) {
        let speed = gate_speed(world.score);
        for gate in &mut world.entities {
            gate.pos.x -= speed;
            if gate.pos.x - GATE_WIDTH / 2.0 < -100.0 {
                gate.remove();
            }
        }
    }

    fn collide(&mut self, world: &mut World<Gate>) {
        let y = world.actor.pos.y;

        for i in 0..world.entities.len() {
            let gate = &world.entities[i];
            if gate.status() == Status::Removed {
                continue;
            }
            let Shape::Rect { half } = gate.shape else {
                continue;
            };
            let left = gate.pos.x - half.x;
            let right = gate.pos.x + half.x;
            let (top, bottom) = (gate.pos.y - half.y, gate.pos.y + half.y);

            let beside = TRACTOR_X + TRACTOR_RADIUS > left && TRACTOR_X - TRACTOR_RADIUS < right;
            if beside && (y - TRACTOR_RADIUS < top || y + TRACTOR_RADIUS > bottom) {
                world.crash();
            }
            if right < TRACTOR_X {
                world.award(i, 1, None, Some(SND_SCORE));
            }
        }

        if y < 0.0 || y > GROUND - 20.0 {
            world.crash();
        }
    }

    fn on_game_over(&mut self, world: &mut World<Gate>) {
        world.stop_tone();
        world.emit(world.actor.pos, CRASH_BURST);
        world.shake.kick(20.0);
        world.play(SND_CRASH);
    }

    fn hud(&self, world: &World<Gate>) -> Hud {
        let rpm = (1.0 - world.actor.pos.y / LOGICAL_HEIGHT).clamp(0.0, 1.0);
        Hud::score(world.score.to_string()).with_meter("RPM x100", rpm, redlining(world))
    }

    fn render(&self, world: &World<Gate>, surface: &mut dyn RenderSurface) {
        // Sky bands and ground
        surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, GROUND), Color::from_hex(0x4FC3F7));
        surface.fill_rect(
            Vec2::new(0.0, GROUND * 0.6),
            Vec2::new(LOGICAL_WIDTH, GROUND * 0.4),
            Color::from_hex(0xFFCC80).with_alpha(0.5),
        );
        surface.fill_rect(Vec2::new(0.0, REDLINE), Vec2::new(LOGICAL_WIDTH, 2.0), Color::rgba(231, 76, 60, 0.4));
        surface.fill_rect(Vec2::new(0.0, GROUND), Vec2::new(LOGICAL_WIDTH, 40.0), Color::from_hex(0x558B2F));
        let stripe = world.distance.rem_euclid(60.0);
        let mut x = -stripe;
        while x < LOGICAL_WIDTH {
            surface.fill_rect(Vec2::new(x, GROUND), Vec2::new(30.0, 40.0), Color::from_hex(0x33691E));
            x += 60.0;
        }

        // Fence posts above and below each opening
        for gate in &world.entities {
            let Shape::Rect { half } = gate.shape else {
                continue;
            };
            let corner_x = gate.pos.x - half.x;
            let top = gate.pos.y - half.y;
            let bottom = gate.pos.y + half.y;
            let post = Color::from_hex(0x8D6E63);
            surface.fill_rect(Vec2::new(corner_x, 0.0), Vec2::new(GATE_WIDTH, top), post);
            surface.fill_rect(Vec2::new(corner_x, bottom), Vec2::new(GATE_WIDTH, GROUND - bottom), post);
            let edge = Color::from_hex(0x5D4037);
            surface.fill_rect(Vec2::new(corner_x, top - 8.0), Vec2::new(GATE_WIDTH, 8.0), edge);
            surface.fill_rect(Vec2::new(corner_x, bottom), Vec2::new(GATE_WIDTH, 8.0), edge);
        }

        let actor = &world.actor;
        shapes::tractor(
            surface,
            actor.pos,
            Vec2::new(36.0, 50.0),
            std::f32::consts::FRAC_PI_2 + actor.tilt,
            Color::from_hex(0xD32F2F),
        );
    }
}
