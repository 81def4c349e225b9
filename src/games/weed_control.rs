//! Weed Control: steer a spraying tractor under falling weeds
//!
//! The tractor auto-sprays a fan of droplets; a droplet inside a weed kills
//! it for points. Weeds that reach the bottom cost a life.

use glam::Vec2;
use rand::Rng;

use super::GameId;
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::renderer::{Color, RenderSurface, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Difficulty, Game, InputMode, ParticleKind, Penalty, Ramp, Setup, Shape,
    Spawner, Step, World,
};
use crate::zzfx;

const SND_SHOOT: SoundParams = zzfx![0.1, _, 0.1, 0.01, 0.01, 0.04, 0, 1.2, -6, -1.3, _, _, _, 0.5, _, 0.1, _, 0.6, 0.03];
const SND_HIT: SoundParams = zzfx![1.2, _, 359, 0.01, 0.08, 0.16, 1, 1.48, -1.7, 0.2, _, _, 0.08, 1.4, _, 0.1, 0.08, 0.64, 0.06];
const SND_HURT: SoundParams = zzfx![1.5, _, 197, 0.02, 0.17, 0.33, 2, 1.38, _, 0.1, _, _, _, 1.1, _, 0.3, 0.12, 0.27, 0.07];

const TRACTOR_SIZE: Vec2 = Vec2::new(50.0, 70.0);
const WEED_RADIUS: f32 = 18.0;
const WEED_POINTS: u64 = 10;
/// First tick past 300 ms
const FIRE_EVERY_TICKS: u32 = 19;
const DROPLETS_PER_SHOT: usize = 5;
/// Droplet life at launch; lost at 0.02 per tick
const DROPLET_LIFE: f32 = 0.8;
const KILL_BURST: Burst = Burst::new(ParticleKind::Explosion, 8, 0x4CAF50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Weed,
    Droplet,
}

#[derive(Debug, Clone, Default)]
pub struct WeedControl {
    ticks_since_shot: u32,
}

impl WeedControl {
    fn fire(&mut self, world: &mut World<Kind>) {
        let nozzle = world.actor.pos - Vec2::new(0.0, 10.0);
        for _ in 0..DROPLETS_PER_SHOT {
            let pos = nozzle + Vec2::new((world.rng.random::<f32>() - 0.5) * 20.0, 0.0);
            let vel = Vec2::new(
                (world.rng.random::<f32>() - 0.5) * 2.0,
                -8.0 - world.rng.random::<f32>() * 2.0,
            );
            let droplet = world.spawn_entity(Kind::Droplet, pos, Shape::circle(2.0));
            droplet.vel = vel;
            droplet.progress = DROPLET_LIFE;
        }
        world.play(SND_SHOOT);
    }
}

impl Game for WeedControl {
    type Kind = Kind;

    fn id(&self) -> GameId {
        GameId::WeedControl
    }

    fn setup(&self) -> Setup {
        let half = TRACTOR_SIZE.x * 0.5;
        let actor = Actor::new(Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT - 100.0), Shape::rect(TRACTOR_SIZE.x, TRACTOR_SIZE.y))
            .horizontal()
            .bounded(Vec2::new(half, 0.0), Vec2::new(LOGICAL_WIDTH - half, LOGICAL_HEIGHT));
        Setup::new(actor, InputMode::Follow)
            .spawner(Spawner::timed())
            .difficulty(Difficulty::new(
                Ramp::fixed(1500.0),
                // Weed fall speed
                Ramp::new(3.0, Step::Add(0.5), Cadence::Elapsed { every_ms: 15_000.0 }),
            ))
    }

    fn step_actor(&mut self, world: &mut World<Kind>) {
        world.actor.ease_toward_target();

        self.ticks_since_shot += 1;
        if self.ticks_since_shot >= FIRE_EVERY_TICKS {
            self.ticks_since_shot = 0;
            self.fire(world);
        }
    }

    fn scroll_speed(&self, world: &World<Kind>) -> f32 {
        world.difficulty.intensity.value()
    }

    fn spawn_interval(&self, world: &World<Kind>) -> f32 {
        (1500.0 - world.difficulty.intensity.value() * 100.0).max(500.0)
    }

    fn spawn(&mut self, world: &mut World<Kind>) {
        let speed = world.difficulty.intensity.value() + world.rng.random::<f32>();
        let x = world.rng.random_range(30.0..LOGICAL_WIDTH - 30.0);
        let rotation = world.rng.random::<f32>() * std::f32::consts::PI;
        let weed = world.spawn_entity(Kind::Weed, Vec2::new(x, -40.0), Shape::circle(WEED_RADIUS));
        weed.vel = Vec2::new(0.0, speed);
        weed.rotation = rotation;
        weed.spin = 0.05;
        log::debug!("weed {} at x={x:.0}, speed {speed:.2}", weed.id);
    }

    fn step_entities(&mut self, world: &mut World<Kind>) {
        for e in &mut world.entities {
            e.integrate();
            if e.kind == Kind::Droplet {
                e.progress -= 0.02;
                if e.progress <= 0.0 {
                    e.remove();
                }
            }
        }
    }

    fn collide(&mut self, world: &mut World<Kind>) {
        for d in 0..world.entities.len() {
            let drop = &world.entities[d];
            if drop.kind != Kind::Droplet || !drop.is_active() {
                continue;
            }
            let point = drop.pos;
            let hit = world
                .entities
                .iter()
                .position(|w| w.kind == Kind::Weed && w.is_active() && w.shape.contains(w.pos, point));
            if let Some(w) = hit {
                world.award(w, WEED_POINTS, Some(KILL_BURST), Some(SND_HIT));
                world.entities[w].remove();
                world.entities[d].remove();
                world.shake.kick(3.0);
            }
        }

        // Escaped weeds
        for i in 0..world.entities.len() {
            let e = &world.entities[i];
            if e.kind == Kind::Weed && e.is_active() && e.pos.y > LOGICAL_HEIGHT + 20.0 {
                world.entities[i].remove();
                world.penalize(Penalty::Life, 15.0, Some(SND_HURT));
            }
        }
    }

    fn render(&self, world: &World<Kind>, surface: &mut dyn RenderSurface) {
        shapes::field_rows(surface, world.distance, 40.0, Color::from_hex(0x5D4037), Color::from_hex(0x4E342E));

        for e in &world.entities {
            match e.kind {
                Kind::Weed => shapes::weed(
                    surface,
                    e.pos,
                    WEED_RADIUS,
                    e.rotation,
                    Color::from_hex(0x8BC34A),
                    Color::from_hex(0x33691E),
                ),
                Kind::Droplet => {
                    surface.fill_circle(e.pos, 2.0, Color::rgba(200, 255, 255, e.progress.clamp(0.0, 1.0)))
                }
            }
        }

        shapes::tractor(surface, world.actor.pos, TRACTOR_SIZE, 0.0, Color::from_hex(0xFF6700));
    }
}
