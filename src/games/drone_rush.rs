//! Drone Rush: fly a spraying drone over a scrolling field
//!
//! Hovering over a pest cures it (scored once, sprayed for as long as the
//! drone stays over it). Trees and power poles end the run.

use glam::Vec2;
use rand::Rng;

use super::GameId;
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH, TICK_MS};
use crate::renderer::{Color, Hud, RenderSurface, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Difficulty, Game, InputMode, ParticleKind, Penalty, Ramp, Setup, Shape,
    Spawner, Status, Step, World,
};
use crate::zzfx;

const SND_SPRAY: SoundParams = zzfx![0.5, _, 377, 0.03, 0.06, 0.23, 3, 1.69, -6.4, _, _, _, _, 0.6, _, 0.5, _, 0.63, 0.06];
const SND_SCORE: SoundParams = zzfx![1.1, _, 663, 0.02, 0.05, 0.12, 1, 1.93, 6.2, _, _, _, _, 0.06, _, 0.1, _, 0.67, 0.09];
const SND_CRASH: SoundParams = zzfx![1.8, _, 232, 0.04, 0.19, 0.53, 4, 2.26, -0.5, 0.5, _, _, _, _, 1.2, _, 0.2, 0.16, 0.74];

const DRONE_SIZE: f32 = 50.0;
const DRONE_Y: f32 = LOGICAL_HEIGHT - 120.0;
/// Hitboxes are 75% of the drawn size
const HITBOX: f32 = 0.75;
const PEST_POINTS: u64 = 10;
/// Base spawn interval in frames
const SPAWN_FRAMES: f32 = 60.0;
/// Bank per px/tick of sideways speed, nose into the turn
const BANK_PER_SPEED: f32 = -0.8 * 0.005 / 0.3;
const MAX_BANK: f32 = 0.5;
/// Ticks between hover sprays (just over 80 ms)
const SPRAY_EVERY_TICKS: u64 = 5;
const CURE_BURST: Burst = Burst::new(ParticleKind::Spray, 4, 0x00E5FF);
const HOVER_BURST: Burst = Burst::new(ParticleKind::Spray, 4, 0x80DEEA);
const CRASH_BURST: Burst = Burst::new(ParticleKind::Explosion, 20, 0xFF5722);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Pest,
    Tree,
    Pole,
}

impl Kind {
    /// Drawn diameter
    fn size(self) -> f32 {
        match self {
            Kind::Pest => 40.0,
            Kind::Tree => 55.0,
            Kind::Pole => 25.0,
        }
    }
}

/// Chance that a spawn is an obstacle rather than a pest
fn obstacle_chance(level: u32) -> f32 {
    (0.2 + level as f32 * 0.02).min(0.5)
}

#[derive(Debug, Clone, Default)]
pub struct DroneRush {
    last_spray_tick: Option<u64>,
}

impl Game for DroneRush {
    type Kind = Kind;

    fn id(&self) -> GameId {
        GameId::DroneRush
    }

    fn setup(&self) -> Setup {
        let edge = DRONE_SIZE / 2.0 + 5.0;
        let actor = Actor::new(Vec2::new(LOGICAL_WIDTH / 2.0, DRONE_Y), Shape::circle(DRONE_SIZE / 2.0 * HITBOX))
            .with_ease(0.3)
            .horizontal()
            .bounded(Vec2::new(edge, 0.0), Vec2::new(LOGICAL_WIDTH - edge, LOGICAL_HEIGHT));
        Setup::new(actor, InputMode::Follow)
            .spawner(Spawner::timed())
            .difficulty(Difficulty::new(
                Ramp::fixed(SPAWN_FRAMES * TICK_MS as f32),
                // Scroll speed, 5% faster every 10 s
                Ramp::new(5.0, Step::Scale(1.05), Cadence::Elapsed { every_ms: 10_000.0 }),
            ))
    }

    fn step_actor(&mut self, world: &mut World<Kind>) {
        world.actor.ease_toward_target();
        world.actor.tilt_from_velocity(BANK_PER_SPEED, MAX_BANK);
        world.level = 1 + world.difficulty.intensity.steps();
    }

    fn scroll_speed(&self, world: &World<Kind>) -> f32 {
        world.difficulty.intensity.value()
    }

    fn spawn_interval(&self, world: &World<Kind>) -> f32 {
        let frames = (SPAWN_FRAMES - (world.level as f32 * 2.5).floor()).max(25.0);
        frames * TICK_MS as f32
    }

    fn spawn(&mut self, world: &mut World<Kind>) {
        let kind = if world.rng.random::<f32>() < obstacle_chance(world.level) {
            if world.rng.random::<f32>() > 0.5 { Kind::Tree } else { Kind::Pole }
        } else {
            Kind::Pest
        };
        let size = kind.size();
        let x = world.rng.random::<f32>() * (LOGICAL_WIDTH - size - 20.0) + size / 2.0 + 10.0;
        let e = world.spawn_entity(kind, Vec2::new(x, -100.0), Shape::circle(size / 2.0 * HITBOX));
        log::debug!("{kind:?} {} at x={x:.0}", e.id);
    }

    fn step_entities(&mut self, world: &mut World<Kind>) {
        let speed = world.difficulty.intensity.value();
        for e in &mut world.entities {
            e.pos.y += speed;
            if e.pos.y > LOGICAL_HEIGHT + 50.0 {
                e.remove();
            }
        }
    }

    fn collide(&mut self, world: &mut World<Kind>) {
        let drone = world.actor.pos;
        let shape = world.actor.shape;
        let mut hovering = false;

        for i in 0..world.entities.len() {
            let e = &world.entities[i];
            if e.status() == Status::Removed || !e.shape.overlaps(e.pos, &shape, drone) {
                continue;
            }
            match e.kind {
                Kind::Pest => {
                    hovering = true;
                    world.award(i, PEST_POINTS, Some(CURE_BURST), Some(SND_SCORE));
                }
                Kind::Tree | Kind::Pole => {
                    if !world.crashed() {
                        world.emit(drone, CRASH_BURST);
                        world.penalize(Penalty::Crash, 25.0, Some(SND_CRASH));
                    }
                }
            }
        }

        let due = self
            .last_spray_tick
            .is_none_or(|t| world.time_ticks - t >= SPRAY_EVERY_TICKS);
        if hovering && due {
            self.last_spray_tick = Some(world.time_ticks);
            world.emit(drone + Vec2::new(0.0, 20.0), HOVER_BURST);
            world.play(SND_SPRAY);
        }
    }

    fn hud(&self, world: &World<Kind>) -> Hud {
        Hud::score(world.score.to_string()).with_detail(format!("NÍVEL {}", world.level))
    }

    fn render(&self, world: &World<Kind>, surface: &mut dyn RenderSurface) {
        shapes::field_rows(surface, world.distance, 100.0, Color::from_hex(0x33691E), Color::from_hex(0x2E5A1A));

        for e in &world.entities {
            let size = e.kind.size();
            match e.kind {
                Kind::Pest => {
                    let cured = !e.is_active();
                    let (fill, stroke) = if cured {
                        (Color::from_hex(0x00E676), Color::WHITE)
                    } else {
                        (Color::rgba(211, 47, 47, 0.8), Color::from_hex(0xB71C1C))
                    };
                    surface.fill_circle(e.pos, size / 2.0, fill);
                    surface.stroke_circle(e.pos, size / 2.0, 2.0, stroke);
                    if !cured {
                        shapes::alert_badge(surface, e.pos - Vec2::new(0.0, size / 2.0 + 8.0), 7.0, world.time_ticks as f32 * 0.2);
                    }
                }
                Kind::Tree => shapes::tree(surface, e.pos, size / 2.0),
                Kind::Pole => shapes::pole(surface, e.pos, size),
            }
        }

        let actor = &world.actor;
        shapes::drone(surface, actor.pos, DRONE_SIZE, actor.tilt, world.time_ticks as f32, Color::from_hex(0xFF6700));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{playing, steps};
    use crate::sim::Phase;

    fn place(s: &mut crate::sim::Session<DroneRush>, kind: Kind) {
        let size = kind.size();
        let pos = s.world().actor.pos;
        s.world_mut().spawn_entity(kind, pos, Shape::circle(size / 2.0 * HITBOX));
    }

    #[test]
    fn test_pest_is_cured_once_and_sprayed_while_hovering() {
        let (mut s, synth) = playing(DroneRush::default(), 1);
        place(&mut s, Kind::Pest);
        s.step();
        assert_eq!(s.world().score, PEST_POINTS);
        assert_eq!(s.world().entities[0].status(), Status::Resolved);
        // Cure ding plus the first spray hiss
        assert_eq!(synth.play_count(), 2);

        // Pest is 40 px and scrolls 5 px a tick: a few more ticks of overlap
        steps(&mut s, 5);
        assert_eq!(s.world().score, PEST_POINTS);
        assert_eq!(synth.play_count(), 3);
    }

    #[test]
    fn test_obstacle_crashes() {
        for kind in [Kind::Tree, Kind::Pole] {
            let (mut s, synth) = playing(DroneRush::default(), 2);
            place(&mut s, kind);
            s.step();
            assert_eq!(s.world().phase(), Phase::GameOver);
            assert_eq!(synth.play_count(), 1);
            assert!(s.world().shake.magnitude() > 20.0);
        }
    }

    #[test]
    fn test_level_follows_speed_ramp() {
        let (mut s, _) = playing(DroneRush::default(), 3);
        let game = s.game().clone();
        assert_eq!(game.spawn_interval(s.world()), 58.0 * TICK_MS as f32);

        s.world_mut().difficulty.advance(10_000.0);
        s.world_mut().entities.clear();
        s.step();
        assert_eq!(s.world().level, 2);
        assert!((game.scroll_speed(s.world()) - 5.25).abs() < 1e-4);
        assert_eq!(game.spawn_interval(s.world()), 55.0 * TICK_MS as f32);
    }

    #[test]
    fn test_drone_banks_into_turns() {
        let (mut s, _) = playing(DroneRush::default(), 5);
        let y = s.world().actor.pos.y;
        s.world_mut().actor.aim(Vec2::new(LOGICAL_WIDTH / 2.0 + 10.0, y));
        s.step();
        assert!((s.world().actor.tilt - 3.0 * BANK_PER_SPEED).abs() < 1e-4);

        s.world_mut().actor.aim(Vec2::new(LOGICAL_WIDTH, y));
        s.step();
        assert_eq!(s.world().actor.tilt, -MAX_BANK);

        s.world_mut().actor.aim(Vec2::new(0.0, y));
        s.step();
        assert_eq!(s.world().actor.tilt, MAX_BANK);
    }

    #[test]
    fn test_obstacle_chance_caps_at_half() {
        assert!((obstacle_chance(1) - 0.22).abs() < 1e-6);
        assert_eq!(obstacle_chance(15), 0.5);
        assert_eq!(obstacle_chance(100), 0.5);
    }

    #[test]
    fn test_objects_scroll_off_and_are_culled() {
        let (mut s, _) = playing(DroneRush::default(), 4);
        s.world_mut()
            .spawn_entity(Kind::Tree, Vec2::new(20.0, LOGICAL_HEIGHT + 48.0), Shape::circle(20.0));
        s.step();
        assert!(s.world().entities.iter().all(|e| e.pos.y <= LOGICAL_HEIGHT + 50.0));
        assert_eq!(s.world().phase(), Phase::Playing);
    }
}
