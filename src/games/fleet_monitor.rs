//! Fleet Monitor: keep a parked fleet running
//!
//! Tractors break at random, more often as the shift goes on. Tapping a
//! broken tractor repairs it for a point; more than three broken at once
//! ends the run.

use glam::Vec2;
use rand::Rng;

use super::{GameId, hit_test};
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::renderer::{Color, Hud, RenderSurface, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Condition, Difficulty, Game, Gesture, InputMode, ParticleKind, Ramp, Setup, Shape,
    Spawner, Step, World,
};
use crate::zzfx;

const SND_ALARM: SoundParams = zzfx![1.05, _, 366, 0.03, 0.27, 0.29, 1, 1.52, _, _, _, _, _, 0.1, _, 0.1, _, 0.66, 0.07];
const SND_FIX: SoundParams = zzfx![1.4, _, 1549, 0.01, 0.01, 0.06, _, 1.6, -9.9, _, _, _, _, 0.1, _, 0.1, _, 0.53, 0.07];
pub(super) const SND_OVER: SoundParams = zzfx![0.4, _, 110, 0.03, 0.33, 0.53, 4, 2.5, -0.6, 0.2, _, _, _, _, 1.3, _, 0.2, 0.16, 0.71];

const COLS: usize = 4;
const ROWS: usize = 5;
const TRACTOR_SIZE: f32 = 45.0;
/// Space reserved for the top bar
const HUD_HEIGHT: f32 = 100.0;
/// More than this many broken at once loses
const MAX_BROKEN: usize = 3;
/// Base per-tick breakdown chance, scaled by difficulty
const BREAK_CHANCE: f32 = 0.005;
const FIX_BURST: Burst = Burst::new(ParticleKind::Spark, 8, 0x00E676);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tractor;

#[derive(Debug, Clone, Default)]
pub struct FleetMonitor;

/// Centers of the parking grid, row by row
fn grid() -> impl Iterator<Item = Vec2> {
    let pad_x = (LOGICAL_WIDTH - COLS as f32 * TRACTOR_SIZE) / (COLS + 1) as f32;
    let pad_y = (LOGICAL_HEIGHT - HUD_HEIGHT - ROWS as f32 * TRACTOR_SIZE) / (ROWS + 1) as f32;
    (0..ROWS).flat_map(move |r| {
        (0..COLS).map(move |c| {
            let corner = Vec2::new(
                pad_x + c as f32 * (TRACTOR_SIZE + pad_x),
                HUD_HEIGHT + pad_y + r as f32 * (TRACTOR_SIZE + pad_y),
            );
            corner + Vec2::splat(TRACTOR_SIZE / 2.0)
        })
    })
}

impl Game for FleetMonitor {
    type Kind = Tractor;

    fn id(&self) -> GameId {
        GameId::FleetMonitor
    }

    fn setup(&self) -> Setup {
        Setup::new(Actor::new(Vec2::ZERO, Shape::circle(1.0)), InputMode::Tap)
            .spawner(Spawner::by_chance(BREAK_CHANCE))
            .difficulty(Difficulty::new(
                Ramp::fixed(0.0),
                Ramp::new(1.0, Step::Add(0.1), Cadence::Elapsed { every_ms: 5000.0 }),
            ))
    }

    fn on_start(&mut self, world: &mut World<Tractor>) {
        for center in grid() {
            world.spawn_entity(Tractor, center, Shape::rect(TRACTOR_SIZE, TRACTOR_SIZE));
        }
    }

    fn on_gesture(&mut self, world: &mut World<Tractor>, gesture: Gesture) {
        let Gesture::Press(p) = gesture else {
            return;
        };
        let Some(i) = hit_test(&world.entities, p, |t| t.condition == Condition::Broken) else {
            return;
        };
        let t = &mut world.entities[i];
        t.set_condition(Condition::Working);
        t.scale = 1.4;
        let origin = t.pos;
        world.credit(1);
        world.emit(origin, FIX_BURST);
        world.play(SND_FIX);
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
        t.scale = 1.3;
        log::debug!("tractor {} broke down", t.id);
        world.shake.kick(5.0);
        world.play(SND_ALARM);
    }

    fn step_entities(&mut self, world: &mut World<Tractor>) {
        for t in &mut world.entities {
            if t.scale > 1.0 {
                t.scale += (1.0 - t.scale) * 0.1;
            }
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
        Hud::score(format!("REPAROS: {}", world.score)).with_detail(format!(
            "QUEBRADOS {}/{MAX_BROKEN}",
            world.count_condition(Condition::Broken)
        ))
    }

    fn render(&self, world: &World<Tractor>, surface: &mut dyn RenderSurface) {
        surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), Color::from_hex(0x6D4C41));
        let crop = Color::from_hex(0x33691E);
        for i in 0..(LOGICAL_WIDTH / 20.0) as u32 {
            surface.fill_rect(Vec2::new(i as f32 * 20.0, 0.0), Vec2::new(4.0, LOGICAL_HEIGHT), crop);
        }
        // Slow drift over the field
        let offset = (world.time_ticks % 40) as f32;
        let mut y = offset - 40.0;
        while y < LOGICAL_HEIGHT {
            surface.fill_rect(Vec2::new(0.0, y), Vec2::new(LOGICAL_WIDTH, 2.0), Color::rgba(0, 0, 0, 0.1));
            y += 40.0;
        }

        let bounce = (world.time_ticks as f32 * 0.167).sin() * 5.0;
        for t in &world.entities {
            let broken = t.condition == Condition::Broken;
            let body = if broken { Color::from_hex(0x78909C) } else { Color::from_hex(0xFFC107) };
            shapes::tractor(surface, t.pos, Vec2::splat(TRACTOR_SIZE) * t.scale, 0.0, body);
            if broken {
                shapes::alert_badge(surface, t.pos - Vec2::new(0.0, 40.0 - bounce), 14.0, world.time_ticks as f32 * 0.2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{playing, steps, tap};
    use crate::sim::Phase;

    fn break_down(s: &mut crate::sim::Session<FleetMonitor>, i: usize) -> Vec2 {
        let t = &mut s.world_mut().entities[i];
        t.set_condition(Condition::Broken);
        t.pos
    }

    #[test]
    fn test_grid_layout() {
        let centers: Vec<Vec2> = grid().collect();
        assert_eq!(centers.len(), COLS * ROWS);
        assert_eq!(centers[0], Vec2::new(44.0 + 22.5, HUD_HEIGHT + 475.0 / 6.0 + 22.5));
        assert!(centers.iter().all(|c| c.x < LOGICAL_WIDTH && c.y < LOGICAL_HEIGHT));
    }

    #[test]
    fn test_tap_repairs_broken_tractor() {
        let (mut s, synth) = playing(FleetMonitor::default(), 1);
        s.world_mut().spawner = Spawner::off();
        let at = break_down(&mut s, 5);
        tap(&mut s, at.x + 10.0, at.y - 10.0);
        s.step();
        assert_eq!(s.world().score, 1);
        assert_eq!(s.world().entities[5].condition, Condition::Working);
        assert!(s.world().entities[5].scale > 1.0);
        assert_eq!(synth.play_count(), 1);

        // Working tractors ignore taps
        tap(&mut s, at.x, at.y);
        s.step();
        assert_eq!(s.world().score, 1);
    }

    #[test]
    fn test_fourth_breakdown_loses() {
        let (mut s, _) = playing(FleetMonitor::default(), 2);
        s.world_mut().spawner = Spawner::off();
        for i in 0..3 {
            break_down(&mut s, i);
        }
        s.step();
        assert_eq!(s.world().phase(), Phase::Playing);
        break_down(&mut s, 3);
        s.step();
        assert_eq!(s.world().phase(), Phase::GameOver);
    }

    #[test]
    fn test_breakdowns_happen_and_pop() {
        let (mut s, synth) = playing(FleetMonitor::default(), 3);
        s.world_mut().spawner = Spawner::by_chance(1.0);
        s.step();
        let broken: Vec<_> = s.world().entities.iter().filter(|t| t.condition == Condition::Broken).collect();
        assert_eq!(broken.len(), 1);
        assert!(broken[0].scale > 1.2);
        assert_eq!(synth.play_count(), 1);
        assert!(s.world().shake.magnitude() > 0.0);
    }

    #[test]
    fn test_breakdowns_accelerate() {
        let (mut s, _) = playing(FleetMonitor::default(), 4);
        s.world_mut().spawner = Spawner::off();
        assert_eq!(s.world().difficulty.intensity.value(), 1.0);
        steps(&mut s, 301);
        assert!((s.world().difficulty.intensity.value() - 1.1).abs() < 1e-4);
    }
}
