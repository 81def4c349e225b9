//! Monitor Panic: a control room watching six field sectors
//!
//! Sectors fail on a shrinking timer. A warning left alone for three seconds
//! turns critical. Every failing sector pushes the panic meter up, and the
//! run ends when it hits 100%. Tapping a failing sector repairs it.

use glam::Vec2;
use rand::Rng;

use super::{GameId, hit_test};
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH, TICK_MS};
use crate::renderer::{Color, Hud, RenderSurface, TextAlign, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Condition, Difficulty, Game, Gesture, InputMode, ParticleKind, Penalty, Ramp, Setup,
    Shape, Spawner, Step, World,
};
use crate::zzfx;

const SND_ALARM: SoundParams = zzfx![1.5, _, 481, 0.03, 0.43, 0.37, 2, 1.35, 3.2, _, _, _, _, 1.1, _, 0.1, 0.08, 0.71, 0.05];
const SND_FIX: SoundParams = zzfx![1.1, _, 1000, 0.01, 0.03, 0.08, _, 1.6, -9.9, _, _, _, _, 0.1, _, 0.1, _, 0.53, 0.07];
const SND_FAIL: SoundParams = zzfx![0.8, _, 133, 0.03, 0.33, 0.53, 4, 2.5, -0.6, 0.2, _, _, _, _, 1.3, _, 0.2, 0.16, 0.71];

const COLS: usize = 2;
const ROWS: usize = 3;
const PADDING: f32 = 25.0;
const TOP: f32 = 90.0;
const LABELS: [&str; COLS * ROWS] = [
    "SETOR ALPHA",
    "SETOR BRAVO",
    "SETOR CHARLIE",
    "SETOR DELTA",
    "SETOR ECHO",
    "SETOR FOXTROT",
];

/// A warning escalates after this long
const CRITICAL_AFTER_MS: f64 = 3000.0;
/// Panic per tick for each failing sector
const WARNING_PANIC: f32 = 0.03;
const CRITICAL_PANIC: f32 = 0.1;
/// Panic bleed per tick while every sector is fine
const COOLDOWN: f32 = 0.05;
const REPAIR_RELIEF: f32 = 10.0;
const SMOKE_BURST: Burst = Burst::new(ParticleKind::Smoke, 1, 0x90A4AE);
const FIX_BURST: Burst = Burst::new(ParticleKind::Spark, 12, 0x4CAF50);
const ALERT: Color = Color::from_hex(0xFF1744);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector;

#[derive(Debug, Clone, Default)]
pub struct MonitorPanic;

fn module_size() -> Vec2 {
    Vec2::new(
        (LOGICAL_WIDTH - PADDING * (COLS + 1) as f32) / COLS as f32,
        (LOGICAL_HEIGHT - TOP - PADDING * (ROWS + 1) as f32) / ROWS as f32,
    )
}

/// Panic is whatever health the room has lost
fn panic_level(world: &World<Sector>) -> f32 {
    100.0 - world.health
}

impl Game for MonitorPanic {
    type Kind = Sector;

    fn id(&self) -> GameId {
        GameId::MonitorPanic
    }

    fn setup(&self) -> Setup {
        Setup::new(Actor::new(Vec2::ZERO, Shape::circle(1.0)), InputMode::Tap)
            .spawner(Spawner::timed().primed())
            .difficulty(Difficulty::new(
                // 50 ms quicker per repair
                Ramp::new(2000.0, Step::Add(-50.0), Cadence::Resolutions { every: 1 }).floor(400.0),
                Ramp::fixed(1.0),
            ))
    }

    fn on_start(&mut self, world: &mut World<Sector>) {
        let size = module_size();
        for r in 0..ROWS {
            for c in 0..COLS {
                let corner = Vec2::new(PADDING + c as f32 * (size.x + PADDING), TOP + r as f32 * (size.y + PADDING));
                world.spawn_entity(Sector, corner + size / 2.0, Shape::rect(size.x, size.y));
            }
        }
    }

    fn on_gesture(&mut self, world: &mut World<Sector>, gesture: Gesture) {
        let Gesture::Press(p) = gesture else {
            return;
        };
        let Some(i) = hit_test(&world.entities, p, |m| m.condition != Condition::Working) else {
            return;
        };
        let m = &mut world.entities[i];
        m.set_condition(Condition::Working);
        m.progress = 1.0;
        let origin = m.pos;
        world.credit(1);
        world.heal(REPAIR_RELIEF);
        world.emit(origin, FIX_BURST);
        world.play(SND_FIX);
    }

    fn step_actor(&mut self, _world: &mut World<Sector>) {}

    /// A sector starts failing
    fn spawn(&mut self, world: &mut World<Sector>) {
        let fine: Vec<usize> = (0..world.entities.len())
            .filter(|&i| world.entities[i].condition == Condition::Working)
            .collect();
        if fine.is_empty() {
            return;
        }
        let i = fine[world.rng.random_range(0..fine.len())];
        world.entities[i].set_condition(Condition::Warning);
        log::debug!("{} warning", LABELS[i]);
        world.play(SND_ALARM);
    }

    fn step_entities(&mut self, world: &mut World<Sector>) {
        let t = world.elapsed_ms as f32;
        let mut rise = 0.0;
        let mut smoke = Vec::new();

        for m in &mut world.entities {
            m.progress = (m.progress - 0.1).max(0.0);
            if m.condition == Condition::Working {
                if m.scale > 1.0 {
                    m.scale += (1.0 - m.scale) * 0.2;
                }
                continue;
            }

            let pulse = if m.condition == Condition::Broken { 0.02 } else { 0.01 };
            m.scale = 1.0 + (t * pulse).sin() * 0.05;
            m.timer_ms += TICK_MS;
            if world.rng.random::<f32>() > 0.9 {
                smoke.push(m.pos);
            }
            if m.condition == Condition::Warning && m.timer_ms > CRITICAL_AFTER_MS {
                m.set_condition(Condition::Broken);
                world.shake.kick(5.0);
            }
            rise += if m.condition == Condition::Broken { CRITICAL_PANIC } else { WARNING_PANIC };
        }

        for origin in smoke {
            world.emit(origin, SMOKE_BURST);
        }
        if rise > 0.0 {
            world.penalize(Penalty::Health(rise), 0.0, None);
        } else {
            world.heal(COOLDOWN);
        }
    }

    fn on_game_over(&mut self, world: &mut World<Sector>) {
        world.shake.kick(30.0);
        world.play(SND_FAIL);
    }

    fn hud(&self, world: &World<Sector>) -> Hud {
        let panic = panic_level(world);
        Hud::score(format!("REPAROS: {}", world.score)).with_meter(
            format!("PÂNICO: {}%", panic.floor()),
            panic / 100.0,
            panic > 80.0,
        )
    }

    fn render(&self, world: &World<Sector>, surface: &mut dyn RenderSurface) {
        surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), Color::from_hex(0x261C15));
        let grid = Color::rgba(76, 175, 80, 0.2);
        for i in 0..=(LOGICAL_WIDTH / 40.0) as u32 {
            let x = i as f32 * 40.0;
            surface.stroke_polyline(&[Vec2::new(x, 0.0), Vec2::new(x, LOGICAL_HEIGHT)], 1.0, grid, false);
        }
        for i in 0..=(LOGICAL_HEIGHT / 40.0) as u32 {
            let y = i as f32 * 40.0;
            surface.stroke_polyline(&[Vec2::new(0.0, y), Vec2::new(LOGICAL_WIDTH, y)], 1.0, grid, false);
        }

        let size = module_size();
        // Failing bodies blink every 200 ms
        let blink = (world.time_ticks / 12) % 2 == 0;
        for (m, label) in world.entities.iter().zip(LABELS) {
            let corner = m.pos - size / 2.0;
            surface.stroke_rect(corner, size, 2.0, Color::rgba(255, 255, 255, 0.05));
            surface.text(label, corner + Vec2::new(size.x / 2.0, 20.0), 10.0, TextAlign::Center, Color::rgba(255, 255, 255, 0.5));

            let failing = m.condition != Condition::Working;
            let body = match (failing, blink) {
                (false, _) => Color::from_hex(0xFFC107),
                (true, true) => Color::from_hex(0xFF8A65),
                (true, false) => ALERT,
            };
            let center = m.pos + Vec2::new(0.0, 10.0);
            shapes::tractor(surface, center, Vec2::new(56.0, 60.0) * m.scale, 0.0, body);
            if failing {
                let float = (world.elapsed_ms as f32 / 150.0).sin() * 5.0;
                shapes::alert_badge(surface, center - Vec2::new(0.0, 55.0 - float), 12.0, world.time_ticks as f32 * 0.2);
            }
            if m.progress > 0.0 {
                surface.fill_rect(center - Vec2::new(30.0, 35.0), Vec2::new(60.0, 70.0), Color::WHITE.with_alpha(m.progress));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{playing, steps, tap};
    use crate::sim::{Phase, Session};

    /// Playing with the first failure fired and the spawner stopped
    fn one_warning(seed: u64) -> (Session<MonitorPanic>, usize) {
        let (mut s, _) = playing(MonitorPanic::default(), seed);
        s.step();
        s.world_mut().spawner = Spawner::off();
        let i = s
            .world()
            .entities
            .iter()
            .position(|m| m.condition == Condition::Warning)
            .expect("first tick raises a warning");
        (s, i)
    }

    #[test]
    fn test_layout_fits_the_surface() {
        let size = module_size();
        assert_eq!(size.x, 162.5);
        assert!((size.y - 203.333).abs() < 1e-2);
        let (s, _) = one_warning(1);
        assert_eq!(s.world().entities.len(), 6);
        let last = s.world().entities[5].pos + size / 2.0;
        assert!(last.x <= LOGICAL_WIDTH && last.y <= LOGICAL_HEIGHT);
    }

    #[test]
    fn test_first_failure_is_immediate() {
        let (mut s, synth) = playing(MonitorPanic::default(), 2);
        s.step();
        assert_eq!(s.world().count_condition(Condition::Warning), 1);
        assert_eq!(synth.play_count(), 1);
    }

    #[test]
    fn test_warning_turns_critical_after_three_seconds() {
        let (mut s, i) = one_warning(3);
        steps(&mut s, 170);
        assert_eq!(s.world().entities[i].condition, Condition::Warning);
        steps(&mut s, 20);
        assert_eq!(s.world().entities[i].condition, Condition::Broken);
        assert!(s.world().shake.magnitude() > 0.0);
    }

    #[test]
    fn test_panic_rises_while_failing() {
        let (mut s, _) = one_warning(4);
        let before = panic_level(s.world());
        steps(&mut s, 10);
        let after = panic_level(s.world());
        assert!((after - before - 10.0 * WARNING_PANIC).abs() < 1e-3);
    }

    #[test]
    fn test_repair_relieves_panic_and_speeds_failures() {
        let (mut s, i) = one_warning(5);
        steps(&mut s, 400);
        let panic = panic_level(s.world());
        let at = s.world().entities[i].pos;
        tap(&mut s, at.x, at.y);
        s.step();

        let w = s.world();
        assert_eq!(w.entities[i].condition, Condition::Working);
        assert_eq!(w.score, 1);
        // Relief lands before the cooldown tick
        assert!((panic_level(w) - (panic - REPAIR_RELIEF - COOLDOWN)).abs() < 1e-3);
        assert_eq!(w.difficulty.interval.value(), 1950.0);
    }

    #[test]
    fn test_full_panic_ends_the_run() {
        let (mut s, _) = one_warning(6);
        s.world_mut().health = 0.01;
        s.step();
        assert_eq!(s.world().phase(), Phase::GameOver);
        assert!(s.world().shake.magnitude() >= 30.0);
    }

    #[test]
    fn test_tapping_a_calm_sector_does_nothing() {
        let (mut s, i) = one_warning(7);
        let calm = (i + 1) % 6;
        let at = s.world().entities[calm].pos;
        tap(&mut s, at.x, at.y);
        s.step();
        assert_eq!(s.world().score, 0);
    }
}
