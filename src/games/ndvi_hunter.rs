//! NDVI Sky Hunter: map pest outbreaks from the air
//!
//! Pests scrolling under the drone's scanner are mapped over about half a
//! second, scoring a hectare and restoring crop health. Pests that slip past
//! unmapped hurt the crop, and flying into a tree ends the flight.

use glam::Vec2;
use rand::Rng;

use super::GameId;
use crate::audio::SoundParams;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::renderer::{Color, Hud, RenderSurface, TextAlign, shapes};
use crate::sim::{
    Actor, Burst, Cadence, Difficulty, Game, InputMode, ParticleKind, Penalty, Ramp, Setup, Shape, Spawner, Status,
    Step, World, circles_overlap,
};
use crate::zzfx;

const SND_SCAN_COMPLETE: SoundParams = zzfx![1.2, _, 556, 0.01, 0.16, 0.15, 1, 1.43, 1.4, _, _, _, _, 0.06, _, 0.1, _, 0.67, 0.08];
const SND_SCANNING: SoundParams = zzfx![0.3, _, 236, 0.02, 0.02, 0.07, 3, 1.6, -7.6, _, _, 0.06, _, _, _, 0.1, 0.53, 0.07];
const SND_CRASH: SoundParams = zzfx![1.9, _, 277, 0.03, 0.23, 0.51, 4, 2.95, _, 0.2, _, _, _, _, 1.6, _, 0.3, 0.12, 0.69];
const SND_WARNING: SoundParams = zzfx![0.8, _, 385, 0.03, 0.28, 0.36, 1, 1.57, _, _, _, _, _, 0.1, _, 0.1, _, 0.63, 0.06];

const DRONE_Y: f32 = LOGICAL_HEIGHT - 150.0;
const DRONE_SIZE: f32 = 40.0;
/// Drone body radius used against trees
const DRONE_RADIUS: f32 = 20.0;
/// Scanner footprint: rows from 150 px ahead to 50 px behind, 40 px either side
const SCAN_AHEAD: f32 = 150.0;
const SCAN_BEHIND: f32 = 50.0;
const SCAN_HALF_WIDTH: f32 = 40.0;
const SCAN_RATE: f32 = 0.03;
const MISSED_PEST_DAMAGE: f32 = 15.0;
const MAPPED_PEST_HEAL: f32 = 2.0;
const TREE_CHANCE: f32 = 0.3;
const HEALED: Color = Color::from_hex(0x00E676);
const SCANNER: Color = Color::from_hex(0x00E5FF);
const MAPPED_BURST: Burst = Burst::new(ParticleKind::Data, 8, 0x00E676);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Pest,
    Tree,
}

impl Kind {
    fn radius(self) -> f32 {
        match self {
            Kind::Pest => 35.0,
            Kind::Tree => 40.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NdviHunter {
    /// Something is under the scanner this tick
    scanning: bool,
}

fn in_scanner(drone: Vec2, p: Vec2) -> bool {
    p.y > drone.y - SCAN_AHEAD && p.y < drone.y + SCAN_BEHIND && (p.x - drone.x).abs() < SCAN_HALF_WIDTH
}

impl Game for NdviHunter {
    type Kind = Kind;

    fn id(&self) -> GameId {
        GameId::NdviHunter
    }

    fn setup(&self) -> Setup {
        let actor = Actor::new(Vec2::new(LOGICAL_WIDTH / 2.0, DRONE_Y), Shape::circle(DRONE_RADIUS))
            .with_ease(0.15)
            .horizontal();
        Setup::new(actor, InputMode::Follow)
            .spawner(Spawner::timed())
            .difficulty(Difficulty::new(
                Ramp::fixed(2000.0),
                // Scroll speed
                Ramp::new(4.0, Step::Add(0.5), Cadence::Elapsed { every_ms: 15_000.0 }),
            ))
    }

    fn step_actor(&mut self, world: &mut World<Kind>) {
        world.actor.ease_toward_target();
        // Eased 15% per tick: tilt is a twentieth of the remaining distance
        world.actor.tilt_from_velocity(-1.0 / 3.0, 0.5);
    }

    fn scroll_speed(&self, world: &World<Kind>) -> f32 {
        world.difficulty.intensity.value()
    }

    fn spawn_interval(&self, world: &World<Kind>) -> f32 {
        (2000.0 - world.difficulty.intensity.value() * 100.0).max(800.0)
    }

    fn spawn(&mut self, world: &mut World<Kind>) {
        let kind = if world.rng.random::<f32>() < TREE_CHANCE { Kind::Tree } else { Kind::Pest };
        let x = world.rng.random::<f32>() * (LOGICAL_WIDTH - 100.0) + 50.0;
        world.spawn_entity(kind, Vec2::new(x, -100.0), Shape::circle(kind.radius()));
    }

    fn step_entities(&mut self, world: &mut World<Kind>) {
        let speed = world.difficulty.intensity.value();
        let mut missed = 0;
        for e in &mut world.entities {
            e.pos.y += speed;
            if e.pos.y > LOGICAL_HEIGHT + 50.0 {
                if e.kind == Kind::Pest && e.is_active() {
                    missed += 1;
                }
                e.remove();
            }
        }
        for _ in 0..missed {
            world.penalize(Penalty::Health(MISSED_PEST_DAMAGE), 5.0, Some(SND_WARNING));
        }
    }

    fn collide(&mut self, world: &mut World<Kind>) {
        let drone = world.actor.pos;
        self.scanning = false;

        for i in 0..world.entities.len() {
            let e = &mut world.entities[i];
            if e.status() == Status::Removed {
                continue;
            }
            match e.kind {
                Kind::Tree => {
                    if circles_overlap(e.pos, e.kind.radius(), drone, DRONE_RADIUS) {
                        world.crash();
                    }
                }
                Kind::Pest => {
                    if !in_scanner(drone, e.pos) {
                        continue;
                    }
                    self.scanning = true;
                    if !e.is_active() {
                        continue;
                    }
                    e.progress += SCAN_RATE;
                    if e.progress >= 1.0 {
                        e.progress = 1.0;
                        world.award(i, 1, Some(MAPPED_BURST), Some(SND_SCAN_COMPLETE));
                        world.heal(MAPPED_PEST_HEAL);
                    } else if world.rng.random::<f32>() > 0.8 {
                        world.play(SND_SCANNING);
                    }
                }
            }
        }
    }

    fn on_game_over(&mut self, world: &mut World<Kind>) {
        world.shake.kick(30.0);
        world.play(SND_CRASH);
    }

    fn hud(&self, world: &World<Kind>) -> Hud {
        Hud::score(format!("HECTARES: {}", world.score)).with_meter(
            format!("SAÚDE: {}%", world.health.floor()),
            world.health / 100.0,
            world.health < 30.0,
        )
    }

    fn render(&self, world: &World<Kind>, surface: &mut dyn RenderSurface) {
        for i in 0..(LOGICAL_WIDTH / 40.0) as u32 {
            let color = if i % 2 == 0 { Color::from_hex(0x1B5E20) } else { Color::from_hex(0x2E7D32) };
            surface.fill_rect(Vec2::new(i as f32 * 40.0, 0.0), Vec2::new(40.0, LOGICAL_HEIGHT), color);
        }
        let grid = Color::rgba(255, 255, 255, 0.15);
        for i in 0..=(LOGICAL_WIDTH / 80.0) as u32 {
            let x = i as f32 * 80.0;
            surface.stroke_polyline(&[Vec2::new(x, 0.0), Vec2::new(x, LOGICAL_HEIGHT)], 1.0, grid, false);
        }
        let mut y = world.distance.rem_euclid(80.0) - 80.0;
        while y < LOGICAL_HEIGHT {
            surface.stroke_polyline(&[Vec2::new(0.0, y), Vec2::new(LOGICAL_WIDTH, y)], 1.0, grid, false);
            y += 80.0;
        }

        for e in &world.entities {
            let r = e.kind.radius();
            match e.kind {
                Kind::Tree => shapes::tree(surface, e.pos, r),
                Kind::Pest => {
                    let mapped = !e.is_active();
                    let color = if mapped { HEALED } else { Color::from_hex(0xFF3D00) };
                    surface.fill_circle(e.pos, r, color.with_alpha(0.35));
                    surface.stroke_circle(e.pos, r, 2.0, color);
                    if !mapped && e.progress > 0.0 {
                        shapes::bar(surface, e.pos - Vec2::new(r, r + 12.0), Vec2::new(r * 2.0, 6.0), e.progress, SCANNER);
                    }
                }
            }
        }

        let drone = world.actor.pos;
        if self.scanning {
            let beam = [
                drone,
                drone + Vec2::new(SCAN_HALF_WIDTH, -SCAN_AHEAD),
                drone + Vec2::new(-SCAN_HALF_WIDTH, -SCAN_AHEAD),
            ];
            surface.fill_polygon(&beam, SCANNER.with_alpha(0.2));
        }
        shapes::drone(surface, drone, DRONE_SIZE, world.actor.tilt, world.time_ticks as f32 * 0.5, Color::from_hex(0x263238));
        surface.text(
            "NDVI MODE: ACTIVE",
            Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT - 30.0),
            12.0,
            TextAlign::Center,
            SCANNER,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{playing, steps};
    use crate::sim::{Phase, Session};

    fn calm(seed: u64) -> (Session<NdviHunter>, crate::audio::RecordingSynth) {
        let (mut s, synth) = playing(NdviHunter::default(), seed);
        s.world_mut().spawner = Spawner::off();
        (s, synth)
    }

    fn place(s: &mut Session<NdviHunter>, kind: Kind, pos: Vec2) {
        s.world_mut().spawn_entity(kind, pos, Shape::circle(kind.radius()));
    }

    #[test]
    fn test_scanning_maps_a_pest() {
        let (mut s, _) = calm(1);
        s.world_mut().health = 90.0;
        place(&mut s, Kind::Pest, Vec2::new(210.0, 510.0));
        steps(&mut s, 20);
        assert!(s.game().scanning);
        assert!(s.world().entities[0].is_active());
        steps(&mut s, 20);
        let w = s.world();
        assert_eq!(w.entities[0].status(), Status::Resolved);
        assert_eq!(w.score, 1);
        assert_eq!(w.health, 92.0);
    }

    #[test]
    fn test_pest_outside_the_beam_is_not_scanned() {
        let (mut s, _) = calm(2);
        place(&mut s, Kind::Pest, Vec2::new(300.0, 510.0));
        steps(&mut s, 40);
        assert_eq!(s.world().entities[0].progress, 0.0);
        assert!(!s.game().scanning);
    }

    #[test]
    fn test_missed_pest_hurts_the_crop() {
        let (mut s, synth) = calm(3);
        place(&mut s, Kind::Pest, Vec2::new(20.0, LOGICAL_HEIGHT + 48.0));
        s.step();
        assert_eq!(s.world().health, 85.0);
        assert!(s.world().entities.is_empty());
        assert_eq!(synth.play_count(), 1);
    }

    #[test]
    fn test_crop_failure_ends_the_flight() {
        let (mut s, _) = calm(4);
        s.world_mut().health = 10.0;
        place(&mut s, Kind::Pest, Vec2::new(20.0, LOGICAL_HEIGHT + 48.0));
        s.step();
        assert_eq!(s.world().phase(), Phase::GameOver);
    }

    #[test]
    fn test_tree_strike_crashes() {
        let (mut s, synth) = calm(5);
        place(&mut s, Kind::Tree, Vec2::new(230.0, DRONE_Y - 40.0));
        s.step();
        assert_eq!(s.world().phase(), Phase::GameOver);
        assert_eq!(synth.play_count(), 1);
        assert!(s.world().shake.magnitude() > 20.0);
    }

    #[test]
    fn test_tree_reach_is_body_plus_crown() {
        let speed = NdviHunter::default().scroll_speed(calm(7).0.world());
        for (dx, crashed) in [(61.0, false), (59.0, true)] {
            let (mut s, _) = calm(7);
            let drone = s.world().actor.pos;
            place(&mut s, Kind::Tree, drone + Vec2::new(dx, -speed));
            s.step();
            assert_eq!(s.world().phase() == Phase::GameOver, crashed, "tree {dx} px away");
        }
    }

    #[test]
    fn test_spawns_quicken_with_speed() {
        let (s, _) = calm(6);
        let game = s.game().clone();
        assert_eq!(game.spawn_interval(s.world()), 1600.0);
        let mut w = s.world().clone();
        w.difficulty.advance(15_000.0 * 20.0);
        assert_eq!(game.spawn_interval(&w), 800.0);
    }

    #[test]
    fn test_drone_banks_into_turns() {
        let (mut s, _) = calm(7);
        s.world_mut().actor.aim(Vec2::new(380.0, 0.0));
        s.step();
        assert!(s.world().actor.tilt < 0.0);
        assert_eq!(s.world().actor.pos.y, DRONE_Y);
    }
}
