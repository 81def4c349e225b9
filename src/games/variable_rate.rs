//! Variable Rate Master: match the sprayer dose to a prescription map
//!
//! The field scrolls under the sprayer as a column of dose zones. Every tick
//! spent in a zone with the matching dose scores a point and restores a
//! little efficiency; a wrong dose burns the crop and drains it. The run ends
//! when efficiency reaches zero.

use glam::Vec2;
use rand::Rng;

use super::GameId;
use crate::audio::{SoundParams, Tone};
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::renderer::{Color, Hud, RenderSurface, TextAlign, shapes};
use crate::sim::{
    Aabb, Actor, Burst, Cadence, Difficulty, Entity, Game, Gesture, InputMode, ParticleKind, Penalty, Ramp, Setup,
    Shape, Spawner, Step, World,
};
use crate::zzfx;

const SND_CLICK_SWITCH: SoundParams = zzfx![1.1, _, 150, 0.01, 0.01, 0.05, _, 1.1, -5.6, _, _, _, _, 0.1, _, 0.1, _, 0.53, 0.07];
const SND_ERROR: SoundParams = zzfx![0.9, _, 133, 0.03, 0.33, 0.53, 4, 2.5, -0.6, 0.2, _, _, _, _, 1.3, _, 0.2, 0.16, 0.71];
const ENGINE: Tone = Tone::engine(60.0, 0.05);

const TRACTOR_Y: f32 = LOGICAL_HEIGHT - 250.0;
const BOOM_WIDTH: f32 = LOGICAL_WIDTH * 0.85;
/// New zones are laid once the top of the map scrolls below this
const MAP_LEAD: f32 = -100.0;
const EFFICIENCY_GAIN: f32 = 0.02;
const EFFICIENCY_LOSS: f32 = 0.2;
const MAX_FLOATING_TEXTS: usize = 2;
const BUTTON_TOP: f32 = LOGICAL_HEIGHT - 90.0;
const BUTTON_HEIGHT: f32 = 70.0;
const BUTTON_GAP: f32 = 10.0;

/// Application rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dose {
    #[default]
    Low,
    Med,
    High,
}

impl Dose {
    pub const ALL: [Dose; 3] = [Dose::Low, Dose::Med, Dose::High];

    pub fn label(self) -> &'static str {
        match self {
            Dose::Low => "BAIXA",
            Dose::Med => "MÉDIA",
            Dose::High => "ALTA",
        }
    }

    /// Heatmap tint
    fn color(self) -> Color {
        match self {
            Dose::Low => Color::rgba(255, 235, 59, 0.3),
            Dose::Med => Color::rgba(255, 152, 0, 0.3),
            Dose::High => Color::rgba(244, 67, 54, 0.3),
        }
    }

    /// Mist particles per tick
    fn density(self) -> usize {
        match self {
            Dose::Low => 1,
            Dose::Med => 3,
            Dose::High => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Prescription map zone
    Zone(Dose),
    /// Sprayed strip behind the boom
    Trail { burnt: bool },
}

#[derive(Debug, Clone)]
struct FloatingText {
    pos: Vec2,
    life: f32,
}

#[derive(Debug, Clone, Default)]
pub struct VariableRate {
    dose: Dose,
    /// Scroll distance until the next zone is due
    next_gap: f32,
    texts: Vec<FloatingText>,
}

/// Top and bottom edges of a full-width strip
fn span<K>(e: &Entity<K>) -> (f32, f32) {
    let half = match e.shape {
        Shape::Rect { half } => half.y,
        Shape::Circle { radius } => radius,
    };
    (e.pos.y - half, e.pos.y + half)
}

fn strip(top: f32, height: f32) -> (Vec2, Shape) {
    (Vec2::new(LOGICAL_WIDTH / 2.0, top + height / 2.0), Shape::rect(LOGICAL_WIDTH, height))
}

fn button(i: usize) -> Aabb {
    let width = (LOGICAL_WIDTH - BUTTON_GAP * 4.0) / 3.0;
    Aabb::from_corner(
        Vec2::new(BUTTON_GAP + i as f32 * (width + BUTTON_GAP), BUTTON_TOP),
        Vec2::new(width, BUTTON_HEIGHT),
    )
}

impl VariableRate {
    pub fn dose(&self) -> Dose {
        self.dose
    }

    /// Zones shrink as the run goes on
    fn zone_height(world: &mut World<Kind>) -> f32 {
        let shrink = world.distance * 0.01;
        let min = (350.0 - shrink).max(150.0);
        let max = (600.0 - shrink).max(250.0);
        world.rng.random::<f32>() * (max - min) + min
    }

    fn lay_zone(world: &mut World<Kind>, top: f32, height: f32) {
        let dose = Dose::ALL[world.spawner.pick(&[1.0; 3], &mut world.rng)];
        let (pos, shape) = strip(top, height);
        world.spawn_entity(Kind::Zone(dose), pos, shape);
    }

    fn map_top(world: &World<Kind>) -> f32 {
        world
            .entities
            .iter()
            .filter(|e| matches!(e.kind, Kind::Zone(_)))
            .map(|e| span(e).0)
            .fold(f32::INFINITY, f32::min)
    }

    fn zone_under_boom(world: &World<Kind>) -> Option<Dose> {
        world.entities.iter().find_map(|e| {
            let Kind::Zone(dose) = e.kind else {
                return None;
            };
            let (top, bottom) = span(e);
            (top <= TRACTOR_Y && bottom > TRACTOR_Y).then_some(dose)
        })
    }
}

impl Game for VariableRate {
    type Kind = Kind;

    fn id(&self) -> GameId {
        GameId::VariableRate
    }

    fn setup(&self) -> Setup {
        Setup::new(Actor::new(Vec2::new(LOGICAL_WIDTH / 2.0, TRACTOR_Y), Shape::rect(60.0, 80.0)), InputMode::Tap)
            .spawner(Spawner::by_distance())
            .difficulty(Difficulty::new(
                Ramp::fixed(LOGICAL_HEIGHT),
                // Scroll speed
                Ramp::new(5.0, Step::Add(0.3), Cadence::Elapsed { every_ms: 8000.0 }),
            ))
    }

    fn on_start(&mut self, world: &mut World<Kind>) {
        // Map from one screen above down past the bottom edge
        let mut top = -LOGICAL_HEIGHT;
        while top < LOGICAL_HEIGHT {
            let height = Self::zone_height(world);
            Self::lay_zone(world, top, height);
            top += height;
        }
        self.next_gap = MAP_LEAD + LOGICAL_HEIGHT;
        world.start_tone(ENGINE);
    }

    fn on_gesture(&mut self, world: &mut World<Kind>, gesture: Gesture) {
        let Gesture::Press(p) = gesture else {
            return;
        };
        let Some(dose) = (0..3).find(|&i| button(i).contains(p)).map(|i| Dose::ALL[i]) else {
            return;
        };
        if dose != self.dose {
            log::debug!("dose {:?} -> {dose:?}", self.dose);
        }
        self.dose = dose;
        world.play(SND_CLICK_SWITCH);
    }

    fn step_actor(&mut self, _world: &mut World<Kind>) {}

    fn scroll_speed(&self, world: &World<Kind>) -> f32 {
        world.difficulty.intensity.value()
    }

    fn spawn_interval(&self, _world: &World<Kind>) -> f32 {
        self.next_gap
    }

    /// Extend the map above its current top
    fn spawn(&mut self, world: &mut World<Kind>) {
        let height = Self::zone_height(world);
        let top = Self::map_top(world) - height;
        Self::lay_zone(world, top, height);
        self.next_gap = MAP_LEAD - top;
    }

    fn step_entities(&mut self, world: &mut World<Kind>) {
        let speed = world.difficulty.intensity.value();
        for e in &mut world.entities {
            e.pos.y += speed;
            if span(e).0 > LOGICAL_HEIGHT {
                e.remove();
            }
        }

        for t in &mut self.texts {
            t.pos.y -= 1.0;
            t.life -= 0.02;
        }
        self.texts.retain(|t| t.life > 0.0);

        let left = (LOGICAL_WIDTH - BOOM_WIDTH) / 2.0;
        for _ in 0..self.dose.density() {
            let x = left + world.rng.random::<f32>() * BOOM_WIDTH;
            world.emit(Vec2::new(x, TRACTOR_Y + 15.0), Burst::new(ParticleKind::Mist, 1, 0xE0F7FA));
        }
    }

    fn collide(&mut self, world: &mut World<Kind>) {
        let mut burnt = false;
        if let Some(zone) = Self::zone_under_boom(world) {
            if zone == self.dose {
                world.credit(1);
                world.heal(EFFICIENCY_GAIN);
            } else {
                burnt = true;
                world.penalize(Penalty::Health(EFFICIENCY_LOSS), 2.0, None);
                if world.rng.random::<f32>() > 0.95 && self.texts.len() < MAX_FLOATING_TEXTS {
                    let x = LOGICAL_WIDTH / 2.0 + (world.rng.random::<f32>() - 0.5) * 100.0;
                    self.texts.push(FloatingText {
                        pos: Vec2::new(x, TRACTOR_Y - 50.0),
                        life: 1.0,
                    });
                    world.play(SND_ERROR);
                }
            }
        }

        let speed = world.difficulty.intensity.value();
        let (pos, shape) = strip(TRACTOR_Y, speed);
        world.spawn_entity(Kind::Trail { burnt }, pos, shape);
    }

    fn on_game_over(&mut self, world: &mut World<Kind>) {
        world.stop_tone();
    }

    fn hud(&self, world: &World<Kind>) -> Hud {
        let efficiency = world.health;
        Hud::score(world.score.to_string()).with_meter(
            format!("EFICIÊNCIA: {}%", efficiency.floor()),
            efficiency / 100.0,
            efficiency < 30.0,
        )
    }

    fn render(&self, world: &World<Kind>, surface: &mut dyn RenderSurface) {
        shapes::field_rows(surface, world.distance, 40.0, Color::from_hex(0x2E7D32), Color::from_hex(0x1B5E20));

        for e in &world.entities {
            let (top, bottom) = span(e);
            let color = match e.kind {
                Kind::Zone(dose) => dose.color(),
                Kind::Trail { burnt: false } => Color::rgba(0, 30, 0, 0.4),
                Kind::Trail { burnt: true } => Color::rgba(62, 39, 35, 0.6),
            };
            surface.fill_rect(Vec2::new(0.0, top), Vec2::new(LOGICAL_WIDTH, bottom - top), color);
        }

        // Sprayer and boom
        let left = (LOGICAL_WIDTH - BOOM_WIDTH) / 2.0;
        surface.fill_rect(Vec2::new(left, TRACTOR_Y + 8.0), Vec2::new(BOOM_WIDTH, 6.0), Color::from_hex(0x212121));
        shapes::tractor(surface, world.actor.pos - Vec2::new(0.0, 40.0), Vec2::new(60.0, 80.0), 0.0, Color::from_hex(0x2E7D32));

        for t in &self.texts {
            surface.text("ERRO DE DOSE!", t.pos, 18.0, TextAlign::Center, Color::from_hex(0xFF1744).with_alpha(t.life));
        }

        for (i, dose) in Dose::ALL.into_iter().enumerate() {
            let b = button(i);
            let selected = dose == self.dose;
            let fill = if selected { dose.color().with_alpha(0.9) } else { Color::rgba(0, 0, 0, 0.6) };
            surface.fill_rect(b.min, b.size(), fill);
            surface.stroke_rect(b.min, b.size(), if selected { 3.0 } else { 1.0 }, Color::WHITE);
            surface.text(dose.label(), b.center(), 16.0, TextAlign::Center, Color::WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCommand;
    use crate::games::testing::{playing, steps, tap};
    use crate::sim::{Phase, Session};

    fn zones(s: &Session<VariableRate>) -> Vec<(f32, f32)> {
        let mut spans: Vec<_> = s
            .world()
            .entities
            .iter()
            .filter(|e| matches!(e.kind, Kind::Zone(_)))
            .map(span)
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        spans
    }

    fn paint(s: &mut Session<VariableRate>, dose: Dose) {
        for e in &mut s.world_mut().entities {
            if matches!(e.kind, Kind::Zone(_)) {
                e.kind = Kind::Zone(dose);
            }
        }
    }

    fn assert_covered(spans: &[(f32, f32)]) {
        assert!(spans[0].0 <= 0.0, "map top {} on screen", spans[0].0);
        assert!(spans[spans.len() - 1].1 >= LOGICAL_HEIGHT);
        for pair in spans.windows(2) {
            assert!((pair[0].1 - pair[1].0).abs() < 0.5, "gap between {pair:?}");
        }
    }

    #[test]
    fn test_initial_map_is_contiguous() {
        let (s, synth) = playing(VariableRate::default(), 1);
        let spans = zones(&s);
        assert_eq!(spans[0].0, -LOGICAL_HEIGHT);
        assert_covered(&spans);
        assert!(spans.iter().all(|(t, b)| b - t >= 150.0 && b - t <= 600.0));
        assert_eq!(synth.commands(), vec![AudioCommand::StartTone(ENGINE)]);
    }

    #[test]
    fn test_matching_dose_scores_every_tick() {
        let (mut s, _) = playing(VariableRate::default(), 2);
        paint(&mut s, Dose::Low);
        steps(&mut s, 10);
        assert_eq!(s.world().score, 10);
        assert_eq!(s.world().health, 100.0);
        assert!(s.world().entities.iter().all(|e| e.kind != Kind::Trail { burnt: true }));
    }

    #[test]
    fn test_wrong_dose_burns_efficiency() {
        let (mut s, _) = playing(VariableRate::default(), 3);
        paint(&mut s, Dose::High);
        steps(&mut s, 10);
        assert_eq!(s.world().score, 0);
        assert!((s.world().health - 98.0).abs() < 1e-3);
        assert!(s.world().shake.magnitude() > 0.0);
        assert!(s.world().entities.iter().any(|e| e.kind == Kind::Trail { burnt: true }));
    }

    #[test]
    fn test_dose_buttons() {
        let (mut s, synth) = playing(VariableRate::default(), 4);
        paint(&mut s, Dose::High);
        let at = button(2).center();
        tap(&mut s, at.x, at.y);
        s.step();
        assert_eq!(s.game().dose(), Dose::High);
        assert_eq!(s.world().score, 1);
        assert_eq!(synth.play_count(), 1);

        // Taps on the field are not buttons
        tap(&mut s, 200.0, 300.0);
        s.step();
        assert_eq!(s.game().dose(), Dose::High);
    }

    #[test]
    fn test_map_stays_covered_while_scrolling() {
        let (mut s, _) = playing(VariableRate::default(), 5);
        s.world_mut().health = 1.0e9;
        for _ in 0..30 {
            steps(&mut s, 100);
            assert_covered(&zones(&s));
        }
        assert!(s.game().scroll_speed(s.world()) > 5.0);
    }

    #[test]
    fn test_efficiency_out_stops_the_engine() {
        let (mut s, synth) = playing(VariableRate::default(), 6);
        paint(&mut s, Dose::High);
        s.world_mut().health = 0.1;
        s.step();
        assert_eq!(s.world().phase(), Phase::GameOver);
        assert_eq!(synth.commands().last(), Some(&AudioCommand::StopTone));
    }
}
