//! Game strategy seam
//!
//! The engine owns the loop, lifecycle, spawner cadence and particles; a
//! [`Game`] only supplies its rules. Each mini-game is a small `Game` impl.

use std::fmt::Debug;

use super::difficulty::Difficulty;
use super::input::{Gesture, InputMode};
use super::spawner::{Progress, Spawner};
use super::state::{Actor, World};
use crate::consts::{DEFAULT_LIVES, FULL_HEALTH, TICK_MS};
use crate::games::GameId;
use crate::renderer::{Hud, RenderSurface};

/// Initial configuration a game hands to a fresh session
#[derive(Debug, Clone)]
pub struct Setup {
    pub actor: Actor,
    pub input: InputMode,
    pub lives: u32,
    pub health: f32,
    pub spawner: Spawner,
    pub difficulty: Difficulty,
    /// Preview before play starts (and between levels)
    pub countdown_ms: Option<f64>,
}

impl Setup {
    pub fn new(actor: Actor, input: InputMode) -> Self {
        Self {
            actor,
            input,
            lives: DEFAULT_LIVES,
            health: FULL_HEALTH,
            spawner: Spawner::off(),
            difficulty: Difficulty::default(),
            countdown_ms: None,
        }
    }

    pub fn spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self
    }

    pub fn countdown(mut self, ms: f64) -> Self {
        self.countdown_ms = Some(ms);
        self
    }
}

/// A mini-game's rules.
///
/// `Clone` is how restart works: the session keeps a pristine copy and clones
/// it, so any per-run state a game keeps in `self` starts fresh.
pub trait Game: Clone {
    /// Entity category tag
    type Kind: Copy + Debug + PartialEq;

    fn id(&self) -> GameId;

    fn setup(&self) -> Setup;

    /// Called once when play begins (after the menu tap)
    fn on_start(&mut self, _world: &mut World<Self::Kind>) {}

    /// Queued input for this tick
    fn on_gesture(&mut self, _world: &mut World<Self::Kind>, _gesture: Gesture) {}

    /// Actor physics
    fn step_actor(&mut self, world: &mut World<Self::Kind>) {
        world.actor.ease_toward_target();
    }

    /// Distance scrolled this tick
    fn scroll_speed(&self, _world: &World<Self::Kind>) -> f32 {
        0.0
    }

    /// Current spawn interval in the spawner's progress units
    fn spawn_interval(&self, world: &World<Self::Kind>) -> f32 {
        world.difficulty.interval.value()
    }

    /// Spawn rule: create one entity (or a group)
    fn spawn(&mut self, _world: &mut World<Self::Kind>) {}

    /// Entity motion and timers
    fn step_entities(&mut self, world: &mut World<Self::Kind>) {
        for e in &mut world.entities {
            e.integrate();
        }
    }

    /// Collision rule: resolve hits, award and penalize
    fn collide(&mut self, _world: &mut World<Self::Kind>) {}

    /// Runs every tick while the level-complete animation plays
    fn step_success(&mut self, _world: &mut World<Self::Kind>) {}

    /// The level-complete animation finished; set up the next level
    fn on_success_end(&mut self, world: &mut World<Self::Kind>) {
        world.lifecycle.resume_playing();
    }

    /// Extra loss condition beyond lives/health/crash
    fn is_lost(&self, _world: &World<Self::Kind>) -> bool {
        false
    }

    /// The run just ended
    fn on_game_over(&mut self, _world: &mut World<Self::Kind>) {}

    /// Top bar contents
    fn hud(&self, world: &World<Self::Kind>) -> Hud {
        Hud::score(world.score.to_string()).with_lives(world.lives)
    }

    /// Render hook: draw the playfield (the session draws HUD and overlays)
    fn render(&self, world: &World<Self::Kind>, surface: &mut dyn RenderSurface);
}

/// Spawner progress for this tick
pub(crate) fn spawn_progress<G: Game>(game: &G, world: &World<G::Kind>) -> f32 {
    match world.spawner.progress {
        Progress::Time => TICK_MS as f32,
        Progress::Distance => game.scroll_speed(world),
    }
}
