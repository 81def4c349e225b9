//! A running mini-game: game strategy + world + clock + synth
//!
//! The session is what the platform layer drives. It owns everything with a
//! lifetime (the audio synth included) and rebuilds the whole world on
//! restart instead of resetting fields.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::SimClock;
use super::game::Game;
use super::input::{Gesture, InputMode, Pointer, PointerKind, SurfaceRect};
use super::lifecycle::Phase;
use super::particles::{DEFAULT_CAPACITY, ParticleSystem};
use super::shake::ScreenShake;
use super::state::World;
use super::tick::tick;
use crate::Settings;
use crate::audio::Synth;
use crate::branding::Branding;
use crate::games::GameId;
use crate::renderer::hud::{self, OverlayState};
use crate::renderer::{RenderSurface, shapes};

/// Per-player tuning that outlives restarts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub particle_cap: usize,
    /// Multiplier for shake kicks (0 disables)
    pub shake_scale: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            particle_cap: DEFAULT_CAPACITY,
            shake_scale: 1.0,
        }
    }
}

impl SessionOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            particle_cap: settings.max_particles(),
            shake_scale: settings.effective_shake_scale(),
        }
    }
}

/// Object-safe handle the platform layer drives, whatever the game
pub trait Playable {
    fn id(&self) -> GameId;
    fn phase(&self) -> Phase;
    fn score(&self) -> u64;

    /// Run the ticks owed at `now_ms`, then render once; returns ticks run
    fn frame(&mut self, now_ms: f64, surface: &mut dyn RenderSurface) -> u32;

    /// Route a pointer event given the surface's current bounding rect
    fn pointer(&mut self, pointer: Pointer, rect: &SurfaceRect);

    /// Fresh session back at the menu
    fn restart(&mut self);

    /// Best score shown on the menu and game-over screens
    fn set_best(&mut self, best: u64);

    fn set_branding(&mut self, branding: Branding);

    /// Stop audio; further frames and pointer events do nothing
    fn teardown(&mut self);

    fn is_torn_down(&self) -> bool;
}

pub struct Session<G: Game> {
    /// Pristine strategy, cloned on restart
    template: G,
    game: G,
    world: World<G::Kind>,
    input: InputMode,
    countdown_ms: Option<f64>,
    clock: SimClock,
    synth: Box<dyn Synth>,
    options: SessionOptions,
    branding: Branding,
    best: u64,
    /// Cosmetic randomness (shake offsets) kept out of the simulation stream
    fx_rng: Pcg32,
    torn_down: bool,
}

impl<G: Game> Session<G> {
    pub fn new(game: G, seed: u64, synth: Box<dyn Synth>) -> Self {
        Self::with_options(game, seed, synth, SessionOptions::default())
    }

    pub fn with_options(game: G, seed: u64, synth: Box<dyn Synth>, options: SessionOptions) -> Self {
        let (world, input, countdown_ms) = build_world(&game, seed, options);
        log::info!("{}: session created (seed {seed})", game.id().as_str());
        Self {
            template: game.clone(),
            game,
            world,
            input,
            countdown_ms,
            clock: SimClock::new(),
            synth,
            options,
            branding: Branding::default(),
            best: 0,
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x5eed_f00d),
            torn_down: false,
        }
    }

    pub fn world(&self) -> &World<G::Kind> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<G::Kind> {
        &mut self.world
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn input_mode(&self) -> InputMode {
        self.input
    }

    /// Leave the menu; returns false outside the menu
    pub fn start(&mut self) -> bool {
        if !self.world.lifecycle.start(self.countdown_ms) {
            return false;
        }
        self.game.on_start(&mut self.world);
        log::info!(
            "{}: started ({})",
            self.game.id().as_str(),
            self.world.phase().as_str()
        );
        self.flush_audio();
        true
    }

    /// Replace game and world with fresh ones built from `seed`
    pub fn restart_with_seed(&mut self, seed: u64) {
        // A tone left running by the old world must not outlive it
        self.synth.stop_tone();
        self.game = self.template.clone();
        let (world, input, countdown_ms) = build_world(&self.game, seed, self.options);
        self.world = world;
        self.input = input;
        self.countdown_ms = countdown_ms;
        self.clock.reset();
        self.fx_rng = Pcg32::seed_from_u64(seed ^ 0x5eed_f00d);
        log::info!("{}: restarted (seed {seed})", self.game.id().as_str());
    }

    /// Run the ticks owed at `now_ms` and dispatch their audio
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if self.torn_down {
            return 0;
        }
        let ticks = self.clock.advance(now_ms);
        for _ in 0..ticks {
            tick(&mut self.game, &mut self.world);
        }
        self.flush_audio();
        ticks
    }

    /// Exactly one tick, bypassing the clock
    pub fn step(&mut self) {
        if self.torn_down {
            return;
        }
        tick(&mut self.game, &mut self.world);
        self.flush_audio();
    }

    pub fn render(&mut self, surface: &mut dyn RenderSurface) {
        surface.clear(self.branding.palette.background);

        let offset = self.world.shake.offset(&mut self.fx_rng);
        surface.save();
        surface.translate(offset);
        self.game.render(&self.world, surface);
        shapes::particles(surface, &self.world.particles);
        surface.restore();

        if self.world.phase() != Phase::Menu {
            hud::draw_hud(surface, &self.game.hud(&self.world), &self.branding);
        }
        let state = OverlayState {
            phase: self.world.phase(),
            score: self.world.score,
            best: self.best,
            remaining_ms: self.world.lifecycle.remaining_ms(),
        };
        hud::draw_overlay(surface, &state, &self.branding);
    }

    fn flush_audio(&mut self) {
        for command in self.world.take_audio() {
            self.synth.dispatch(command);
        }
    }
}

impl<G: Game> Playable for Session<G> {
    fn id(&self) -> GameId {
        self.game.id()
    }

    fn phase(&self) -> Phase {
        self.world.phase()
    }

    fn score(&self) -> u64 {
        self.world.score
    }

    fn frame(&mut self, now_ms: f64, surface: &mut dyn RenderSurface) -> u32 {
        if self.torn_down {
            return 0;
        }
        let ticks = self.advance(now_ms);
        self.render(surface);
        ticks
    }

    fn pointer(&mut self, pointer: Pointer, rect: &SurfaceRect) {
        if self.torn_down {
            return;
        }
        if pointer.kind == PointerKind::Down {
            self.synth.resume();
        }
        let pos = rect.to_logical(pointer.client_x, pointer.client_y);

        match (self.world.phase(), pointer.kind) {
            (Phase::Menu, PointerKind::Down) => {
                self.start();
            }
            (Phase::GameOver, PointerKind::Down) => {
                self.restart();
                self.start();
            }
            (Phase::Playing, kind) => match self.input {
                InputMode::Follow => {
                    if kind != PointerKind::Up {
                        self.world.actor.aim(pos);
                    }
                }
                mode => {
                    if let Some(gesture) = Gesture::from_pointer(mode, kind, pos) {
                        self.world.queue_gesture(gesture);
                    }
                }
            },
            _ => {}
        }
    }

    fn restart(&mut self) {
        let seed = self.world.rng.random::<u64>();
        self.restart_with_seed(seed);
    }

    fn set_best(&mut self, best: u64) {
        self.best = best;
    }

    fn set_branding(&mut self, branding: Branding) {
        self.branding = branding;
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.synth.stop_tone();
        self.world.take_audio();
        self.world.take_gestures();
        self.torn_down = true;
        log::info!("{}: session torn down", self.game.id().as_str());
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

fn build_world<G: Game>(game: &G, seed: u64, options: SessionOptions) -> (World<G::Kind>, InputMode, Option<f64>) {
    let setup = game.setup();
    let mut world = World::new(seed, setup.actor);
    world.lives = setup.lives;
    world.health = setup.health;
    world.spawner = setup.spawner;
    world.difficulty = setup.difficulty;
    world.particles = ParticleSystem::new(options.particle_cap);
    world.shake = ScreenShake::new(options.shake_scale);
    (world, setup.input, setup.countdown_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCommand, RecordingSynth, Tone};
    use crate::renderer::CommandRecorder;
    use crate::sim::{Actor, Penalty, Setup, Shape};
    use crate::zzfx;
    use glam::Vec2;

    /// One target falling straight onto the actor
    #[derive(Clone)]
    struct Faller;

    impl Game for Faller {
        type Kind = ();

        fn id(&self) -> GameId {
            GameId::WeedControl
        }

        fn setup(&self) -> Setup {
            Setup::new(Actor::new(Vec2::new(200.0, 700.0), Shape::circle(2.0)), InputMode::Tap)
        }

        fn on_start(&mut self, world: &mut World<()>) {
            world
                .spawn_entity((), Vec2::new(200.0, -40.0), Shape::circle(2.0))
                .vel = Vec2::new(0.0, 5.0);
        }

        fn collide(&mut self, world: &mut World<()>) {
            let actor = world.actor.pos;
            let shape = world.actor.shape;
            for i in 0..world.entities.len() {
                let e = &world.entities[i];
                if e.is_active() && e.shape.overlaps(e.pos, &shape, actor) {
                    world.award(i, 10, None, Some(zzfx![_, _, 880]));
                }
            }
        }

        fn render(&self, _world: &World<()>, _surface: &mut dyn RenderSurface) {}
    }

    /// Every tap is a miss; a tone runs while playing
    #[derive(Clone)]
    struct Misser;

    impl Game for Misser {
        type Kind = ();

        fn id(&self) -> GameId {
            GameId::FleetMonitor
        }

        fn setup(&self) -> Setup {
            Setup::new(Actor::new(Vec2::new(200.0, 400.0), Shape::circle(10.0)), InputMode::Tap)
        }

        fn on_start(&mut self, world: &mut World<()>) {
            world.start_tone(Tone::engine(60.0, 0.05));
        }

        fn on_gesture(&mut self, world: &mut World<()>, _gesture: Gesture) {
            world.penalize(Penalty::Life, 10.0, None);
        }

        fn on_game_over(&mut self, world: &mut World<()>) {
            world.stop_tone();
        }

        fn render(&self, _world: &World<()>, _surface: &mut dyn RenderSurface) {}
    }

    fn tap(session: &mut impl Playable) {
        session.pointer(Pointer::down(200.0, 400.0), &SurfaceRect::logical());
    }

    #[test]
    fn test_falling_target_scores_once_at_tick_148() {
        let synth = RecordingSynth::new();
        let mut s = Session::new(Faller, 1, Box::new(synth.clone()));
        assert!(s.start());
        for _ in 0..147 {
            s.step();
        }
        assert_eq!(s.world().score, 0);
        s.step();
        assert_eq!(s.world().score, 10);
        for _ in 0..60 {
            s.step();
        }
        assert_eq!(s.world().score, 10);
        assert_eq!(synth.play_count(), 1);
    }

    #[test]
    fn test_third_miss_ends_the_run() {
        let mut s = Session::new(Misser, 7, Box::new(RecordingSynth::new()));
        tap(&mut s);
        assert_eq!(s.phase(), Phase::Playing);

        for expected_lives in [2, 1] {
            tap(&mut s);
            s.step();
            assert_eq!(s.world().lives, expected_lives);
            assert_eq!(s.phase(), Phase::Playing);
        }
        tap(&mut s);
        s.step();
        assert_eq!(s.world().lives, 0);
        assert_eq!(s.phase(), Phase::GameOver);
    }

    #[test]
    fn test_restart_matches_fresh_session() {
        let mut played = Session::new(Faller, 3, Box::new(RecordingSynth::new()));
        played.start();
        for _ in 0..200 {
            played.step();
        }
        played.restart_with_seed(99);

        let mut fresh = Session::new(Faller, 99, Box::new(RecordingSynth::new()));
        assert_eq!(played.phase(), Phase::Menu);
        assert_eq!(played.world().score, fresh.world().score);
        assert_eq!(played.world().time_ticks, 0);
        assert_eq!(played.world().entities, fresh.world().entities);
        assert_eq!(played.world().actor, fresh.world().actor);

        played.start();
        fresh.start();
        for _ in 0..150 {
            played.step();
            fresh.step();
        }
        assert_eq!(played.world().score, fresh.world().score);
        assert_eq!(played.world().entities, fresh.world().entities);
        assert_eq!(played.world().rng, fresh.world().rng);
    }

    #[test]
    fn test_tap_on_game_over_restarts_and_plays() {
        let mut s = Session::new(Misser, 5, Box::new(RecordingSynth::new()));
        tap(&mut s);
        for _ in 0..3 {
            tap(&mut s);
            s.step();
        }
        assert_eq!(s.phase(), Phase::GameOver);
        tap(&mut s);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.world().lives, 3);
    }

    #[test]
    fn test_frame_renders_once_per_call() {
        let mut s = Session::new(Faller, 1, Box::new(RecordingSynth::new()));
        s.start();
        let mut rec = CommandRecorder::new();
        assert_eq!(s.frame(0.0, &mut rec), 0);
        let ticks = s.frame(100.0, &mut rec);
        assert_eq!(ticks, 6);
        // Stall: clamped to the catch-up limit
        let ticks = s.frame(5100.0, &mut rec);
        assert_eq!(ticks, crate::consts::MAX_CATCH_UP_TICKS);
        assert_eq!(rec.frames(), 3);
        assert!(rec.is_balanced());
    }

    #[test]
    fn test_pointer_resumes_audio_and_maps_coordinates() {
        let synth = RecordingSynth::new();
        let mut s = Session::new(Faller, 1, Box::new(synth.clone()));
        // Canvas displayed at half size
        let rect = SurfaceRect::new(0.0, 0.0, 200.0, 400.0);
        s.pointer(Pointer::down(50.0, 50.0), &rect);
        assert_eq!(synth.resume_count(), 1);
        assert_eq!(s.phase(), Phase::Playing);
        s.pointer(Pointer::down(50.0, 50.0), &rect);
        s.step();
        // Tap mode: the press went through the queue, not to the actor
        assert_eq!(s.world().actor.pos, Vec2::new(200.0, 700.0));
    }

    /// Output that drops everything until a gesture unlocks it, as browsers do
    #[derive(Clone, Default)]
    struct GestureLocked {
        unlocked: std::rc::Rc<std::cell::Cell<bool>>,
        dropped: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl GestureLocked {
        fn drop_if_locked(&self) {
            if !self.unlocked.get() {
                self.dropped.set(self.dropped.get() + 1);
            }
        }
    }

    impl crate::audio::Synth for GestureLocked {
        fn resume(&mut self) {
            self.unlocked.set(true);
        }
        fn play(&mut self, _sound: &crate::audio::SoundParams) {
            self.drop_if_locked();
        }
        fn start_tone(&mut self, _tone: Tone) {
            self.drop_if_locked();
        }
        fn retarget_tone(&mut self, _frequency: f32, _gain: f32) {
            self.drop_if_locked();
        }
        fn stop_tone(&mut self) {}
    }

    #[test]
    fn test_start_gesture_unlocks_audio_before_the_tone() {
        let synth = GestureLocked::default();
        let mut s = Session::new(Misser, 1, Box::new(synth.clone()));
        let mut rec = CommandRecorder::new();
        s.frame(0.0, &mut rec);
        assert!(!synth.unlocked.get());

        tap(&mut s);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(synth.unlocked.get());
        assert_eq!(synth.dropped.get(), 0);
    }

    #[test]
    fn test_teardown_stops_tone_and_ignores_input() {
        let synth = RecordingSynth::new();
        let mut s = Session::new(Misser, 1, Box::new(synth.clone()));
        tap(&mut s);
        assert!(matches!(synth.commands().first(), Some(AudioCommand::StartTone(_))));

        s.teardown();
        assert_eq!(synth.commands().last(), Some(&AudioCommand::StopTone));
        let before = synth.commands().len();

        tap(&mut s);
        let mut rec = CommandRecorder::new();
        assert_eq!(s.frame(1000.0, &mut rec), 0);
        assert!(rec.commands().is_empty());
        assert_eq!(s.world().lives, 3);
        assert_eq!(synth.commands().len(), before);
        assert!(s.is_torn_down());
    }

    #[test]
    fn test_particle_cap_from_options() {
        let options = SessionOptions {
            particle_cap: 100,
            shake_scale: 0.0,
        };
        let mut s = Session::with_options(Misser, 1, Box::new(RecordingSynth::new()), options);
        assert_eq!(s.world().particles.capacity(), 100);
        tap(&mut s);
        tap(&mut s);
        s.step();
        assert_eq!(s.world().shake.magnitude(), 0.0);
    }
}
