//! Session state and core simulation types
//!
//! A [`World`] is replaced wholesale on restart; nothing here survives a
//! session.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Shape;
use super::difficulty::Difficulty;
use super::input::Gesture;
use super::lifecycle::{Lifecycle, Phase};
use super::particles::{ParticleKind, ParticleSystem};
use super::shake::ScreenShake;
use super::spawner::Spawner;
use crate::audio::{AudioCommand, SoundParams, Tone};
use crate::consts::*;

/// The player-controlled entity
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub pos: Vec2,
    /// Where input wants the actor to be
    pub target: Vec2,
    /// Displacement over the last tick
    pub vel: Vec2,
    /// Visual attitude in radians
    pub tilt: f32,
    pub shape: Shape,
    /// Fraction of the remaining distance covered per tick
    pub ease: f32,
    /// Axes that follow the target (1 = follows, 0 = locked)
    pub follow: Vec2,
    /// Movement bounds for the actor's center
    pub min: Vec2,
    pub max: Vec2,
}

impl Actor {
    pub fn new(pos: Vec2, shape: Shape) -> Self {
        Self {
            pos,
            target: pos,
            vel: Vec2::ZERO,
            tilt: 0.0,
            shape,
            ease: 0.15,
            follow: Vec2::ONE,
            min: Vec2::ZERO,
            max: Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
        }
    }

    pub fn with_ease(mut self, ease: f32) -> Self {
        self.ease = ease.clamp(0.0, 1.0);
        self
    }

    /// Only follow horizontally (tractors and drones keep their row)
    pub fn horizontal(mut self) -> Self {
        self.follow = Vec2::X;
        self
    }

    pub fn bounded(mut self, min: Vec2, max: Vec2) -> Self {
        self.min = min;
        self.max = max;
        self.pos = self.pos.clamp(min, max);
        self.target = self.pos;
        self
    }

    /// Set the input target; locked axes keep the current target
    pub fn aim(&mut self, p: Vec2) {
        self.target = self.target + (p - self.target) * self.follow;
    }

    /// Ease toward the target and derive velocity
    pub fn ease_toward_target(&mut self) {
        let prev = self.pos;
        let target = self.target.clamp(self.min, self.max);
        self.pos += (target - self.pos) * self.ease;
        self.pos = self.pos.clamp(self.min, self.max);
        self.vel = self.pos - prev;
    }

    /// Tilt proportional to horizontal velocity, limited to `limit` radians
    pub fn tilt_from_velocity(&mut self, factor: f32, limit: f32) {
        self.tilt = (self.vel.x * factor).clamp(-limit, limit);
    }
}

/// Lifecycle of a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Collidable
    Active,
    /// Consumed this session (cured, hit, scored); still drawn
    Resolved,
    /// Culled at the end of the tick
    Removed,
}

/// Working state for entities that can break and be repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Working,
    Warning,
    Broken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity<K> {
    pub id: u32,
    pub kind: K,
    pub pos: Vec2,
    /// Logical pixels per tick
    pub vel: Vec2,
    pub shape: Shape,
    status: Status,
    pub condition: Condition,
    /// Time spent in the current condition
    pub timer_ms: f64,
    /// Game-defined 0..1 progress (scan progress, trail fill)
    pub progress: f32,
    pub scale: f32,
    pub rotation: f32,
    /// Rotation added per tick
    pub spin: f32,
}

impl<K> Entity<K> {
    pub fn new(id: u32, kind: K, pos: Vec2, shape: Shape) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            shape,
            status: Status::Active,
            condition: Condition::Working,
            timer_ms: 0.0,
            progress: 0.0,
            scale: 1.0,
            rotation: 0.0,
            spin: 0.0,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Only active entities are collision-tested
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Mark consumed; returns false if it already was
    pub fn resolve(&mut self) -> bool {
        if self.status != Status::Active {
            return false;
        }
        self.status = Status::Resolved;
        true
    }

    pub fn remove(&mut self) {
        self.status = Status::Removed;
    }

    pub fn set_condition(&mut self, condition: Condition) {
        if self.condition != condition {
            self.condition = condition;
            self.timer_ms = 0.0;
        }
    }

    /// Advance position and spin by one tick
    pub fn integrate(&mut self) {
        self.pos += self.vel;
        self.rotation += self.spin;
    }
}

/// Particle feedback for a gameplay event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub kind: ParticleKind,
    pub count: usize,
    /// 0xRRGGBB
    pub color: u32,
}

impl Burst {
    pub const fn new(kind: ParticleKind, count: usize, color: u32) -> Self {
        Self { kind, count, color }
    }
}

/// What a penalizing hit costs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    Life,
    Health(f32),
    /// Ends the run immediately
    Crash,
}

/// All mutable state of one session
#[derive(Debug, Clone)]
pub struct World<K> {
    pub seed: u64,
    pub lifecycle: Lifecycle,
    pub score: u64,
    pub lives: u32,
    /// Health / efficiency / crop health percentage
    pub health: f32,
    /// Active play time
    pub elapsed_ms: f64,
    /// Scroll distance travelled while playing
    pub distance: f32,
    pub level: u32,
    pub actor: Actor,
    /// Spawn order == id order
    pub entities: Vec<Entity<K>>,
    pub particles: ParticleSystem,
    pub shake: ScreenShake,
    pub spawner: Spawner,
    pub difficulty: Difficulty,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    crashed: bool,
    audio: Vec<AudioCommand>,
    gestures: Vec<Gesture>,
    next_id: u32,
}

impl<K> World<K> {
    pub fn new(seed: u64, actor: Actor) -> Self {
        Self {
            seed,
            lifecycle: Lifecycle::new(),
            score: 0,
            lives: DEFAULT_LIVES,
            health: FULL_HEALTH,
            elapsed_ms: 0.0,
            distance: 0.0,
            level: 1,
            actor,
            entities: Vec::new(),
            particles: ParticleSystem::default(),
            shake: ScreenShake::default(),
            spawner: Spawner::off(),
            difficulty: Difficulty::default(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            crashed: false,
            audio: Vec::new(),
            gestures: Vec::new(),
            next_id: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create and register an entity
    pub fn spawn_entity(&mut self, kind: K, pos: Vec2, shape: Shape) -> &mut Entity<K> {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, pos, shape));
        let last = self.entities.len() - 1;
        &mut self.entities[last]
    }

    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_active()).count()
    }

    pub fn count_condition(&self, condition: Condition) -> usize {
        self.entities
            .iter()
            .filter(|e| e.is_active() && e.condition == condition)
            .count()
    }

    /// Emit a particle burst
    pub fn emit(&mut self, origin: Vec2, burst: Burst) {
        self.particles
            .spawn(origin, burst.kind, burst.count, burst.color, &mut self.rng);
    }

    /// Queue a one-shot sound
    pub fn play(&mut self, sound: SoundParams) {
        self.audio.push(AudioCommand::Play(sound));
    }

    pub fn start_tone(&mut self, tone: Tone) {
        self.audio.push(AudioCommand::StartTone(tone));
    }

    pub fn retarget_tone(&mut self, frequency: f32, gain: f32) {
        self.audio
            .push(AudioCommand::RetargetTone { frequency, gain });
    }

    pub fn stop_tone(&mut self) {
        self.audio.push(AudioCommand::StopTone);
    }

    /// Drain queued audio commands (dispatched once per frame)
    pub fn take_audio(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.audio)
    }

    pub fn queue_gesture(&mut self, gesture: Gesture) {
        self.gestures.push(gesture);
    }

    pub fn take_gestures(&mut self) -> Vec<Gesture> {
        std::mem::take(&mut self.gestures)
    }

    /// Scoring hit on entity `index`: resolve it, add `points`, emit feedback.
    ///
    /// Returns false (and does nothing) if the entity was already consumed.
    pub fn award(&mut self, index: usize, points: u64, burst: Option<Burst>, sound: Option<SoundParams>) -> bool {
        let Some(entity) = self.entities.get_mut(index) else {
            return false;
        };
        if !entity.resolve() {
            return false;
        }
        let origin = entity.pos;
        self.credit(points);
        if let Some(burst) = burst {
            self.emit(origin, burst);
        }
        if let Some(sound) = sound {
            self.play(sound);
        }
        true
    }

    /// Score a resolution that leaves the entity in play (repairs, scans)
    pub fn credit(&mut self, points: u64) {
        self.score += points;
        self.difficulty.on_resolution();
    }

    /// Penalizing hit: pay `penalty`, shake, play `sound`
    pub fn penalize(&mut self, penalty: Penalty, shake: f32, sound: Option<SoundParams>) {
        match penalty {
            Penalty::Life => self.lives = self.lives.saturating_sub(1),
            Penalty::Health(amount) => self.health = (self.health - amount).max(0.0),
            Penalty::Crash => self.crashed = true,
        }
        self.shake.kick(shake);
        if let Some(sound) = sound {
            self.play(sound);
        }
    }

    /// Restore health, capped at full
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(FULL_HEALTH);
    }

    /// End the run at the next terminal check
    pub fn crash(&mut self) {
        self.crashed = true;
    }

    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// Lives exhausted, health depleted or a fatal crash
    pub fn is_terminal(&self) -> bool {
        self.lives == 0 || self.health <= 0.0 || self.crashed
    }

    /// Drop entities marked removed (keeps spawn order)
    pub fn cull(&mut self) {
        self.entities.retain(|e| e.status() != Status::Removed);
    }
}
