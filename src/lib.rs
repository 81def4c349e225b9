//! Agro Arcade - short agro-themed arcade mini-games on one shared engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, spawner, collision, particles, lifecycle)
//! - `games`: The mini-games, each a thin `Game` strategy over the engine
//! - `audio`: ZzFX-style procedural sound synthesis and playback
//! - `renderer`: Immediate-mode drawing surface (Canvas2D on web)
//! - `highscores`: Score submission and leaderboard collaborators
//! - `settings` / `branding`: Player preferences and read-only display config
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod branding;
pub mod games;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use branding::Branding;
pub use games::{GameId, launch};
pub use highscores::{LocalLeaderboard, ScoreError, ScoreSink};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Logical surface width; every game simulates in these units
    pub const LOGICAL_WIDTH: f32 = 400.0;
    /// Logical surface height
    pub const LOGICAL_HEIGHT: f32 = 800.0;

    /// Fixed simulation rate (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed tick duration in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICKS_PER_SECOND as f64;
    /// Largest frame delta (in ticks) drained in one frame after a stall
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Default number of lives for life-based games
    pub const DEFAULT_LIVES: u32 = 3;
    /// Health/efficiency percentage at session start
    pub const FULL_HEALTH: f32 = 100.0;

    /// Screen shake multiplier applied every tick
    pub const SHAKE_DECAY: f32 = 0.9;
    /// Shake below this magnitude snaps to zero
    pub const SHAKE_CUTOFF: f32 = 0.5;

    /// Synth output rate
    pub const SAMPLE_RATE: u32 = 44_100;
    /// Global synth volume
    pub const MASTER_GAIN: f32 = 0.3;
}

/// Linear interpolation from `a` toward `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp a point into the logical surface
#[inline]
pub fn clamp_to_surface(p: Vec2) -> Vec2 {
    Vec2::new(
        p.x.clamp(0.0, consts::LOGICAL_WIDTH),
        p.y.clamp(0.0, consts::LOGICAL_HEIGHT),
    )
}
