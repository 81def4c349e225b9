//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order / entity ID)
//! - No rendering or platform dependencies beyond the `RenderSurface` seam

pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod game;
pub mod input;
pub mod lifecycle;
pub mod particles;
pub mod session;
pub mod shake;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use collision::{Aabb, Shape, circles_overlap};
pub use difficulty::{Cadence, Difficulty, Ramp, Step};
pub use game::{Game, Setup};
pub use input::{Gesture, InputMode, Pointer, PointerKind, SurfaceRect};
pub use lifecycle::{Lifecycle, Phase, Transition};
pub use particles::{Particle, ParticleKind, ParticleSystem};
pub use session::{Playable, Session, SessionOptions};
pub use shake::ScreenShake;
pub use spawner::{Progress, Spawner, Trigger};
pub use state::{Actor, Burst, Condition, Entity, Penalty, Status, World};
pub use tick::tick;
