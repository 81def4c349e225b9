//! Immediate-mode 2D rendering
//!
//! Games draw through the [`RenderSurface`] trait in logical coordinates
//! (400x800). The web build backs it with a Canvas2D context; tests and the
//! native demo use the [`CommandRecorder`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod color;
pub mod hud;
pub mod recorder;
pub mod shapes;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use color::Color;
pub use hud::{Hud, OverlayState};
pub use recorder::{CommandRecorder, DrawCommand};
pub use surface::{RenderSurface, TextAlign};
