//! Pointer input mapping
//!
//! The host forwards raw pointer events in client (CSS pixel) coordinates
//! together with the canvas bounding rect; everything here converts them to
//! logical surface coordinates.

use glam::Vec2;

use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// Displayed bounds of the render surface, as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Surface displayed at its logical size at the origin
    pub fn logical() -> Self {
        Self::new(0.0, 0.0, LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }

    /// Client coordinates to logical coordinates, clamped to the surface.
    ///
    /// A collapsed (zero or negative) display size maps 1:1.
    pub fn to_logical(&self, client_x: f32, client_y: f32) -> Vec2 {
        let scale_x = if self.width > 0.0 {
            LOGICAL_WIDTH / self.width
        } else {
            1.0
        };
        let scale_y = if self.height > 0.0 {
            LOGICAL_HEIGHT / self.height
        } else {
            1.0
        };
        let p = Vec2::new(
            (client_x - self.left) * scale_x,
            (client_y - self.top) * scale_y,
        );
        if p.is_finite() {
            crate::clamp_to_surface(p)
        } else {
            Vec2::ZERO
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A raw pointer event from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub kind: PointerKind,
    pub client_x: f32,
    pub client_y: f32,
}

impl Pointer {
    pub fn new(kind: PointerKind, client_x: f32, client_y: f32) -> Self {
        Self {
            kind,
            client_x,
            client_y,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }
}

/// How a game consumes pointer input while playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Pointer position becomes the actor's eased target
    Follow,
    /// Pointer-down is hit-tested on the next tick
    Tap,
    /// Down/move/up are all delivered (path drawing)
    Trace,
}

/// Logical-space input queued for the next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Press(Vec2),
    Drag(Vec2),
    Release(Vec2),
}

impl Gesture {
    pub fn pos(&self) -> Vec2 {
        match *self {
            Gesture::Press(p) | Gesture::Drag(p) | Gesture::Release(p) => p,
        }
    }

    /// Translate a pointer into a gesture for `mode`; `None` if the mode ignores it
    pub fn from_pointer(mode: InputMode, kind: PointerKind, pos: Vec2) -> Option<Self> {
        match (mode, kind) {
            (_, PointerKind::Down) => Some(Gesture::Press(pos)),
            (InputMode::Follow | InputMode::Trace, PointerKind::Move) => Some(Gesture::Drag(pos)),
            (InputMode::Trace, PointerKind::Up) => Some(Gesture::Release(pos)),
            _ => None,
        }
    }
}
