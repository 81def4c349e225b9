//! Screen shake
//!
//! A single cosmetic magnitude that decays geometrically each tick.

use glam::Vec2;
use rand::Rng;

use crate::consts::{SHAKE_CUTOFF, SHAKE_DECAY};

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenShake {
    magnitude: f32,
    /// Multiplier applied to kicks (0 disables shake, reduced motion halves it)
    scale: f32,
}

impl Default for ScreenShake {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ScreenShake {
    pub fn new(scale: f32) -> Self {
        Self {
            magnitude: 0.0,
            scale: scale.max(0.0),
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Raise the shake to at least `amount`; a weaker kick never cuts a stronger one short
    pub fn kick(&mut self, amount: f32) {
        let amount = (amount * self.scale).max(0.0);
        if amount.is_finite() {
            self.magnitude = self.magnitude.max(amount);
        }
    }

    pub fn step(&mut self) {
        self.magnitude *= SHAKE_DECAY;
        if self.magnitude < SHAKE_CUTOFF {
            self.magnitude = 0.0;
        }
    }

    /// Camera offset for this frame
    pub fn offset<R: Rng>(&self, rng: &mut R) -> Vec2 {
        if self.magnitude <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (rng.random::<f32>() - 0.5) * self.magnitude,
            (rng.random::<f32>() - 0.5) * self.magnitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decays_to_zero() {
        let mut shake = ScreenShake::default();
        shake.kick(25.0);
        let mut ticks = 0;
        while shake.magnitude() > 0.0 {
            let before = shake.magnitude();
            shake.step();
            assert!(shake.magnitude() < before);
            ticks += 1;
        }
        // 25 * 0.9^n < 0.5 after 38 ticks
        assert_eq!(ticks, 38);
    }

    #[test]
    fn test_weaker_kick_keeps_stronger() {
        let mut shake = ScreenShake::default();
        shake.kick(15.0);
        shake.kick(3.0);
        assert_eq!(shake.magnitude(), 15.0);
    }

    #[test]
    fn test_disabled_and_negative() {
        let mut shake = ScreenShake::new(0.0);
        shake.kick(30.0);
        assert_eq!(shake.magnitude(), 0.0);

        let mut shake = ScreenShake::default();
        shake.kick(-5.0);
        assert_eq!(shake.magnitude(), 0.0);
    }
}
