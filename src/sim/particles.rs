//! Cosmetic particle effects
//!
//! Particles never touch gameplay state. Every kind has a positive per-tick
//! life decay, so any burst is eventually retired; the capacity cap bounds
//! memory between retirements.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Default particle cap (matches the Medium quality preset)
pub const DEFAULT_CAPACITY: usize = 500;

/// Particle category; determines velocity bias, decay and growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Rises and drifts, grows as it fades
    Smoke,
    /// Fast radial sparks (repairs)
    Spark,
    /// Downward-biased spray droplets
    Spray,
    /// Radial burst
    Explosion,
    /// Exhaust burst below the actor, shrinks quickly
    Flame,
    /// Kicked back and up
    Dirt,
    /// Slow rising scan glyphs
    Data,
    /// Fine falling mist that swells
    Mist,
}

/// How size changes per tick
#[derive(Debug, Clone, Copy, PartialEq)]
enum Growth {
    Add(f32),
    Scale(f32),
}

impl ParticleKind {
    /// Life lost per tick (always > 0)
    pub fn decay(self) -> f32 {
        match self {
            ParticleKind::Smoke => 0.02,
            ParticleKind::Spark => 0.04,
            ParticleKind::Spray => 0.03,
            ParticleKind::Explosion => 0.05,
            ParticleKind::Flame => 0.02,
            ParticleKind::Dirt => 0.03,
            ParticleKind::Data => 0.02,
            ParticleKind::Mist => 0.05,
        }
    }

    fn growth(self) -> Growth {
        match self {
            ParticleKind::Smoke => Growth::Add(0.5),
            ParticleKind::Mist => Growth::Add(0.1),
            ParticleKind::Flame => Growth::Scale(0.9),
            _ => Growth::Add(0.0),
        }
    }

    fn velocity<R: Rng>(self, rng: &mut R) -> Vec2 {
        match self {
            ParticleKind::Smoke => Vec2::new(spread(rng, 1.0), -0.5 - spread(rng, 2.0).abs()),
            ParticleKind::Spray => Vec2::new(spread(rng, 2.0), 1.0 + spread(rng, 4.0).abs()),
            ParticleKind::Flame => Vec2::new(spread(rng, 2.0), 2.0 + spread(rng, 4.0).abs()),
            ParticleKind::Dirt => Vec2::new(-1.0 - spread(rng, 4.0).abs(), -1.0 - spread(rng, 4.0).abs()),
            ParticleKind::Data => Vec2::new(spread(rng, 1.0), -1.0 - spread(rng, 4.0).abs()),
            ParticleKind::Mist => Vec2::new(spread(rng, 1.0), 2.0 + spread(rng, 6.0).abs()),
            ParticleKind::Spark | ParticleKind::Explosion => {
                let angle = rng.random::<f32>() * TAU;
                let (lo, hi) = if self == ParticleKind::Spark {
                    (2.0, 6.0)
                } else {
                    (1.0, 5.0)
                };
                let speed = rng.random_range(lo..hi);
                Vec2::new(angle.cos(), angle.sin()) * speed
            }
        }
    }

    fn size<R: Rng>(self, rng: &mut R) -> f32 {
        let (lo, hi) = match self {
            ParticleKind::Smoke => (5.0, 10.0),
            ParticleKind::Explosion => (3.0, 7.0),
            ParticleKind::Flame => (4.0, 8.0),
            ParticleKind::Mist => (2.0, 4.0),
            _ => (2.0, 4.0),
        };
        rng.random_range(lo..hi)
    }
}

/// Uniform in `[-s/2, s/2)`
fn spread<R: Rng>(rng: &mut R, s: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * s
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at spawn, retired at <= 0
    pub life: f32,
    pub size: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Advance one tick
    fn step(&mut self) {
        self.pos += self.vel;
        self.life -= self.kind.decay();
        self.size = match self.kind.growth() {
            Growth::Add(d) => self.size + d,
            Growth::Scale(f) => self.size * f,
        }
        .max(0.0);
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    capacity: usize,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Emit a burst of `count` particles of `kind` at `origin`
    pub fn spawn<R: Rng>(&mut self, origin: Vec2, kind: ParticleKind, count: usize, color: u32, rng: &mut R) {
        // Anything past capacity would be evicted immediately
        let count = count.min(self.capacity);
        for _ in 0..count {
            let particle = Particle {
                pos: origin,
                vel: kind.velocity(rng),
                life: 1.0,
                size: kind.size(rng),
                color,
                kind,
            };
            self.particles.push(particle);
        }
        self.enforce_capacity();
    }

    /// Advance all particles and retire the dead ones
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.step();
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    fn enforce_capacity(&mut self) {
        if self.particles.len() > self.capacity {
            let excess = self.particles.len() - self.capacity;
            // Oldest first
            self.particles.drain(..excess);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ALL_KINDS: [ParticleKind; 8] = [
        ParticleKind::Smoke,
        ParticleKind::Spark,
        ParticleKind::Spray,
        ParticleKind::Explosion,
        ParticleKind::Flame,
        ParticleKind::Dirt,
        ParticleKind::Data,
        ParticleKind::Mist,
    ];

    #[test]
    fn test_burst_retires() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::new(1000);
        ps.spawn(Vec2::new(200.0, 400.0), ParticleKind::Explosion, 20, 0xff5500, &mut rng);
        assert_eq!(ps.len(), 20);
        // 1.0 / 0.05 = 20 ticks, plus one for float rounding
        for _ in 0..21 {
            ps.step();
        }
        assert!(ps.is_empty());
    }

    #[test]
    fn test_spray_falls_smoke_rises() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ps = ParticleSystem::new(1000);
        ps.spawn(Vec2::ZERO, ParticleKind::Spray, 50, 0, &mut rng);
        assert!(ps.iter().all(|p| p.vel.y > 0.0));
        ps.clear();
        ps.spawn(Vec2::ZERO, ParticleKind::Smoke, 50, 0, &mut rng);
        assert!(ps.iter().all(|p| p.vel.y < 0.0));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::new(10);
        ps.spawn(Vec2::ZERO, ParticleKind::Smoke, 8, 0x111111, &mut rng);
        ps.spawn(Vec2::ZERO, ParticleKind::Spark, 8, 0x222222, &mut rng);
        assert_eq!(ps.len(), 10);
        assert_eq!(ps.iter().filter(|p| p.color == 0x222222).count(), 8);
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ps = ParticleSystem::new(0);
        ps.spawn(Vec2::ZERO, ParticleKind::Mist, 1_000_000, 0, &mut rng);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_flame_shrinks() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ps = ParticleSystem::new(10);
        ps.spawn(Vec2::ZERO, ParticleKind::Flame, 1, 0, &mut rng);
        let before = ps.iter().next().map(|p| p.size).unwrap_or_default();
        ps.step();
        let after = ps.iter().next().map(|p| p.size).unwrap_or_default();
        assert!(after < before);
    }

    proptest! {
        #[test]
        fn prop_life_strictly_decreases(seed in any::<u64>(), kind_idx in 0usize..8, ticks in 1usize..80) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut ps = ParticleSystem::new(100);
            ps.spawn(Vec2::ZERO, ALL_KINDS[kind_idx], 5, 0, &mut rng);

            let mut prev: Vec<f32> = ps.iter().map(|p| p.life).collect();
            for _ in 0..ticks {
                ps.step();
                let now: Vec<f32> = ps.iter().map(|p| p.life).collect();
                // A single burst ages together, so survivors keep their order
                prop_assert!(now.len() <= prev.len());
                for (a, b) in now.iter().zip(prev.iter()) {
                    prop_assert!(a < b);
                    prop_assert!(*a > 0.0);
                }
                prev = now;
            }
        }

        #[test]
        fn prop_steady_state_is_bounded(seed in any::<u64>(), kind_idx in 0usize..8, per_tick in 1usize..20) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let kind = ALL_KINDS[kind_idx];
            let mut ps = ParticleSystem::new(usize::MAX);
            // Each particle lives at most ceil(1 / decay) ticks
            let lifetime = (1.0 / kind.decay()).ceil() as usize + 1;
            for _ in 0..400 {
                ps.spawn(Vec2::ZERO, kind, per_tick, 0, &mut rng);
                ps.step();
                prop_assert!(ps.len() <= per_tick * lifetime);
            }
        }
    }
}
