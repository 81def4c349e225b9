//! Difficulty ramps
//!
//! A [`Ramp`] is a value that starts at a baseline and steps on a cadence,
//! bounded by a floor and a ceiling. Spawn intervals ramp down toward a
//! floor; scroll speeds and failure rates ramp up.

/// Minimum value any spawn interval can reach
pub const MIN_SPAWN_INTERVAL: f32 = 1.0;

/// Absorbs float drift from summing per-tick deltas
const CADENCE_EPSILON: f64 = 1e-6;

/// How the value changes each step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Add(f32),
    Scale(f32),
}

/// When the value steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Never changes
    Fixed,
    /// Every `every_ms` of active play, counted from the start of play
    Elapsed { every_ms: f64 },
    /// Every `every` successful resolutions
    Resolutions { every: u32 },
}

#[derive(Debug, Clone)]
pub struct Ramp {
    value: f32,
    step: Step,
    cadence: Cadence,
    min: f32,
    max: f32,
    elapsed_ms: f64,
    elapsed_steps: u32,
    resolutions: u32,
    steps: u32,
}

impl Ramp {
    pub fn new(base: f32, step: Step, cadence: Cadence) -> Self {
        Self {
            value: base,
            step,
            cadence,
            min: f32::NEG_INFINITY,
            max: f32::INFINITY,
            elapsed_ms: 0.0,
            elapsed_steps: 0,
            resolutions: 0,
            steps: 0,
        }
    }

    /// A constant value
    pub fn fixed(value: f32) -> Self {
        Self::new(value, Step::Add(0.0), Cadence::Fixed)
    }

    pub fn floor(mut self, min: f32) -> Self {
        self.min = min;
        self.value = self.value.max(min);
        self
    }

    pub fn ceiling(mut self, max: f32) -> Self {
        self.max = max;
        self.value = self.value.min(max);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Number of steps applied so far
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    /// Advance by active play time; returns true if at least one step applied
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        let Cadence::Elapsed { every_ms } = self.cadence else {
            return false;
        };
        if every_ms <= 0.0 {
            return false;
        }

        self.elapsed_ms += dt_ms.max(0.0);
        let due = (self.elapsed_ms / every_ms + CADENCE_EPSILON).floor() as u32;
        let stepped = due > self.elapsed_steps;
        while self.elapsed_steps < due {
            self.elapsed_steps += 1;
            self.apply_step();
        }
        stepped
    }

    /// Record a successful resolution; returns true if the ramp stepped
    pub fn on_resolution(&mut self) -> bool {
        let Cadence::Resolutions { every } = self.cadence else {
            return false;
        };
        self.resolutions += 1;
        if self.resolutions >= every.max(1) {
            self.resolutions = 0;
            self.apply_step();
            return true;
        }
        false
    }

    fn apply_step(&mut self) {
        let next = match self.step {
            Step::Add(delta) => self.value + delta,
            Step::Scale(factor) => self.value * factor,
        };
        self.value = next.clamp(self.min, self.max);
        self.steps += 1;
    }
}

/// The two ramps every session carries
#[derive(Debug, Clone)]
pub struct Difficulty {
    /// Spawn interval (ms for timed spawners, px for distance spawners)
    pub interval: Ramp,
    /// Speed / level / failure-rate multiplier
    pub intensity: Ramp,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new(Ramp::fixed(1000.0), Ramp::fixed(1.0))
    }
}

impl Difficulty {
    /// The interval ramp's floor is forced strictly positive
    pub fn new(interval: Ramp, intensity: Ramp) -> Self {
        let floor = interval.min.max(MIN_SPAWN_INTERVAL);
        Self {
            interval: interval.floor(floor),
            intensity,
        }
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if self.interval.advance(dt_ms) {
            log::debug!("Spawn interval now {:.0}", self.interval.value());
        }
        self.intensity.advance(dt_ms);
    }

    pub fn on_resolution(&mut self) {
        self.interval.on_resolution();
        self.intensity.on_resolution();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use proptest::prelude::*;

    #[test]
    fn test_breakdown_rate_reaches_floor() {
        let mut ramp = Ramp::new(1500.0, Step::Add(-300.0), Cadence::Elapsed { every_ms: 15_000.0 })
            .floor(600.0);
        ramp.advance(60_000.0);
        assert_eq!(ramp.value(), 600.0);
        assert_eq!(ramp.steps(), 4);
    }

    #[test]
    fn test_elapsed_cadence_in_ticks() {
        // Same ramp driven one tick at a time for a full minute
        let mut ramp = Ramp::new(1500.0, Step::Add(-300.0), Cadence::Elapsed { every_ms: 15_000.0 })
            .floor(600.0);
        for _ in 0..3600 {
            ramp.advance(TICK_MS);
        }
        assert_eq!(ramp.value(), 600.0);
    }

    #[test]
    fn test_elapsed_remainder_carries() {
        let mut ramp = Ramp::new(3.0, Step::Add(0.5), Cadence::Elapsed { every_ms: 15_000.0 });
        assert!(!ramp.advance(10_000.0));
        assert!(ramp.advance(10_000.0));
        assert_eq!(ramp.value(), 3.5);
    }

    #[test]
    fn test_resolution_cadence() {
        let mut ramp = Ramp::new(2000.0, Step::Add(-50.0), Cadence::Resolutions { every: 1 })
            .floor(400.0);
        for _ in 0..100 {
            ramp.on_resolution();
        }
        assert_eq!(ramp.value(), 400.0);
        // Elapsed time does nothing to a resolution ramp
        assert!(!ramp.advance(1e9));
    }

    #[test]
    fn test_scale_with_ceiling() {
        let mut ramp = Ramp::new(5.0, Step::Scale(1.05), Cadence::Elapsed { every_ms: 10_000.0 })
            .ceiling(6.0);
        ramp.advance(100_000.0);
        assert_eq!(ramp.value(), 6.0);
    }

    #[test]
    fn test_interval_floor_forced_positive() {
        let difficulty = Difficulty::new(
            Ramp::new(100.0, Step::Add(-500.0), Cadence::Elapsed { every_ms: 1.0 }),
            Ramp::fixed(1.0),
        );
        let mut d = difficulty.clone();
        d.advance(1000.0);
        assert!(d.interval.value() >= MIN_SPAWN_INTERVAL);
    }

    proptest! {
        #[test]
        fn prop_interval_never_below_floor(
            base in 100.0f32..5000.0,
            delta in 1.0f32..1000.0,
            floor in 0.0f32..800.0,
            elapsed in 0.0f64..1_000_000.0,
        ) {
            let mut d = Difficulty::new(
                Ramp::new(base, Step::Add(-delta), Cadence::Elapsed { every_ms: 1000.0 }).floor(floor),
                Ramp::fixed(1.0),
            );
            d.advance(elapsed);
            prop_assert!(d.interval.value() >= floor.max(MIN_SPAWN_INTERVAL));
            prop_assert!(d.interval.value() > 0.0);
        }
    }
}
