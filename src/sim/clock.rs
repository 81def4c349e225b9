//! Fixed-timestep clock
//!
//! Turns variable frame timestamps into a whole number of simulation ticks.
//! The accumulator is kept in tick-scaled milliseconds (`ms * ticks_per_second`)
//! so one tick is exactly 1000 units and whole-millisecond deltas drain without
//! rounding drift.

use crate::consts::{MAX_CATCH_UP_TICKS, TICKS_PER_SECOND};

const UNITS_PER_TICK: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct SimClock {
    ticks_per_second: f64,
    max_ticks_per_frame: u32,
    last_ms: Option<f64>,
    accumulator: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::with_rate(TICKS_PER_SECOND, MAX_CATCH_UP_TICKS)
    }

    pub fn with_rate(ticks_per_second: u32, max_ticks_per_frame: u32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1) as f64,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            last_ms: None,
            accumulator: 0.0,
        }
    }

    /// Duration of one tick in milliseconds
    pub fn tick_ms(&self) -> f64 {
        UNITS_PER_TICK / self.ticks_per_second
    }

    /// Largest delta a single frame may contribute
    pub fn max_delta_ms(&self) -> f64 {
        self.tick_ms() * self.max_ticks_per_frame as f64
    }

    /// Feed a frame timestamp; returns how many ticks to run.
    ///
    /// The first timestamp only primes the clock.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        self.accumulate(now_ms - last)
    }

    /// Add a raw delta (clamped to `[0, max_delta_ms]`) and drain whole ticks
    pub fn accumulate(&mut self, delta_ms: f64) -> u32 {
        let delta = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.max_delta_ms())
        } else {
            0.0
        };
        self.accumulator += delta * self.ticks_per_second;

        let mut ticks = 0;
        while self.accumulator >= UNITS_PER_TICK {
            self.accumulator -= UNITS_PER_TICK;
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_primes() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance(5000.0), 0);
        assert_eq!(clock.advance(5050.0), 3);
    }

    #[test]
    fn test_remainder_carries() {
        let mut clock = SimClock::new();
        clock.advance(0.0);
        // 10ms is not a full tick, 20ms total is one
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.advance(20.0), 1);
        // 3.33ms left over plus 15ms is one more
        assert_eq!(clock.advance(35.0), 1);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = SimClock::new();
        clock.advance(0.0);
        // Tab was backgrounded for a minute
        assert_eq!(clock.advance(60_000.0), MAX_CATCH_UP_TICKS);
    }

    #[test]
    fn test_backwards_time_ignored() {
        let mut clock = SimClock::new();
        clock.advance(1000.0);
        assert_eq!(clock.advance(500.0), 0);
        assert_eq!(clock.accumulate(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn prop_tick_count_independent_of_chunking(
            deltas in prop::collection::vec(0u32..=133, 1..200)
        ) {
            let mut chunked = SimClock::new();
            let total: u32 = deltas.iter().sum();
            let ticks: u32 = deltas.iter().map(|d| chunked.accumulate(*d as f64)).sum();

            let expected = (total as u64 * TICKS_PER_SECOND as u64 / 1000) as u32;
            prop_assert_eq!(ticks, expected);
        }
    }
}
