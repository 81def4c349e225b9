//! Game lifecycle state machine
//!
//! ```text
//! Menu -> [Countdown] -> Playing <-> [Success] -> ... -> GameOver
//! ```
//!
//! Only `Playing` runs actor physics, the spawner and collision. `Countdown`
//! and `Success` only run their timers.

use serde::{Deserialize, Serialize};

/// Timers within this of zero have expired (absorbs per-tick float drift)
const TIMER_EPSILON_MS: f64 = 1e-6;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Idle, waiting for the first tap
    Menu,
    /// Time-boxed preview, no player agency
    Countdown,
    /// Active gameplay
    Playing,
    /// Level-complete animation
    Success,
    /// Run ended
    GameOver,
}

impl Phase {
    /// Whether gameplay systems run this tick
    pub fn runs_simulation(self) -> bool {
        self == Phase::Playing
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::Countdown => "countdown",
            Phase::Playing => "playing",
            Phase::Success => "success",
            Phase::GameOver => "game_over",
        }
    }
}

/// Timer-driven transitions reported by [`Lifecycle::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CountdownEnded,
    SuccessEnded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    phase: Phase,
    /// Remaining ms in a timed phase
    timer_ms: f64,
    /// Length of the timed phase that is running
    duration_ms: f64,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            timer_ms: 0.0,
            duration_ms: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Remaining time in the current timed phase
    pub fn remaining_ms(&self) -> f64 {
        self.timer_ms
    }

    /// 0 at the start of a timed phase, 1 when it expires
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (1.0 - self.timer_ms / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Leave the menu; with a preview the session counts down first
    pub fn start(&mut self, preview_ms: Option<f64>) -> bool {
        if self.phase != Phase::Menu {
            return false;
        }
        match preview_ms {
            Some(ms) => self.begin_countdown(ms),
            None => self.enter(Phase::Playing, 0.0),
        }
        true
    }

    pub fn begin_countdown(&mut self, ms: f64) {
        if ms > 0.0 {
            self.enter(Phase::Countdown, ms);
        } else {
            self.enter(Phase::Playing, 0.0);
        }
    }

    pub fn begin_success(&mut self, ms: f64) {
        if self.phase == Phase::Playing {
            self.enter(Phase::Success, ms.max(0.0));
        }
    }

    pub fn resume_playing(&mut self) {
        if self.phase != Phase::GameOver {
            self.enter(Phase::Playing, 0.0);
        }
    }

    /// Terminal; returns false if the session was already over
    pub fn game_over(&mut self) -> bool {
        if self.phase == Phase::GameOver {
            return false;
        }
        self.enter(Phase::GameOver, 0.0);
        true
    }

    /// Run the phase timer; a countdown expiring moves straight to `Playing`,
    /// a success expiring is reported so the game can set up the next level
    pub fn advance(&mut self, dt_ms: f64) -> Option<Transition> {
        match self.phase {
            Phase::Countdown | Phase::Success => {
                self.timer_ms -= dt_ms;
                if self.timer_ms > TIMER_EPSILON_MS {
                    return None;
                }
                if self.phase == Phase::Countdown {
                    self.enter(Phase::Playing, 0.0);
                    Some(Transition::CountdownEnded)
                } else {
                    self.timer_ms = 0.0;
                    Some(Transition::SuccessEnded)
                }
            }
            _ => None,
        }
    }

    fn enter(&mut self, phase: Phase, ms: f64) {
        log::debug!("Phase {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.timer_ms = ms;
        self.duration_ms = ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_without_preview() {
        let mut lc = Lifecycle::new();
        assert!(lc.start(None));
        assert_eq!(lc.phase(), Phase::Playing);
        // Only the menu can start
        assert!(!lc.start(None));
    }

    #[test]
    fn test_countdown_expires() {
        let mut lc = Lifecycle::new();
        lc.start(Some(1000.0));
        assert_eq!(lc.phase(), Phase::Countdown);
        let mut ticks = 0;
        while lc.advance(10.0).is_none() {
            ticks += 1;
        }
        assert_eq!(lc.phase(), Phase::Playing);
        assert_eq!(ticks, 99);
    }

    #[test]
    fn test_success_reports_end() {
        let mut lc = Lifecycle::new();
        lc.start(None);
        lc.begin_success(100.0);
        assert_eq!(lc.phase(), Phase::Success);
        assert!(lc.progress() < 0.01);
        assert_eq!(lc.advance(50.0), None);
        assert_eq!(lc.advance(50.0), Some(Transition::SuccessEnded));
        // The game decides what comes next
        assert_eq!(lc.phase(), Phase::Success);
        lc.begin_countdown(2000.0);
        assert_eq!(lc.phase(), Phase::Countdown);
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.start(None);
        assert!(lc.game_over());
        assert!(!lc.game_over());
        lc.resume_playing();
        lc.begin_success(10.0);
        assert_eq!(lc.phase(), Phase::GameOver);
        assert!(!Phase::GameOver.runs_simulation());
        assert!(!Phase::Menu.runs_simulation());
    }
}
