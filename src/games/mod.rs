//! The mini-games
//!
//! Every game is a small [`Game`](crate::sim::Game) strategy on the shared
//! engine. [`launch`] wraps one in a [`Session`] behind the object-safe
//! [`Playable`] handle so the host never needs to know which game it runs.

mod agro_panic;
mod drone_rush;
mod fleet_monitor;
mod memory_map;
mod monitor_panic;
mod ndvi_hunter;
mod torque_master;
mod variable_rate;
mod weed_control;

pub use agro_panic::AgroPanic;
pub use drone_rush::DroneRush;
pub use fleet_monitor::FleetMonitor;
pub use memory_map::{CompletionRule, MemoryMap};
pub use monitor_panic::MonitorPanic;
pub use ndvi_hunter::NdviHunter;
pub use torque_master::TorqueMaster;
pub use variable_rate::{Dose, VariableRate};
pub use weed_control::WeedControl;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::audio::Synth;
use crate::sim::{Entity, Playable, Session, SessionOptions};

/// Stable game identifiers (used in URLs, storage keys and leaderboards)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    WeedControl,
    DroneRush,
    TorqueMaster,
    MemoryMap,
    FleetMonitor,
    MonitorPanic,
    AgroPanic,
    NdviHunter,
    VariableRate,
}

impl GameId {
    pub const ALL: [GameId; 9] = [
        GameId::WeedControl,
        GameId::DroneRush,
        GameId::TorqueMaster,
        GameId::MemoryMap,
        GameId::FleetMonitor,
        GameId::MonitorPanic,
        GameId::AgroPanic,
        GameId::NdviHunter,
        GameId::VariableRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::WeedControl => "weed_control",
            GameId::DroneRush => "drone_rush",
            GameId::TorqueMaster => "torque_master",
            GameId::MemoryMap => "memory_map",
            GameId::FleetMonitor => "fleet_monitor",
            GameId::MonitorPanic => "monitor_panic",
            GameId::AgroPanic => "agro_panic",
            GameId::NdviHunter => "ndvi_hunter",
            GameId::VariableRate => "variable_rate",
        }
    }

    /// Accepts snake_case or kebab-case, any letter case
    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|id| id.as_str() == key)
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            GameId::WeedControl => "Weed Control",
            GameId::DroneRush => "Drone Rush",
            GameId::TorqueMaster => "Torque Master",
            GameId::MemoryMap => "Memory Map",
            GameId::FleetMonitor => "Fleet Monitor",
            GameId::MonitorPanic => "Monitor Panic",
            GameId::AgroPanic => "Agro Panic",
            GameId::NdviHunter => "NDVI Sky Hunter",
            GameId::VariableRate => "Variable Rate Master",
        }
    }
}

/// Build a session for `id`, sitting at its menu
pub fn launch(id: GameId, seed: u64, synth: Box<dyn Synth>, options: SessionOptions) -> Box<dyn Playable> {
    match id {
        GameId::WeedControl => Box::new(Session::with_options(WeedControl::default(), seed, synth, options)),
        GameId::DroneRush => Box::new(Session::with_options(DroneRush::default(), seed, synth, options)),
        GameId::TorqueMaster => Box::new(Session::with_options(TorqueMaster::default(), seed, synth, options)),
        GameId::MemoryMap => Box::new(Session::with_options(MemoryMap::default(), seed, synth, options)),
        GameId::FleetMonitor => Box::new(Session::with_options(FleetMonitor::default(), seed, synth, options)),
        GameId::MonitorPanic => Box::new(Session::with_options(MonitorPanic::default(), seed, synth, options)),
        GameId::AgroPanic => Box::new(Session::with_options(AgroPanic::default(), seed, synth, options)),
        GameId::NdviHunter => Box::new(Session::with_options(NdviHunter::default(), seed, synth, options)),
        GameId::VariableRate => Box::new(Session::with_options(VariableRate::default(), seed, synth, options)),
    }
}

/// Topmost (last spawned) active entity under `point` that matches `pred`
pub(crate) fn hit_test<K>(entities: &[Entity<K>], point: Vec2, pred: impl Fn(&Entity<K>) -> bool) -> Option<usize> {
    entities
        .iter()
        .rposition(|e| e.is_active() && pred(e) && e.shape.contains(e.pos, point))
}

/// Wrap an angle into `(-π, π]`
pub(crate) fn wrap_angle(a: f32) -> f32 {
    let a = a.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSynth;
    use crate::renderer::CommandRecorder;
    use crate::sim::Phase;

    #[test]
    fn test_ids_round_trip() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(GameId::from_str("Drone-Rush"), Some(GameId::DroneRush));
        assert_eq!(GameId::from_str("pong"), None);
        assert_eq!(serde_json::to_string(&GameId::NdviHunter).unwrap(), "\"ndvi_hunter\"");
    }

    #[test]
    fn test_every_game_launches_and_renders_its_menu() {
        for id in GameId::ALL {
            let mut game = launch(id, 3, Box::new(NullSynth), SessionOptions::default());
            assert_eq!(game.id(), id);
            assert_eq!(game.phase(), Phase::Menu);
            let mut surface = CommandRecorder::new();
            game.frame(0.0, &mut surface);
            assert!(surface.is_balanced(), "{} left the transform stack dirty", id.as_str());
            assert_eq!(surface.frames(), 1);
        }
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert_eq!(wrap_angle(0.5), 0.5);
    }
}
