//! Audio system
//!
//! Sound effects are ZzFX-style parameter vectors synthesized on the fly;
//! no external files needed. The simulation only queues [`AudioCommand`]s;
//! the session hands them to whatever [`Synth`] it was given.

pub mod zzfx;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

pub use zzfx::SoundParams;
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSynth;

/// Oscillator shape for the continuous tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A long-lived engine/drone tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub frequency: f32,
    pub gain: f32,
    /// Easing time constant (seconds) for retargets
    pub time_constant: f32,
}

impl Tone {
    pub const fn engine(frequency: f32, gain: f32) -> Self {
        Self {
            waveform: Waveform::Sawtooth,
            frequency,
            gain,
            time_constant: 0.1,
        }
    }
}

/// What the simulation asks of the synth
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Play(SoundParams),
    StartTone(Tone),
    RetargetTone { frequency: f32, gain: f32 },
    StopTone,
}

/// Sound output owned by one session
pub trait Synth {
    /// Unlock output after a user gesture (autoplay policy)
    fn resume(&mut self) {}

    /// Fire-and-forget one-shot sound
    fn play(&mut self, sound: &SoundParams);

    /// Start the continuous tone, replacing any running one
    fn start_tone(&mut self, tone: Tone);

    /// Ease the tone toward new values
    fn retarget_tone(&mut self, frequency: f32, gain: f32);

    /// Stop and release the tone
    fn stop_tone(&mut self);

    fn dispatch(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play(sound) => self.play(&sound),
            AudioCommand::StartTone(tone) => self.start_tone(tone),
            AudioCommand::RetargetTone { frequency, gain } => self.retarget_tone(frequency, gain),
            AudioCommand::StopTone => self.stop_tone(),
        }
    }
}

/// Silent output (native builds, tests, or no audio context)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSynth;

impl Synth for NullSynth {
    fn play(&mut self, _sound: &SoundParams) {}
    fn start_tone(&mut self, _tone: Tone) {}
    fn retarget_tone(&mut self, _frequency: f32, _gain: f32) {}
    fn stop_tone(&mut self) {}
}

/// Records every command; the log handle stays readable after the synth is
/// boxed into a session
#[derive(Debug, Clone, Default)]
pub struct RecordingSynth {
    log: Rc<RefCell<Vec<AudioCommand>>>,
    resumed: Rc<RefCell<u32>>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<AudioCommand> {
        self.log.borrow().clone()
    }

    pub fn play_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play(_)))
            .count()
    }

    pub fn resume_count(&self) -> u32 {
        *self.resumed.borrow()
    }
}

impl Synth for RecordingSynth {
    fn resume(&mut self) {
        *self.resumed.borrow_mut() += 1;
    }

    fn play(&mut self, sound: &SoundParams) {
        self.log.borrow_mut().push(AudioCommand::Play(*sound));
    }

    fn start_tone(&mut self, tone: Tone) {
        self.log.borrow_mut().push(AudioCommand::StartTone(tone));
    }

    fn retarget_tone(&mut self, frequency: f32, gain: f32) {
        self.log
            .borrow_mut()
            .push(AudioCommand::RetargetTone { frequency, gain });
    }

    fn stop_tone(&mut self) {
        self.log.borrow_mut().push(AudioCommand::StopTone);
    }
}

/// Player volume preferences applied on top of synthesized samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Mixer {
    pub fn from_settings(settings: &crate::Settings) -> Self {
        let mut mixer = Self::default();
        mixer.set_master_volume(settings.master_volume);
        mixer.set_sfx_volume(settings.sfx_volume);
        mixer.set_muted(settings.muted);
        mixer
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_routes_commands() {
        let recorder = RecordingSynth::new();
        let mut synth: Box<dyn Synth> = Box::new(recorder.clone());
        synth.dispatch(AudioCommand::StartTone(Tone::engine(60.0, 0.1)));
        synth.dispatch(AudioCommand::RetargetTone {
            frequency: 200.0,
            gain: 0.1,
        });
        synth.dispatch(AudioCommand::Play(SoundParams::default()));
        synth.dispatch(AudioCommand::StopTone);
        assert_eq!(recorder.commands().len(), 4);
        assert_eq!(recorder.play_count(), 1);
        assert_eq!(recorder.commands().last(), Some(&AudioCommand::StopTone));
    }

    #[test]
    fn test_mixer_volume() {
        let mut mixer = Mixer::default();
        mixer.set_master_volume(2.0);
        mixer.set_sfx_volume(0.5);
        assert_eq!(mixer.effective_volume(), 0.5);
        mixer.set_muted(true);
        assert_eq!(mixer.effective_volume(), 0.0);
    }
}
