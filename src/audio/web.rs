//! Web Audio backend
//!
//! One-shot sounds are rendered to an `AudioBuffer` and played through a
//! throwaway source node. The continuous tone is an oscillator + gain pair
//! that is eased with `setTargetAtTime` and disconnected on stop.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{Mixer, SoundParams, Synth, Tone, Waveform};
use crate::consts::SAMPLE_RATE;

struct ToneNodes {
    osc: OscillatorNode,
    gain: GainNode,
    time_constant: f64,
}

/// Session-scoped Web Audio output.
///
/// The context is created on the first user gesture, so browsers never start
/// it suspended. Until then every command is silently dropped.
pub struct WebAudioSynth {
    ctx: Option<AudioContext>,
    /// Creation already failed once; stay silent without retrying
    unavailable: bool,
    mixer: Mixer,
    tone: Option<ToneNodes>,
    rng: Pcg32,
}

impl WebAudioSynth {
    pub fn new(mixer: Mixer, seed: u64) -> Self {
        Self {
            ctx: None,
            unavailable: false,
            mixer,
            tone: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create the context on first use inside a gesture handler
    fn unlock(&mut self) {
        if self.ctx.is_some() || self.unavailable {
            return;
        }
        // May fail outside a secure context or when audio is unsupported
        match AudioContext::new() {
            Ok(ctx) => {
                log::info!("Audio unlocked");
                self.ctx = Some(ctx);
            }
            Err(_) => {
                log::warn!("Failed to create AudioContext - audio disabled");
                self.unavailable = true;
            }
        }
    }

    /// Resume the context if the browser suspended it
    fn ensure_running(ctx: &AudioContext) {
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
    }

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Create a connected oscillator/gain pair
    fn create_osc(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}

impl Synth for WebAudioSynth {
    fn resume(&mut self) {
        self.unlock();
        if let Some(ctx) = &self.ctx {
            Self::ensure_running(ctx);
        }
    }

    fn play(&mut self, sound: &SoundParams) {
        let vol = self.mixer.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        Self::ensure_running(ctx);

        let mut samples = sound.render(&mut self.rng);
        if samples.is_empty() {
            return;
        }
        for s in samples.iter_mut() {
            *s *= vol;
        }

        let Ok(buffer) = ctx.create_buffer(1, samples.len() as u32, SAMPLE_RATE as f32) else {
            return;
        };
        if buffer.copy_to_channel(&mut samples, 0).is_err() {
            return;
        }
        let Ok(source) = ctx.create_buffer_source() else {
            return;
        };
        source.set_buffer(Some(&buffer));
        if source.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        // Node is released by the browser once it finishes
        source.start().ok();
    }

    fn start_tone(&mut self, tone: Tone) {
        self.stop_tone();
        let Some(ctx) = &self.ctx else { return };
        Self::ensure_running(ctx);

        let Some((osc, gain)) = Self::create_osc(ctx, tone.frequency, Self::oscillator_type(tone.waveform)) else {
            log::warn!("Could not create engine tone");
            return;
        };
        gain.gain().set_value(tone.gain * self.mixer.effective_volume());
        if osc.start().is_err() {
            return;
        }
        self.tone = Some(ToneNodes {
            osc,
            gain,
            time_constant: tone.time_constant as f64,
        });
    }

    fn retarget_tone(&mut self, frequency: f32, gain: f32) {
        let (Some(ctx), Some(tone)) = (&self.ctx, &self.tone) else {
            return;
        };
        let t = ctx.current_time();
        tone.osc
            .frequency()
            .set_target_at_time(frequency, t, tone.time_constant)
            .ok();
        tone.gain
            .gain()
            .set_target_at_time(gain * self.mixer.effective_volume(), t, tone.time_constant)
            .ok();
    }

    fn stop_tone(&mut self) {
        if let Some(tone) = self.tone.take() {
            tone.osc.stop().ok();
            tone.osc.disconnect().ok();
            tone.gain.disconnect().ok();
        }
    }
}

impl Drop for WebAudioSynth {
    fn drop(&mut self) {
        self.stop_tone();
        if let Some(ctx) = self.ctx.take() {
            let _ = ctx.close();
        }
    }
}
