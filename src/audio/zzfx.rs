//! ZzFX-style sound synthesis
//!
//! A sound is a fixed-order vector of up to 20 numbers. Omitted entries take
//! their defaults, so presets stay short:
//!
//! ```
//! use agro_arcade::zzfx;
//! let hit = zzfx![1.2, _, 359, 0.01, 0.08, 0.16, 1];
//! assert_eq!(hit.frequency, 359.0);
//! assert_eq!(hit.randomness, 0.05);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::consts::{MASTER_GAIN, SAMPLE_RATE};

/// Build [`SoundParams`] from a positional list; `_` keeps the default
#[macro_export]
macro_rules! zzfx {
    (@acc [$($out:expr),*]) => {
        $crate::audio::SoundParams::from_slots(&[$($out),*])
    };
    (@acc [$($out:expr),*] _ $(, $($rest:tt)*)?) => {
        $crate::zzfx!(@acc [$($out,)* None] $($($rest)*)?)
    };
    (@acc [$($out:expr),*] $v:literal $(, $($rest:tt)*)?) => {
        $crate::zzfx!(@acc [$($out,)* Some($v as f32)] $($($rest)*)?)
    };
    ($($t:tt)*) => {
        $crate::zzfx!(@acc [] $($t)*)
    };
}

/// Number of positional parameters
pub const PARAM_COUNT: usize = 20;

/// Synthesis parameters, in positional order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundParams {
    pub volume: f32,
    /// Random frequency spread (fraction)
    pub randomness: f32,
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub attack: f32,
    pub sustain: f32,
    pub release: f32,
    /// 0 sine, 1 triangle, 2 saw, 3 tan, 4 noise
    pub shape: f32,
    pub shape_curve: f32,
    pub slide: f32,
    pub delta_slide: f32,
    /// Hz added once after `pitch_jump_time`
    pub pitch_jump: f32,
    pub pitch_jump_time: f32,
    /// Seconds between frequency resets
    pub repeat_time: f32,
    pub noise: f32,
    pub modulation: f32,
    pub bit_crush: f32,
    /// Echo delay in seconds
    pub delay: f32,
    pub sustain_volume: f32,
    pub decay: f32,
    pub tremolo: f32,
}

impl Default for SoundParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn slot(slots: &[Option<f32>], i: usize, default: f32) -> f32 {
    if i < slots.len() {
        match slots[i] {
            Some(v) => v,
            None => default,
        }
    } else {
        default
    }
}

impl SoundParams {
    pub const DEFAULT: Self = Self {
        volume: 1.0,
        randomness: 0.05,
        frequency: 220.0,
        attack: 0.0,
        sustain: 0.0,
        release: 0.1,
        shape: 0.0,
        shape_curve: 1.0,
        slide: 0.0,
        delta_slide: 0.0,
        pitch_jump: 0.0,
        pitch_jump_time: 0.0,
        repeat_time: 0.0,
        noise: 0.0,
        modulation: 0.0,
        bit_crush: 0.0,
        delay: 0.0,
        sustain_volume: 1.0,
        decay: 0.0,
        tremolo: 0.0,
    };

    /// Positional constructor; missing or `None` entries use the defaults
    /// and anything past the 20th entry is ignored
    pub const fn from_slots(slots: &[Option<f32>]) -> Self {
        let d = Self::DEFAULT;
        Self {
            volume: slot(slots, 0, d.volume),
            randomness: slot(slots, 1, d.randomness),
            frequency: slot(slots, 2, d.frequency),
            attack: slot(slots, 3, d.attack),
            sustain: slot(slots, 4, d.sustain),
            release: slot(slots, 5, d.release),
            shape: slot(slots, 6, d.shape),
            shape_curve: slot(slots, 7, d.shape_curve),
            slide: slot(slots, 8, d.slide),
            delta_slide: slot(slots, 9, d.delta_slide),
            pitch_jump: slot(slots, 10, d.pitch_jump),
            pitch_jump_time: slot(slots, 11, d.pitch_jump_time),
            repeat_time: slot(slots, 12, d.repeat_time),
            noise: slot(slots, 13, d.noise),
            modulation: slot(slots, 14, d.modulation),
            bit_crush: slot(slots, 15, d.bit_crush),
            delay: slot(slots, 16, d.delay),
            sustain_volume: slot(slots, 17, d.sustain_volume),
            decay: slot(slots, 18, d.decay),
            tremolo: slot(slots, 19, d.tremolo),
        }
    }

    /// Same as [`from_slots`](Self::from_slots) for runtime vectors
    pub fn from_vector(values: &[Option<f32>]) -> Self {
        Self::from_slots(values)
    }

    /// Length of the rendered sound in samples
    pub fn sample_count(&self) -> usize {
        let sr = SAMPLE_RATE as f64;
        let attack = self.attack.max(0.0) as f64 * sr + 9.0;
        let rest = (self.decay.max(0.0) + self.sustain.max(0.0) + self.release.max(0.0) + self.delay.max(0.0)) as f64 * sr;
        (attack + rest) as usize
    }

    /// Synthesize mono samples at [`SAMPLE_RATE`]
    pub fn render<R: Rng>(&self, rng: &mut R) -> Vec<f32> {
        let sr = SAMPLE_RATE as f64;
        let p = |v: f32| v as f64;

        let volume = p(self.volume);
        let randomness = p(self.randomness);
        let shape = self.shape.round() as i32;
        let shape_curve = p(self.shape_curve);
        let noise = p(self.noise);
        let tremolo = p(self.tremolo);
        let sustain_volume = p(self.sustain_volume);

        let mut slide = p(self.slide) * 500.0 * TAU / (sr * sr);
        let start_slide = slide;
        let jitter = 1.0 + randomness * 2.0 * rng.random::<f64>() - randomness;
        let mut frequency = p(self.frequency) * jitter * TAU / sr;
        let mut start_frequency = frequency;

        let attack = p(self.attack.max(0.0)) * sr + 9.0;
        let decay = p(self.decay.max(0.0)) * sr;
        let sustain = p(self.sustain.max(0.0)) * sr;
        let release = p(self.release.max(0.0)) * sr;
        let delay = p(self.delay.max(0.0)) * sr;
        let delta_slide = p(self.delta_slide) * 500.0 * TAU / (sr * sr * sr);
        let modulation = p(self.modulation) * TAU / sr;
        let pitch_jump = p(self.pitch_jump) * TAU / sr;
        let pitch_jump_time = p(self.pitch_jump_time) * sr;
        let repeat_time = (p(self.repeat_time) * sr) as u64;
        let crush = (p(self.bit_crush) * 100.0) as u64;

        let length = (attack + decay + sustain + release + delay) as usize;
        let length_f = length as f64;
        let mut samples = vec![0.0f32; length];

        let mut t = 0.0f64;
        let mut tm = 0.0f64;
        let mut jump_counter: u64 = 1;
        let mut repeat_counter: u64 = 0;
        let mut crush_counter: u64 = 0;
        let mut s = 0.0f64;

        for i in 0..length {
            let fi = i as f64;
            crush_counter += 1;
            if crush == 0 || crush_counter % crush == 0 {
                s = match shape {
                    1 => 1.0 - 4.0 * ((t / TAU).round() - t / TAU).abs(),
                    2 => 1.0 - ((2.0 * t / TAU) % 2.0 + 2.0) % 2.0,
                    3 => t.tan().clamp(-1.0, 1.0),
                    4 => ((t % TAU).powi(3)).sin(),
                    _ => t.sin(),
                };

                let trem = if repeat_time > 0 {
                    1.0 - tremolo + tremolo * (TAU * fi / repeat_time as f64).sin()
                } else {
                    1.0
                };
                let envelope = if fi < attack {
                    fi / attack
                } else if fi < attack + decay {
                    1.0 - ((fi - attack) / decay) * (1.0 - sustain_volume)
                } else if fi < attack + decay + sustain {
                    sustain_volume
                } else if fi < length_f - delay {
                    (length_f - fi - delay) / release * sustain_volume
                } else {
                    0.0
                };
                s = trem * s.signum() * s.abs().powf(shape_curve) * volume * MASTER_GAIN as f64 * envelope;

                if delay > 0.0 {
                    let echo = if fi < delay {
                        0.0
                    } else {
                        let fade = if fi < length_f - delay {
                            1.0
                        } else {
                            (length_f - fi) / delay
                        };
                        fade * samples[(fi - delay) as usize] as f64 / 2.0
                    };
                    s = s / 2.0 + echo;
                }
            }
            samples[i] = s as f32;

            slide += delta_slide;
            frequency += slide;
            let f = frequency * (modulation * tm).cos();
            tm += 1.0;
            t += f - f * noise * (1.0 - ((fi.sin() + 1.0) * 1e9) % 2.0);

            if jump_counter > 0 {
                jump_counter += 1;
                if jump_counter as f64 > pitch_jump_time {
                    frequency += pitch_jump;
                    start_frequency += pitch_jump;
                    jump_counter = 0;
                }
            }

            if repeat_time > 0 {
                repeat_counter += 1;
                if repeat_counter % repeat_time == 0 {
                    frequency = start_frequency;
                    slide = start_slide;
                    if jump_counter == 0 {
                        jump_counter = 1;
                    }
                }
            }
        }

        samples
    }
}
