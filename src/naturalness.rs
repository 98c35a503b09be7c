//! Post processing that makes synthetic layers sound less synthetic.
//!
//! A single `naturalness` level in [0, 1] scales a fixed sequence of stages:
//!
//! | level | stages active |
//! |-------|---------------|
//! | 0     | none, the signal is returned as is |
//! | > 0   | amplitude jitter, pitch wobble, amplitude envelope, spectral tilt |
//! | > 0.5 | granular overlay |
//! | > 0.6 | timing jitter |
//! | > 0.7 | fractal overlay |
//!
//! The result is renormalized to 1.1x the input peak to leave room for the added texture.

use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::analysis::volume::{normalized, peak};
use crate::envelope::Envelope;
use crate::error::{Result, SynthError};
use crate::filter;
use crate::modulate;
use crate::noise::{fractal::fractal, gaussian};
use crate::synth::{nyquist, overlay, pi2, SampleBuffer};

pub const GRANULAR_THRESHOLD: f64 = 0.5;
pub const JITTER_THRESHOLD: f64 = 0.6;
pub const FRACTAL_THRESHOLD: f64 = 0.7;
pub const MAX_GRAINS: usize = 100;
pub const HEADROOM: f64 = 1.1;

/// Sub-parameters shared by every call. They scale the naturalness level, never replace it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaturalnessParams {
    pub randomness_amount: f64,
    /// Hz
    pub freq_mod_depth: f64,
    /// Hz
    pub freq_mod_rate: f64,
    pub amp_variation_amount: f64,
    /// Milliseconds
    pub grain_size: f64,
    /// Milliseconds
    pub micro_timing_jitter: f64,
    pub texture_layers: usize,
    pub perlin_octaves: usize,
    /// dB per octave, signed
    pub spectral_tilt: f64,
}

impl Default for NaturalnessParams {
    fn default() -> Self {
        NaturalnessParams {
            randomness_amount: 0.3,
            freq_mod_depth: 10.0,
            freq_mod_rate: 0.5,
            amp_variation_amount: 0.15,
            grain_size: 50.0,
            micro_timing_jitter: 5.0,
            texture_layers: 2,
            perlin_octaves: 4,
            spectral_tilt: -3.0,
        }
    }
}

impl NaturalnessParams {
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("randomness_amount", self.randomness_amount),
            ("freq_mod_depth", self.freq_mod_depth),
            ("freq_mod_rate", self.freq_mod_rate),
            ("amp_variation_amount", self.amp_variation_amount),
            ("grain_size", self.grain_size),
            ("micro_timing_jitter", self.micro_timing_jitter),
        ];
        for (label, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(SynthError::parameter(label, format!("{} must be a finite non-negative number", value)));
            }
        }
        if !self.spectral_tilt.is_finite() {
            return Err(SynthError::parameter("spectral_tilt", "must be finite"));
        }
        Ok(())
    }
}

/// Per-sample gain `1 + N(0, 1) * randomness * naturalness * 0.1`.
fn amplitude_jitter<R: Rng>(signal: &mut [f64], amount: f64, rng: &mut R) {
    signal.iter_mut().for_each(|x| {
        let n: f64 = rng.sample(StandardNormal);
        *x *= 1.0 + n * amount * 0.1;
    });
}

/// Approximates a pitch wobble with a small multiplicative sine driven by an integrated LFO.
fn frequency_wobble(signal: &mut [f64], sample_rate: u32, rate: f64, depth: f64) {
    let freq_shift: Vec<f64> = modulate::lfo(rate, signal.len(), sample_rate).iter().map(|m| m * depth).collect();
    let phase = modulate::integrate_phase(&freq_shift, sample_rate);
    let wobble: Vec<f64> = phase.iter().map(|p| 1.0 + 0.01 * (pi2 * p).sin()).collect();
    modulate::apply(signal, &wobble);
}

/// Sum of randomly placed Hann-windowed noise grains.
fn grain_layer<R: Rng>(n_samples: usize, grain_samples: usize, intensity: f64, rng: &mut R) -> SampleBuffer {
    let mut layer = vec![0f64; n_samples];
    let n_grains = (n_samples / (grain_samples / 2).max(1)).max(1).min(MAX_GRAINS);
    let window = Envelope::new(grain_samples, 1).hann();

    for _ in 0..n_grains {
        let pos = rng.gen_range(0..n_samples.saturating_sub(grain_samples).max(1));
        let grain: Vec<f64> = window
            .iter()
            .zip(gaussian(grain_samples, rng))
            .map(|(w, g)| w * g * 0.1 * intensity)
            .collect();
        overlay(&mut layer, pos, &grain);
    }
    layer
}

/// Sum of `n_layers` independent grain layers at a combined 0.3 gain.
/// Each layer is scaled by `1 / sqrt(n_layers)` so the texture level does not
/// depend on the layer count.
fn granular<R: Rng>(n_samples: usize, grain_samples: usize, intensity: f64, n_layers: usize, rng: &mut R) -> SampleBuffer {
    let n_layers = n_layers.max(1);
    let gain = 0.3 / (n_layers as f64).sqrt();
    let mut texture = vec![0f64; n_samples];
    for _ in 0..n_layers {
        let layer = grain_layer(n_samples, grain_samples, intensity, rng);
        texture.iter_mut().zip(layer.iter()).for_each(|(t, g)| *t += g * gain);
    }
    texture
}

/// Apply the naturalness stages to `signal`.
///
/// `naturalness <= 0` is an exact identity.
pub fn apply_naturalness<R: Rng>(
    signal: &[f64], sample_rate: u32, naturalness: f64, params: &NaturalnessParams, rng: &mut R,
) -> Result<SampleBuffer> {
    if naturalness <= 0.0 {
        return Ok(signal.to_vec());
    }

    let n_samples = signal.len();
    let mut result = signal.to_vec();

    if params.randomness_amount > 0.0 {
        amplitude_jitter(&mut result, params.randomness_amount * naturalness, rng);
    }

    if params.freq_mod_depth > 0.0 && params.freq_mod_rate > 0.0 {
        frequency_wobble(&mut result, sample_rate, params.freq_mod_rate, params.freq_mod_depth * naturalness);
    }

    if params.amp_variation_amount > 0.0 {
        let env_freq = 0.1 + rng.gen::<f64>() * 0.5;
        let depth = params.amp_variation_amount * naturalness;
        let envelope: Vec<f64> = modulate::lfo(env_freq, n_samples, sample_rate).iter().map(|m| 1.0 + depth * m).collect();
        modulate::apply(&mut result, &envelope);
    }

    let grain_samples = (params.grain_size * sample_rate as f64 / 1000.0) as usize;
    if naturalness > GRANULAR_THRESHOLD && grain_samples > 0 && n_samples > 0 {
        let intensity = (naturalness - GRANULAR_THRESHOLD) * 2.0;
        let texture = granular(n_samples, grain_samples, intensity, params.texture_layers, rng);
        result.iter_mut().zip(texture.iter()).for_each(|(r, g)| *r += g);
    }

    if params.micro_timing_jitter > 0.0 && naturalness > JITTER_THRESHOLD && n_samples > 0 {
        let jitter_seconds = params.micro_timing_jitter * naturalness / 1000.0;
        let max_shift = (jitter_seconds * sample_rate as f64) as i64;
        if max_shift > 0 {
            let shift = rng.gen_range(-max_shift..=max_shift);
            let k = shift.rem_euclid(n_samples as i64) as usize;
            result.rotate_right(k);
            debug!("Timing jitter shifted the signal by {} samples", shift);
        }
    }

    if naturalness > FRACTAL_THRESHOLD && params.perlin_octaves > 0 {
        let gain = 0.05 * (naturalness - FRACTAL_THRESHOLD) * 3.33;
        let texture = fractal(n_samples, params.perlin_octaves, rng);
        result.iter_mut().zip(texture.iter()).for_each(|(r, t)| *r += t * gain);
    }

    if params.spectral_tilt != 0.0 {
        let tilted = filter::band(&result, sample_rate, (100.0, 0.95 * nyquist(sample_rate)))?;
        let tilt_factor = (params.spectral_tilt / 12.0 * naturalness).clamp(-1.0, 1.0);
        let dry = 1.0 - tilt_factor.abs() * 0.3;
        result = result.iter().zip(tilted.iter()).map(|(r, t)| r * dry + t * tilt_factor * 0.3).collect();
    }

    Ok(normalized(result, peak(signal) * HEADROOM))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::synth::sine;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static SR: u32 = 44100;

    fn tone() -> SampleBuffer {
        sine(440.0, SR as usize, SR).into_iter().map(|x| x * 0.5).collect()
    }

    #[test]
    fn test_zero_naturalness_is_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let signal = tone();
        let out = apply_naturalness(&signal, SR, 0.0, &NaturalnessParams::default(), &mut rng).unwrap();
        assert_eq!(out, signal);
        let out = apply_naturalness(&signal, SR, -0.3, &NaturalnessParams::default(), &mut rng).unwrap();
        assert_eq!(out, signal);
    }

    #[test]
    fn test_output_peak_has_headroom() {
        let signal = tone();
        for level in [0.2, 0.55, 0.65, 0.9, 1.0] {
            let mut rng = StdRng::seed_from_u64(42);
            let out = apply_naturalness(&signal, SR, level, &NaturalnessParams::default(), &mut rng).unwrap();
            assert_eq!(out.len(), signal.len());
            assert_relative_eq!(peak(&out), peak(&signal) * HEADROOM, epsilon = 1e-9);
            assert_ne!(out, signal);
        }
    }

    #[test]
    fn test_same_seed_same_texture() {
        let signal = tone();
        let params = NaturalnessParams::default();
        let a = apply_naturalness(&signal, SR, 0.9, &params, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = apply_naturalness(&signal, SR, 0.9, &params, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut rng = StdRng::seed_from_u64(4);
        let out = apply_naturalness(&vec![0.0; 4096], SR, 1.0, &NaturalnessParams::default(), &mut rng).unwrap();
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_grain_layer_is_bounded() {
        let mut rng = StdRng::seed_from_u64(6);
        let layer = grain_layer(1000, 2205, 1.0, &mut rng);
        assert_eq!(layer.len(), 1000);
        let layer = grain_layer(44100, 2205, 0.0, &mut rng);
        assert!(layer.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_granular_level_ignores_layer_count() {
        let n = 88200;
        let mut rng = StdRng::seed_from_u64(21);
        let one = crate::analysis::volume::rms(&granular(n, 2205, 1.0, 1, &mut rng));
        let four = crate::analysis::volume::rms(&granular(n, 2205, 1.0, 4, &mut rng));
        let ratio = four / one;
        assert!(ratio > 0.75 && ratio < 1.33, "four layers at {} of one", ratio);
    }

    #[test]
    fn test_params_reject_negative_values() {
        let params = NaturalnessParams { grain_size: -1.0, ..Default::default() };
        assert!(params.validate().is_err());
        let params = NaturalnessParams { spectral_tilt: 6.0, ..Default::default() };
        assert!(params.validate().is_ok());
    }
}
