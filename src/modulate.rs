//! Low frequency modulators and the helpers that apply them.

use crate::synth::{pi2, sine, SampleBuffer};

/// Bipolar sine LFO in [-1, 1].
pub fn lfo(freq: f64, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    sine(freq, n_samples, sample_rate)
}

/// Unipolar sine LFO `(1 + sin) / 2` in [0, 1].
pub fn unipolar(freq: f64, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    lfo(freq, n_samples, sample_rate).into_iter().map(|x| (1.0 + x) / 2.0).collect()
}

/// Running phase, in cycles, of an instantaneous frequency curve given in Hz.
pub fn integrate_phase(freqs: &[f64], sample_rate: u32) -> SampleBuffer {
    let sr = sample_rate as f64;
    freqs
        .iter()
        .scan(0f64, |acc, f| {
            *acc += f;
            Some(*acc / sr)
        })
        .collect()
}

/// Sine wave following a phase curve given in cycles.
pub fn sine_of_phase(phase: &[f64]) -> SampleBuffer {
    phase.iter().map(|p| (pi2 * p).sin()).collect()
}

/// Multiply `signal` by `modulator` sample by sample.
/// A shorter modulator leaves the tail of the signal untouched.
pub fn apply(signal: &mut [f64], modulator: &[f64]) {
    signal.iter_mut().zip(modulator.iter()).for_each(|(s, m)| *s *= m);
}
