//! Shared constants and buffer helpers for the synthesis pipeline.
//!
//! Every generator works on a mono `SampleBuffer` whose length is fixed up front
//! by `samples_of_duration`. Time values are derived from the sample index so long
//! renders do not accumulate phase error.

pub const pi: f64 = std::f64::consts::PI;
pub const pi2: f64 = pi * 2f64;

/// Sample values, nominally in -1 to 1
pub type SampleBuffer = Vec<f64>;

/// A (low, high) pair of frequencies in Hz
pub type Bandpass = (f64, f64);

/// Number of samples covering `duration` seconds at `sample_rate`.
pub fn samples_of_duration(duration: f64, sample_rate: u32) -> usize {
    (duration * sample_rate as f64).round().max(0f64) as usize
}

pub fn nyquist(sample_rate: u32) -> f64 {
    sample_rate as f64 / 2f64
}

/// Time in seconds of sample `i`.
#[inline]
pub fn time_of(i: usize, sample_rate: u32) -> f64 {
    i as f64 / sample_rate as f64
}

pub fn silence(n_samples: usize) -> SampleBuffer {
    vec![0f64; n_samples]
}

/// A unit sine at `freq` Hz.
pub fn sine(freq: f64, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    (0..n_samples).map(|i| (pi2 * freq * time_of(i, sample_rate)).sin()).collect()
}

/// Add `burst` into `dest` starting at `pos`, dropping whatever runs past the end.
pub fn overlay(dest: &mut [f64], pos: usize, burst: &[f64]) {
    if pos >= dest.len() {
        return;
    }
    dest[pos..].iter_mut().zip(burst.iter()).for_each(|(d, b)| *d += b);
}

/// Sample-wise sum of `source * gain` into `dest`.
pub fn accumulate(dest: &mut [f64], source: &[f64], gain: f64) {
    dest.iter_mut().zip(source.iter()).for_each(|(d, s)| *d += s * gain);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_samples_of_duration_rounds() {
        assert_eq!(samples_of_duration(1.0, 44100), 44100);
        assert_eq!(samples_of_duration(0.5, 3), 2);
        assert_eq!(samples_of_duration(0.001, 44100), 44);
    }

    #[test]
    fn test_overlay_truncates_at_end() {
        let mut dest = vec![0f64; 4];
        overlay(&mut dest, 2, &[1.0, 1.0, 1.0]);
        assert_eq!(dest, vec![0.0, 0.0, 1.0, 1.0]);

        overlay(&mut dest, 10, &[1.0]);
        assert_eq!(dest, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let s = sine(1.0, 4, 4);
        assert!(s[0].abs() < 1e-12);
        assert!((s[1] - 1.0).abs() < 1e-12);
    }
}
