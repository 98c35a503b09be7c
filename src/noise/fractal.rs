//! Multi-octave interpolated noise, a light stand-in for Perlin noise.
//!
//! Octave `k` draws `len / 2^k` gaussian points, stretches them to full length by
//! linear interpolation and contributes at amplitude `0.5^k`. The sum is normalized
//! to a peak of 0.5.

use rand::Rng;

use super::gaussian;
use crate::analysis::volume::normalized;
use crate::synth::SampleBuffer;

pub const FRACTAL_PEAK: f64 = 0.5;

/// Linearly stretch `points` across `n_samples`, first and last point pinned to the ends.
pub fn stretch(points: &[f64], n_samples: usize) -> SampleBuffer {
    if points.is_empty() || n_samples == 0 {
        return vec![0f64; n_samples];
    }
    if points.len() == 1 || n_samples == 1 {
        return vec![points[0]; n_samples];
    }

    let span = (points.len() - 1) as f64;
    let step = span / (n_samples - 1) as f64;
    (0..n_samples)
        .map(|i| {
            let x = i as f64 * step;
            let j = (x.floor() as usize).min(points.len() - 2);
            let frac = x - j as f64;
            points[j] + (points[j + 1] - points[j]) * frac
        })
        .collect()
}

pub fn fractal<R: Rng>(n_samples: usize, octaves: usize, rng: &mut R) -> SampleBuffer {
    let mut result = vec![0f64; n_samples];
    let mut amplitude = 1f64;
    let mut divisor = 1f64;

    for _ in 0..octaves {
        let noise_len = ((n_samples as f64 / divisor) as usize).max(2);
        let layer = stretch(&gaussian(noise_len, rng), n_samples);
        result.iter_mut().zip(layer.iter()).for_each(|(r, l)| *r += l * amplitude);
        amplitude *= 0.5;
        divisor *= 2.0;
    }

    normalized(result, FRACTAL_PEAK)
}
