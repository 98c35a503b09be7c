//! Methods for creating slices of useful envelope shapes.
//! Intended to shape the short transients scattered by the event textures.

use crate::synth::{pi, pi2};

#[derive(Clone, Copy, Debug)]
pub struct Envelope {
    n: usize,
    sample_rate: u32,
}

impl Envelope {
    pub fn new(n: usize, sample_rate: u32) -> Envelope {
        Envelope { n, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn t(&self, i: usize) -> f64 {
        i as f64 / self.sample_rate as f64
    }

    /// `exp(-rate * t)`, starting at 1.
    pub fn exp_decay(&self, rate: f64) -> Vec<f64> {
        (0..self.n).map(|i| (-self.t(i) * rate).exp()).collect()
    }

    /// `exp(-t / time_constant)`, starting at 1.
    pub fn exp_time_constant(&self, time_constant: f64) -> Vec<f64> {
        if time_constant <= 0.0 {
            let mut impulse = vec![0f64; self.n];
            if let Some(first) = impulse.first_mut() {
                *first = 1.0;
            }
            return impulse;
        }
        self.exp_decay(1.0 / time_constant)
    }

    /// `sin^2(pi * t / T)` over the slice, zero at both ends.
    pub fn raised_cosine(&self) -> Vec<f64> {
        let n = self.n as f64;
        (0..self.n).map(|i| (pi * i as f64 / n).sin().powi(2)).collect()
    }

    /// Symmetric Hann window, peaking at 1 in the middle.
    pub fn hann(&self) -> Vec<f64> {
        match self.n {
            0 => vec![],
            1 => vec![1.0],
            n => {
                let m = (n - 1) as f64;
                (0..n).map(|i| 0.5 - 0.5 * (pi2 * i as f64 / m).cos()).collect()
            }
        }
    }
}
