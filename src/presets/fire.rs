use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{event_count, non_negative, ordered, position};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::filter;
use crate::noise::{self, gaussian};
use crate::synth::{accumulate, overlay, silence, Bandpass, SampleBuffer};

/// Crackles are bursts of decaying noise over a pink roar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireParams {
    pub crackle_density: f64,
    pub pop_intensity: f64,
    pub roar_level: f64,
    pub crackles_per_second: f64,
    pub roar_band: Bandpass,
    pub band: Bandpass,
}

impl Default for FireParams {
    fn default() -> Self {
        FireParams {
            crackle_density: 0.6,
            pop_intensity: 0.7,
            roar_level: 0.4,
            crackles_per_second: 30.0,
            roar_band: (200.0, 2000.0),
            band: (800.0, 5000.0),
        }
    }
}

impl FireParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("fire.crackle_density", self.crackle_density)?;
        non_negative("fire.pop_intensity", self.pop_intensity)?;
        non_negative("fire.roar_level", self.roar_level)?;
        non_negative("fire.crackles_per_second", self.crackles_per_second)?;
        ordered("fire.roar_band", self.roar_band)?;
        ordered("fire.band", self.band)
    }
}

pub fn render<R: Rng>(p: &FireParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut fire = silence(n_samples);
    let n_crackles = event_count(p.crackle_density * p.crackles_per_second, n_samples, sample_rate);

    for _ in 0..n_crackles {
        let pos = position(n_samples, rng);
        // 10 to 60 ms
        let len = ((sample_rate as f64 * (0.01 + rng.gen::<f64>() * 0.05)) as usize).min(n_samples - pos);
        let decay = 30.0 + rng.gen::<f64>() * 50.0;
        let gain = p.pop_intensity;
        let crackle: Vec<f64> = Envelope::new(len, sample_rate)
            .exp_decay(decay)
            .iter()
            .zip(gaussian(len, rng))
            .map(|(e, g)| g * e * gain)
            .collect();
        overlay(&mut fire, pos, &crackle);
    }

    if p.roar_level > 0.0 {
        let roar = noise::pink(n_samples, sample_rate, p.roar_level * 0.5, rng)?;
        accumulate(&mut fire, &filter::band(&roar, sample_rate, p.roar_band)?, 1.0);
    }

    let fire = filter::band(&fire, sample_rate, p.band)?;
    Ok(normalized(fire, amplitude))
}
