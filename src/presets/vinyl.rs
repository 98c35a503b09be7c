use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{event_count, non_negative, ordered, position};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::filter;
use crate::noise::{self, gaussian};
use crate::synth::{accumulate, overlay, silence, Bandpass, SampleBuffer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VinylParams {
    pub crackle_density: f64,
    pub crackles_per_second: f64,
    /// Large pops per second
    pub pop_frequency: f64,
    pub dust_noise: f64,
    pub band: Bandpass,
}

impl Default for VinylParams {
    fn default() -> Self {
        VinylParams { crackle_density: 0.5, crackles_per_second: 100.0, pop_frequency: 1.0, dust_noise: 0.3, band: (200.0, 4000.0) }
    }
}

impl VinylParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("vinyl.crackle_density", self.crackle_density)?;
        non_negative("vinyl.crackles_per_second", self.crackles_per_second)?;
        non_negative("vinyl.pop_frequency", self.pop_frequency)?;
        non_negative("vinyl.dust_noise", self.dust_noise)?;
        ordered("vinyl.band", self.band)
    }
}

pub fn render<R: Rng>(p: &VinylParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut vinyl = silence(n_samples);
    let sr = sample_rate as f64;

    // 2 to 4 ms of flat noise
    for _ in 0..event_count(p.crackle_density * p.crackles_per_second, n_samples, sample_rate) {
        let pos = position(n_samples, rng);
        let len = ((sr * 0.002 * (1.0 + rng.gen::<f64>())) as usize).min(n_samples - pos);
        let crackle: Vec<f64> = gaussian(len, rng).iter().map(|g| g * 0.3).collect();
        overlay(&mut vinyl, pos, &crackle);
    }

    let pop_samples = (sr * 0.01) as usize;
    let pop_envelope = Envelope::new(pop_samples, sample_rate).exp_decay(100.0);
    for _ in 0..event_count(p.pop_frequency, n_samples, sample_rate) {
        let pos = position(n_samples, rng);
        let pop: Vec<f64> = pop_envelope.iter().zip(gaussian(pop_samples, rng)).map(|(e, g)| g * e * 2.0).collect();
        overlay(&mut vinyl, pos, &pop);
    }

    if p.dust_noise > 0.0 {
        let dust = noise::pink(n_samples, sample_rate, p.dust_noise * 0.2, rng)?;
        accumulate(&mut vinyl, &dust, 1.0);
    }

    let vinyl = filter::band(&vinyl, sample_rate, p.band)?;
    Ok(normalized(vinyl, amplitude))
}
