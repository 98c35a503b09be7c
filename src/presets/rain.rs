use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::{event_count, non_negative, ordered, position, positive};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::filter;
use crate::noise;
use crate::synth::{accumulate, overlay, pi2, silence, time_of, Bandpass, SampleBuffer};

/// Drops are short decaying sines; a filtered pink bed fills the gaps between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainParams {
    pub density: f64,
    pub drop_freq_center: f64,
    pub drop_freq_variance: f64,
    pub impact_sharpness: f64,
    pub drops_per_second: f64,
    /// Drop pitches are clamped to this band, which also shapes the bed.
    pub drop_band: Bandpass,
    pub background_level: f64,
}

impl Default for RainParams {
    fn default() -> Self {
        RainParams {
            density: 0.7,
            drop_freq_center: 1200.0,
            drop_freq_variance: 300.0,
            impact_sharpness: 0.6,
            drops_per_second: 200.0,
            drop_band: (400.0, 2500.0),
            background_level: 0.3,
        }
    }
}

impl RainParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("rain.density", self.density)?;
        positive("rain.drop_freq_center", self.drop_freq_center)?;
        non_negative("rain.drop_freq_variance", self.drop_freq_variance)?;
        non_negative("rain.impact_sharpness", self.impact_sharpness)?;
        non_negative("rain.drops_per_second", self.drops_per_second)?;
        non_negative("rain.background_level", self.background_level)?;
        ordered("rain.drop_band", self.drop_band)
    }
}

pub fn render<R: Rng>(p: &RainParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut rain = silence(n_samples);
    let n_drops = event_count(p.density * p.drops_per_second, n_samples, sample_rate);
    let (low, high) = p.drop_band;
    let decay_rate = 20.0 + p.impact_sharpness * 30.0;

    for _ in 0..n_drops {
        let pos = position(n_samples, rng);
        let deviation: f64 = rng.sample(StandardNormal);
        let freq = (p.drop_freq_center + deviation * p.drop_freq_variance).max(low).min(high);
        // 20 to 40 ms
        let drop_len = ((sample_rate as f64 * 0.02 * (1.0 + rng.gen::<f64>())) as usize).min(n_samples - pos);
        let velocity = rng.gen::<f64>();
        let drop: Vec<f64> = Envelope::new(drop_len, sample_rate)
            .exp_decay(decay_rate)
            .iter()
            .enumerate()
            .map(|(i, d)| (pi2 * freq * time_of(i, sample_rate)).sin() * d * velocity)
            .collect();
        overlay(&mut rain, pos, &drop);
    }
    debug!("Scattered {} rain drops", n_drops);

    if p.background_level > 0.0 {
        let bed = noise::pink(n_samples, sample_rate, amplitude * p.background_level, rng)?;
        accumulate(&mut rain, &filter::band(&bed, sample_rate, p.drop_band)?, 1.0);
    }

    Ok(normalized(rain, amplitude))
}
