use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_negative, positive};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::{Result, SynthError};
use crate::synth::{overlay, pi2, silence, time_of, SampleBuffer};

/// Each cricket chirps at its own pitch and period from a random phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CricketsParams {
    /// Chirps per second per cricket.
    pub chirp_rate: f64,
    pub cricket_count: usize,
    pub pitch_center: f64,
    pub pitch_variation: f64,
    /// Seconds
    pub chirp_length: f64,
    pub chirp_gain: f64,
}

impl Default for CricketsParams {
    fn default() -> Self {
        CricketsParams {
            chirp_rate: 3.0,
            cricket_count: 8,
            pitch_center: 5000.0,
            pitch_variation: 500.0,
            chirp_length: 0.05,
            chirp_gain: 0.3,
        }
    }
}

impl CricketsParams {
    pub fn validate(&self) -> Result<()> {
        positive("crickets.chirp_rate", self.chirp_rate)?;
        positive("crickets.pitch_center", self.pitch_center)?;
        non_negative("crickets.pitch_variation", self.pitch_variation)?;
        positive("crickets.chirp_length", self.chirp_length)?;
        non_negative("crickets.chirp_gain", self.chirp_gain)?;
        if self.pitch_variation >= self.pitch_center {
            return Err(SynthError::parameter("crickets.pitch_variation", "must stay below pitch_center"));
        }
        Ok(())
    }
}

pub fn render<R: Rng>(p: &CricketsParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut crickets = silence(n_samples);
    if p.chirp_rate <= 0.0 {
        return Ok(crickets);
    }

    let chirp_samples = (p.chirp_length * sample_rate as f64) as usize;
    let envelope = Envelope::new(chirp_samples, sample_rate).raised_cosine();

    for _ in 0..p.cricket_count {
        let pitch = p.pitch_center + (rng.gen::<f64>() - 0.5) * 2.0 * p.pitch_variation;
        // each cricket runs 20% fast or slow at most
        let period = ((sample_rate as f64 / p.chirp_rate) * (0.8 + rng.gen::<f64>() * 0.4)) as usize;
        let period = period.max(1);

        let chirp: Vec<f64> = envelope
            .iter()
            .enumerate()
            .map(|(i, e)| (pi2 * pitch * time_of(i, sample_rate)).sin() * e * p.chirp_gain)
            .collect();

        let mut pos = rng.gen_range(0..period);
        while pos < n_samples {
            overlay(&mut crickets, pos, &chirp);
            pos += period;
        }
    }

    Ok(normalized(crickets, amplitude))
}
