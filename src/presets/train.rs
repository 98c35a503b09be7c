use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_negative, ordered, positive};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::filter;
use crate::noise::{self, gaussian};
use crate::synth::{accumulate, overlay, silence, Bandpass, SampleBuffer};

/// Wheel clicks land on a fixed grid, one every `1 / wheel_rhythm` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    /// Clicks per second
    pub wheel_rhythm: f64,
    pub rail_rumble: f64,
    pub mechanical_clank: f64,
    /// Seconds
    pub click_length: f64,
    pub click_decay: f64,
    pub rumble_band: Bandpass,
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams {
            wheel_rhythm: 2.5,
            rail_rumble: 0.7,
            mechanical_clank: 0.5,
            click_length: 0.05,
            click_decay: 40.0,
            rumble_band: (60.0, 300.0),
        }
    }
}

impl TrainParams {
    pub fn validate(&self) -> Result<()> {
        positive("train.wheel_rhythm", self.wheel_rhythm)?;
        non_negative("train.rail_rumble", self.rail_rumble)?;
        non_negative("train.mechanical_clank", self.mechanical_clank)?;
        non_negative("train.click_length", self.click_length)?;
        non_negative("train.click_decay", self.click_decay)?;
        ordered("train.rumble_band", self.rumble_band)
    }
}

/// Sample offsets of the wheel clicks.
fn click_positions(wheel_rhythm: f64, n_samples: usize, sample_rate: u32) -> Vec<usize> {
    if wheel_rhythm <= 0.0 {
        return vec![];
    }
    let period = sample_rate as f64 / wheel_rhythm;
    let duration = n_samples as f64 / sample_rate as f64;
    let n_clicks = (duration * wheel_rhythm) as usize;
    (0..n_clicks).map(|i| (i as f64 * period) as usize).filter(|&pos| pos < n_samples).collect()
}

pub fn render<R: Rng>(p: &TrainParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut train = silence(n_samples);
    let click_samples = (p.click_length * sample_rate as f64) as usize;
    let envelope = Envelope::new(click_samples, sample_rate).exp_decay(p.click_decay);

    for pos in click_positions(p.wheel_rhythm, n_samples, sample_rate) {
        let click: Vec<f64> = envelope
            .iter()
            .zip(gaussian(click_samples, rng))
            .map(|(e, g)| g * e * p.mechanical_clank)
            .collect();
        overlay(&mut train, pos, &click);
    }

    if p.rail_rumble > 0.0 {
        let rumble = noise::brown(n_samples, sample_rate, p.rail_rumble * 0.6, rng)?;
        accumulate(&mut train, &filter::band(&rumble, sample_rate, p.rumble_band)?, 1.0);
    }

    Ok(normalized(train, amplitude))
}
