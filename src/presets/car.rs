use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_negative, ordered, positive};
use crate::analysis::volume::normalized;
use crate::error::Result;
use crate::filter;
use crate::modulate;
use crate::noise;
use crate::synth::{accumulate, silence, sine, Bandpass, SampleBuffer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    pub engine_rpm: f64,
    pub harmonic_count: usize,
    pub vibration_amount: f64,
    pub road_noise: f64,
    /// Hz
    pub vibrato_rate: f64,
    pub road_band: Bandpass,
    pub band: Bandpass,
}

impl Default for CarParams {
    fn default() -> Self {
        CarParams {
            engine_rpm: 1500.0,
            harmonic_count: 5,
            vibration_amount: 0.5,
            road_noise: 0.3,
            vibrato_rate: 5.0,
            road_band: (100.0, 500.0),
            band: (80.0, 400.0),
        }
    }
}

impl CarParams {
    pub fn validate(&self) -> Result<()> {
        positive("car.engine_rpm", self.engine_rpm)?;
        non_negative("car.vibration_amount", self.vibration_amount)?;
        non_negative("car.road_noise", self.road_noise)?;
        non_negative("car.vibrato_rate", self.vibrato_rate)?;
        ordered("car.road_band", self.road_band)?;
        ordered("car.band", self.band)
    }

    pub fn base_freq(&self) -> f64 {
        self.engine_rpm / 60.0
    }
}

/// Harmonic `h` of the engine at amplitude `1 / h`.
fn engine(base_freq: f64, harmonic_count: usize, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    let mut engine = silence(n_samples);
    for h in 1..=harmonic_count {
        accumulate(&mut engine, &sine(base_freq * h as f64, n_samples, sample_rate), 1.0 / h as f64);
    }
    engine
}

pub fn render<R: Rng>(p: &CarParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut car = engine(p.base_freq(), p.harmonic_count, n_samples, sample_rate);

    if p.vibration_amount > 0.0 {
        let vibrato: Vec<f64> = modulate::lfo(p.vibrato_rate, n_samples, sample_rate)
            .iter()
            .map(|v| 1.0 + v * p.vibration_amount * 0.1)
            .collect();
        modulate::apply(&mut car, &vibrato);
    }

    if p.road_noise > 0.0 {
        let road = noise::pink(n_samples, sample_rate, p.road_noise * 0.4, rng)?;
        accumulate(&mut car, &filter::band(&road, sample_rate, p.road_band)?, 1.0);
    }

    let car = filter::band(&car, sample_rate, p.band)?;
    Ok(normalized(car, amplitude))
}
