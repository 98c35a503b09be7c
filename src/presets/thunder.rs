use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::{non_negative, ordered, position, positive};
use crate::analysis::volume::normalized;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::filter;
use crate::modulate;
use crate::synth::{overlay, pi2, silence, Bandpass, SampleBuffer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThunderParams {
    pub rumble_freq: f64,
    pub intensity: f64,
    /// Seconds. Both the strike length and its decay time constant.
    pub decay_time: f64,
    pub variation: f64,
    /// Seconds between strikes on average.
    pub strike_interval: f64,
    /// Hz of the pitch wobble inside a strike.
    pub wobble_rate: f64,
    pub band: Bandpass,
}

impl Default for ThunderParams {
    fn default() -> Self {
        ThunderParams {
            rumble_freq: 60.0,
            intensity: 0.8,
            decay_time: 2.5,
            variation: 0.5,
            strike_interval: 5.0,
            wobble_rate: 0.5,
            band: (20.0, 120.0),
        }
    }
}

impl ThunderParams {
    pub fn validate(&self) -> Result<()> {
        positive("thunder.rumble_freq", self.rumble_freq)?;
        non_negative("thunder.intensity", self.intensity)?;
        positive("thunder.decay_time", self.decay_time)?;
        non_negative("thunder.variation", self.variation)?;
        positive("thunder.strike_interval", self.strike_interval)?;
        non_negative("thunder.wobble_rate", self.wobble_rate)?;
        ordered("thunder.band", self.band)
    }
}

/// Number of strikes; always at least one.
fn strike_count(duration: f64, interval: f64) -> usize {
    if interval > 0.0 {
        (duration / interval) as usize + 1
    } else {
        1
    }
}

/// Strike starts, one per equal slot of the playable span. Each strike lands in the
/// first half of its slot, so consecutive strikes are at least half a slot apart.
fn strike_positions<R: Rng>(n_samples: usize, strike_samples: usize, n_strikes: usize, rng: &mut R) -> Vec<usize> {
    let slot = n_samples.saturating_sub(strike_samples) / n_strikes.max(1);
    (0..n_strikes).map(|k| k * slot + position(slot / 2, rng)).collect()
}

pub fn render<R: Rng>(p: &ThunderParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let mut thunder = silence(n_samples);
    let duration = n_samples as f64 / sample_rate as f64;
    let strike_samples = (p.decay_time * sample_rate as f64) as usize;
    let n_strikes = strike_count(duration, p.strike_interval);

    for pos in strike_positions(n_samples, strike_samples, n_strikes, rng) {
        let len = strike_samples.min(n_samples - pos);

        let freqs: Vec<f64> = modulate::lfo(p.wobble_rate, len, sample_rate)
            .iter()
            .map(|m| p.rumble_freq * (1.0 + p.variation * m))
            .collect();
        let phase = modulate::integrate_phase(&freqs, sample_rate);
        let envelope = Envelope::new(len, sample_rate).exp_time_constant(p.decay_time);

        let strike: Vec<f64> = phase
            .iter()
            .zip(envelope.iter())
            .map(|(ph, e)| {
                let grit: f64 = rng.sample(StandardNormal);
                let env = e * p.intensity;
                (pi2 * ph).sin() * env + grit * env * 0.3
            })
            .collect();
        overlay(&mut thunder, pos, &strike);
    }
    debug!("Placed {} thunder strikes", n_strikes);

    let thunder = filter::band(&thunder, sample_rate, p.band)?;
    Ok(normalized(thunder, amplitude))
}
