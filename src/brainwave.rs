//! Tones and noise bands in the psychoacoustic brainwave ranges.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::volume::normalized;
use crate::error::{Result, SynthError};
use crate::filter;
use crate::modulate;
use crate::noise;
use crate::synth::{sine, Bandpass, SampleBuffer};

/// Depth of the slow amplitude modulation in tone mode.
pub const TONE_MOD_DEPTH: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveBand {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl BrainwaveBand {
    pub fn variants() -> Vec<BrainwaveBand> {
        vec![BrainwaveBand::Delta, BrainwaveBand::Theta, BrainwaveBand::Alpha, BrainwaveBand::Beta, BrainwaveBand::Gamma]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrainwaveBand::Delta => "delta",
            BrainwaveBand::Theta => "theta",
            BrainwaveBand::Alpha => "alpha",
            BrainwaveBand::Beta => "beta",
            BrainwaveBand::Gamma => "gamma",
        }
    }

    pub fn center_freq(&self) -> f64 {
        match self {
            BrainwaveBand::Delta => 2.0,
            BrainwaveBand::Theta => 6.0,
            BrainwaveBand::Alpha => 10.0,
            BrainwaveBand::Beta => 20.0,
            BrainwaveBand::Gamma => 40.0,
        }
    }

    pub fn freq_range(&self) -> Bandpass {
        match self {
            BrainwaveBand::Delta => (0.5, 4.0),
            BrainwaveBand::Theta => (4.0, 8.0),
            BrainwaveBand::Alpha => (8.0, 13.0),
            BrainwaveBand::Beta => (13.0, 30.0),
            BrainwaveBand::Gamma => (30.0, 100.0),
        }
    }

    /// Rate in Hz of the tone mode amplitude modulation.
    pub fn mod_rate(&self) -> f64 {
        match self {
            BrainwaveBand::Delta => 0.1,
            BrainwaveBand::Theta => 0.15,
            BrainwaveBand::Alpha => 0.2,
            BrainwaveBand::Beta => 0.25,
            BrainwaveBand::Gamma => 0.3,
        }
    }

    pub fn default_amplitude(&self) -> f64 {
        match self {
            BrainwaveBand::Alpha => 0.4,
            BrainwaveBand::Gamma => 0.2,
            _ => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveMode {
    /// Modulated sine at the center frequency.
    Tone,
    /// Pink noise confined to the band.
    Boost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainwaveConfig {
    pub band: BrainwaveBand,
    #[serde(default)]
    pub enabled: bool,
    pub freq_range: Bandpass,
    pub center_freq: f64,
    pub amplitude: f64,
    pub mode: BrainwaveMode,
}

impl BrainwaveConfig {
    /// Disabled tone with the band's constants.
    pub fn new(band: BrainwaveBand) -> BrainwaveConfig {
        BrainwaveConfig {
            band,
            enabled: false,
            freq_range: band.freq_range(),
            center_freq: band.center_freq(),
            amplitude: band.default_amplitude(),
            mode: BrainwaveMode::Tone,
        }
    }

    pub fn enable(mut self) -> Self {
        self.enabled = true;
        self
    }

    pub fn with_mode(mut self, mode: BrainwaveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (low, high) = self.freq_range;
        if !(low > 0.0 && low < high) {
            return Err(SynthError::range(self.band.name(), low, high));
        }
        if !(low <= self.center_freq && self.center_freq <= high) {
            return Err(SynthError::parameter(
                self.band.name(),
                format!("center_freq {} lies outside ({}, {})", self.center_freq, low, high),
            ));
        }
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(SynthError::InvalidAmplitude { label: self.band.name().to_string(), value: self.amplitude });
        }
        Ok(())
    }
}

/// One channel of the configured band, `n_samples` long.
pub fn generate<R: Rng>(config: &BrainwaveConfig, n_samples: usize, sample_rate: u32, rng: &mut R) -> Result<SampleBuffer> {
    match config.mode {
        BrainwaveMode::Tone => {
            let mut tone = sine(config.center_freq, n_samples, sample_rate);
            let modulator: Vec<f64> = modulate::lfo(config.band.mod_rate(), n_samples, sample_rate)
                .iter()
                .map(|m| 1.0 + m * TONE_MOD_DEPTH)
                .collect();
            modulate::apply(&mut tone, &modulator);
            Ok(normalized(tone, config.amplitude))
        }
        BrainwaveMode::Boost => {
            debug!("Boosting {} band {:?} Hz", config.band.name(), config.freq_range);
            // left at the filter's output level
            let bed = noise::pink(n_samples, sample_rate, config.amplitude, rng)?;
            filter::band(&bed, sample_rate, config.freq_range)
        }
    }
}
