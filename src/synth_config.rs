use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::{Result, SynthError};
use crate::presets::SoundLayer;
use crate::synth::{nyquist, samples_of_duration, Bandpass};

/// Global settings for one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub sample_rate: u32,
    /// Seconds
    pub duration: f64,
    pub master_amplitude: f64,
    pub stereo: bool,
    /// Fixes every random draw of the run. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100,
            duration: 30.0,
            master_amplitude: 0.7,
            stereo: true,
            seed: None,
        }
    }
}

impl SynthConfig {
    pub fn new(sample_rate: u32, duration: f64, master_amplitude: f64, stereo: bool, seed: Option<u64>) -> SynthConfig {
        SynthConfig {
            sample_rate,
            duration,
            master_amplitude,
            stereo,
            seed,
        }
    }

    /// Rejects settings that cannot describe a finite buffer.
    /// Runs before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(SynthError::InvalidDuration(self.duration));
        }
        check_unit("master_amplitude", self.master_amplitude)?;
        if self.n_samples() == 0 {
            return Err(SynthError::InvalidDuration(self.duration));
        }
        Ok(())
    }

    pub fn n_samples(&self) -> usize {
        samples_of_duration(self.duration, self.sample_rate)
    }

    pub fn nyquist(&self) -> f64 {
        nyquist(self.sample_rate)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// One natural or hybrid sound layer of the mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub sound: SoundLayer,
    pub enabled: bool,
    pub weight: f64,
    pub freq_range: Bandpass,
    pub naturalness: f64,
}

impl LayerConfig {
    /// An enabled layer at half weight, using the catalog's band and naturalness.
    pub fn new(sound: SoundLayer) -> LayerConfig {
        let entry = catalog::lookup(sound.name());
        let (freq_range, naturalness) = match entry {
            Some(e) => (e.freq_range, e.naturalness_default),
            None => ((20.0, 20000.0), 0.5),
        };
        LayerConfig {
            sound,
            enabled: true,
            weight: 0.5,
            freq_range,
            naturalness,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_naturalness(mut self, naturalness: f64) -> Self {
        self.naturalness = naturalness;
        self
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.freq_range = (low, high);
        self
    }

    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        let label = self.sound.name();
        check_unit(label, self.weight)?;
        check_unit(label, self.naturalness)?;
        check_band(label, self.freq_range, sample_rate)?;
        self.sound.validate()
    }
}

pub(crate) fn check_unit(label: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SynthError::InvalidAmplitude { label: label.to_string(), value });
    }
    Ok(())
}

/// Both edges must sit strictly inside (0, nyquist) with `low < high`.
pub(crate) fn check_band(label: &str, (low, high): Bandpass, sample_rate: u32) -> Result<()> {
    let nyq = nyquist(sample_rate);
    if !(low > 0.0 && high < nyq && low < high) {
        return Err(SynthError::range(label, low, high));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_validate_rejects_zero_sample_rate() {
        let config = SynthConfig { sample_rate: 0, ..SynthConfig::default() };
        assert_eq!(config.validate(), Err(SynthError::InvalidSampleRate(0)));
    }

    #[test]
    fn test_validate_rejects_bad_duration() {
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SynthConfig { duration, ..SynthConfig::default() };
            assert!(matches!(config.validate(), Err(SynthError::InvalidDuration(_))));
        }
    }

    #[test]
    fn test_validate_rejects_loud_master() {
        let config = SynthConfig { master_amplitude: 1.5, ..SynthConfig::default() };
        assert!(matches!(config.validate(), Err(SynthError::InvalidAmplitude { .. })));
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let config = SynthConfig { seed: Some(7), ..SynthConfig::default() };
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layer_defaults_come_from_catalog() {
        let layer = LayerConfig::new(SoundLayer::Thunder(Default::default()));
        assert_eq!(layer.freq_range, (20.0, 120.0));
        assert!(layer.validate(44100).is_ok());
    }

    #[test]
    fn test_layer_band_must_fit_nyquist() {
        let layer = LayerConfig::new(SoundLayer::Crickets(Default::default()));
        assert!(layer.validate(8000).is_err());
        let inverted = layer.with_range(500.0, 100.0);
        assert!(inverted.validate(44100).is_err());
    }
}
