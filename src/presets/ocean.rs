use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_negative, ordered};
use crate::analysis::volume::normalized;
use crate::error::Result;
use crate::filter;
use crate::modulate;
use crate::noise;
use crate::synth::{accumulate, Bandpass, SampleBuffer};

/// Brown surf under a wave swell, itself riding a slow tide. Foam follows the squared swell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanParams {
    /// Hz
    pub wave_frequency: f64,
    pub wave_depth: f64,
    pub foam_amount: f64,
    pub tide_variation: f64,
    /// Hz
    pub tide_frequency: f64,
    pub band: Bandpass,
    pub foam_band: Bandpass,
}

impl Default for OceanParams {
    fn default() -> Self {
        OceanParams {
            wave_frequency: 0.12,
            wave_depth: 0.8,
            foam_amount: 0.4,
            tide_variation: 0.3,
            tide_frequency: 0.02,
            band: (30.0, 500.0),
            foam_band: (800.0, 3000.0),
        }
    }
}

impl OceanParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("ocean.wave_frequency", self.wave_frequency)?;
        non_negative("ocean.wave_depth", self.wave_depth)?;
        non_negative("ocean.foam_amount", self.foam_amount)?;
        non_negative("ocean.tide_variation", self.tide_variation)?;
        non_negative("ocean.tide_frequency", self.tide_frequency)?;
        ordered("ocean.band", self.band)?;
        ordered("ocean.foam_band", self.foam_band)
    }
}

fn swell(p: &OceanParams, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    let wave = modulate::unipolar(p.wave_frequency, n_samples, sample_rate);
    let tide = modulate::lfo(p.tide_frequency, n_samples, sample_rate);
    wave.iter().zip(tide.iter()).map(|(w, t)| (0.6 + w * 0.4) * (1.0 + t * p.tide_variation)).collect()
}

pub fn render<R: Rng>(p: &OceanParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let envelope = swell(p, n_samples, sample_rate);

    let surf = noise::brown(n_samples, sample_rate, p.wave_depth, rng)?;
    let mut ocean = filter::band(&surf, sample_rate, p.band)?;
    modulate::apply(&mut ocean, &envelope);

    if p.foam_amount > 0.0 {
        let foam = noise::white(n_samples, sample_rate, p.foam_amount * 0.3, rng)?;
        let mut foam = filter::band(&foam, sample_rate, p.foam_band)?;
        let gate: Vec<f64> = envelope.iter().map(|e| e * e).collect();
        modulate::apply(&mut foam, &gate);
        accumulate(&mut ocean, &foam, 1.0);
    }

    Ok(normalized(ocean, amplitude))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::freq::band_energy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_swell_stays_positive() {
        let env = swell(&OceanParams::default(), 44100 * 60, 44100);
        // (0.6 .. 1.0) * (0.7 .. 1.3)
        assert!(env.iter().all(|&e| e >= 0.42 - 1e-12 && e <= 1.3 + 1e-12));
    }

    #[test]
    fn test_foam_adds_high_end() {
        let sr = 22050;
        let n = sr as usize * 2;
        let dry = OceanParams { foam_amount: 0.0, ..Default::default() };
        let a = render(&dry, n, sr, 0.7, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = render(&OceanParams::default(), n, sr, 0.7, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(band_energy(&b, sr, (800.0, 3000.0)) > band_energy(&a, sr, (800.0, 3000.0)) * 2.0);
    }
}
