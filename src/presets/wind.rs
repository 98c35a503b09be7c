use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{non_negative, ordered};
use crate::analysis::volume::normalized;
use crate::error::Result;
use crate::filter;
use crate::modulate;
use crate::noise;
use crate::synth::{Bandpass, SampleBuffer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindParams {
    /// Hz
    pub gust_frequency: f64,
    pub wind_intensity: f64,
    pub modulation_depth: f64,
    pub band: Bandpass,
}

impl Default for WindParams {
    fn default() -> Self {
        WindParams { gust_frequency: 0.15, wind_intensity: 0.6, modulation_depth: 0.7, band: (100.0, 800.0) }
    }
}

impl WindParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("wind.gust_frequency", self.gust_frequency)?;
        non_negative("wind.wind_intensity", self.wind_intensity)?;
        non_negative("wind.modulation_depth", self.modulation_depth)?;
        ordered("wind.band", self.band)
    }
}

/// Gust gain in `[0.5, 0.5 + depth / 2]`.
fn gust_envelope(gust_frequency: f64, depth: f64, n_samples: usize, sample_rate: u32) -> SampleBuffer {
    modulate::unipolar(gust_frequency, n_samples, sample_rate).iter().map(|g| 0.5 + g * depth * 0.5).collect()
}

pub fn render<R: Rng>(p: &WindParams, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let wind = noise::pink(n_samples, sample_rate, p.wind_intensity, rng)?;
    let mut wind = filter::band(&wind, sample_rate, p.band)?;
    modulate::apply(&mut wind, &gust_envelope(p.gust_frequency, p.modulation_depth, n_samples, sample_rate));
    Ok(normalized(wind, amplitude))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::freq::band_share;
    use crate::analysis::volume::peak;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gust_envelope_bounds() {
        let env = gust_envelope(0.15, 0.7, 44100 * 10, 44100);
        assert!(env.iter().all(|&g| (0.5..=0.85 + 1e-12).contains(&g)));
        assert!(peak(&env) > 0.84);
    }

    #[test]
    fn test_wind_band() {
        let sr = 44100;
        let mut rng = StdRng::seed_from_u64(17);
        let wind = render(&WindParams::default(), sr as usize * 2, sr, 0.6, &mut rng).unwrap();
        assert!(band_share(&wind, sr, (50.0, 1500.0)) > 0.8);
    }
}
