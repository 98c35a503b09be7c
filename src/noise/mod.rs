//! Spectrally shaped noise.
//!
//! Colored noise starts from uncorrelated gaussian samples, moves to the frequency
//! domain, scales each bin by the color's power law and comes back. The two
//! band-limited colors (gray and green) are produced with the filter primitive instead.
//!
//! Every output is normalized to the requested peak.

pub mod fractal;

use log::warn;
use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::volume::normalized;
use crate::error::Result;
use crate::filter::{bandpass, FilterMode, DEFAULT_ORDER};
use crate::synth::{nyquist, SampleBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
    Blue,
    Violet,
    Gray,
    Green,
}

impl NoiseColor {
    pub fn variants() -> Vec<NoiseColor> {
        vec![
            NoiseColor::White,
            NoiseColor::Pink,
            NoiseColor::Brown,
            NoiseColor::Blue,
            NoiseColor::Violet,
            NoiseColor::Gray,
            NoiseColor::Green,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseColor::White => "white",
            NoiseColor::Pink => "pink",
            NoiseColor::Brown => "brown",
            NoiseColor::Blue => "blue",
            NoiseColor::Violet => "violet",
            NoiseColor::Gray => "gray",
            NoiseColor::Green => "green",
        }
    }

    /// Resolve a noise name. Unknown names degrade to white noise.
    pub fn from_name(name: &str) -> NoiseColor {
        match NoiseColor::variants().into_iter().find(|c| c.name() == name) {
            Some(color) => color,
            None => {
                warn!("Unknown noise type '{}', falling back to white", name);
                NoiseColor::White
            }
        }
    }

    /// Magnitude exponent applied per bin: the bin at frequency `f` scales by `f^exponent`.
    /// `None` for the colors that are filtered rather than spectrally shaped.
    pub fn exponent(&self) -> Option<f64> {
        match self {
            NoiseColor::White => Some(0.0),
            NoiseColor::Pink => Some(-0.5),
            NoiseColor::Brown => Some(-1.0),
            NoiseColor::Blue => Some(0.5),
            NoiseColor::Violet => Some(1.0),
            NoiseColor::Gray | NoiseColor::Green => None,
        }
    }
}

/// Names read from a config go through `from_name`, so an unknown color mixes as white.
impl<'de> Deserialize<'de> for NoiseColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(NoiseColor::from_name(&name))
    }
}

/// Mapping of technical noise colors to their enable flag.
pub type NoiseTypeSet = std::collections::BTreeMap<NoiseColor, bool>;

/// Uncorrelated unit-variance gaussian samples.
pub fn gaussian<R: Rng>(n_samples: usize, rng: &mut R) -> SampleBuffer {
    (0..n_samples).map(|_| rng.sample::<f64, _>(StandardNormal)).collect()
}

/// Scale the spectrum of `signal` by `f^exponent`.
/// The DC bin borrows the gain of the first non-zero bin.
pub fn power_law(signal: &[f64], sample_rate: u32, exponent: f64) -> SampleBuffer {
    let n = signal.len();
    if n == 0 || exponent == 0.0 {
        return signal.to_vec();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut spectrum: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    forward.process(&mut spectrum);

    let hz_per_bin = sample_rate as f64 / n as f64;
    let gain_of = |k: usize| (k as f64 * hz_per_bin).powf(exponent);
    let dc_gain = if n > 1 { gain_of(1) } else { 1.0 };

    spectrum[0] *= dc_gain;
    for k in 1..=n / 2 {
        let g = gain_of(k);
        spectrum[k] *= g;
        // mirror bin keeps the spectrum hermitian
        if n - k != k {
            spectrum[n - k] *= g;
        }
    }

    inverse.process(&mut spectrum);
    let scale = 1.0 / n as f64;
    spectrum.iter().map(|c| c.re * scale).collect()
}

/// Produce `n_samples` of `color` noise with peak magnitude `amplitude`.
pub fn shape<R: Rng>(color: NoiseColor, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    let white = gaussian(n_samples, rng);

    let colored = match color {
        NoiseColor::Gray => {
            let pink = normalized(power_law(&white, sample_rate, -0.5), 1.0);
            // fixed wide band approximating an equal loudness contour
            let nyq = nyquist(sample_rate);
            bandpass(&pink, sample_rate, (0.1 * nyq, 0.9 * nyq), 2, FilterMode::Band)?
        }
        NoiseColor::Green => {
            let nyq = nyquist(sample_rate);
            let center = 500.0 / nyq;
            if center < 0.999 {
                let low = (center - 0.3).max(0.001) * nyq;
                let high = (center + 0.3).min(0.999) * nyq;
                bandpass(&white, sample_rate, (low, high), DEFAULT_ORDER, FilterMode::Band)?
            } else {
                white
            }
        }
        _ => match color.exponent() {
            Some(exponent) => power_law(&white, sample_rate, exponent),
            None => white,
        },
    };

    Ok(normalized(colored, amplitude))
}

pub fn white<R: Rng>(n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    shape(NoiseColor::White, n_samples, sample_rate, amplitude, rng)
}

pub fn pink<R: Rng>(n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    shape(NoiseColor::Pink, n_samples, sample_rate, amplitude, rng)
}

pub fn brown<R: Rng>(n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
    shape(NoiseColor::Brown, n_samples, sample_rate, amplitude, rng)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::freq::band_energy;
    use crate::analysis::volume::peak;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static SR: u32 = 44100;

    #[test]
    fn test_every_color_keeps_length_and_peak() {
        let mut rng = StdRng::seed_from_u64(3);
        for color in NoiseColor::variants() {
            for n in [1usize, 2, 1001, 4096] {
                let signal = shape(color, n, SR, 0.3, &mut rng).unwrap();
                assert_eq!(signal.len(), n, "{:?} changed length", color);
                assert!(peak(&signal) <= 0.3 + 1e-9, "{:?} exceeded the requested peak", color);
            }
        }
    }

    #[test]
    fn test_empty_request() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(shape(NoiseColor::Pink, 0, SR, 0.5, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_white_exponent_is_identity() {
        let signal = vec![0.1, -0.2, 0.3];
        assert_eq!(power_law(&signal, SR, 0.0), signal);
    }

    #[test]
    fn test_power_law_keeps_signal_real() {
        let mut rng = StdRng::seed_from_u64(11);
        let white = gaussian(64, &mut rng);
        // round trip with a flat gain of 1 at every bin when exponent is tiny
        let out = power_law(&white, 64, 1e-12);
        for (a, b) in white.iter().zip(out.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_colors_tilt_the_right_way() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = SR as usize;
        let low = (20.0, 200.0);
        let high = (5000.0, 15000.0);

        let brown = shape(NoiseColor::Brown, n, SR, 0.5, &mut rng).unwrap();
        let violet = shape(NoiseColor::Violet, n, SR, 0.5, &mut rng).unwrap();

        assert!(band_energy(&brown, SR, low) > 10.0 * band_energy(&brown, SR, high));
        assert!(band_energy(&violet, SR, high) > 10.0 * band_energy(&violet, SR, low));
    }

    #[test]
    fn test_green_centers_on_speech_band() {
        let mut rng = StdRng::seed_from_u64(9);
        let n = SR as usize;
        let green = shape(NoiseColor::Green, n, SR, 0.5, &mut rng).unwrap();
        assert!(band_energy(&green, SR, (200.0, 2000.0)) > band_energy(&green, SR, (15000.0, 20000.0)));
    }

    #[test]
    fn test_unknown_name_falls_back_to_white() {
        assert_eq!(NoiseColor::from_name("brown"), NoiseColor::Brown);
        assert_eq!(NoiseColor::from_name("plaid"), NoiseColor::White);
    }

    #[test]
    fn test_unknown_name_in_config_reads_as_white() {
        let set: NoiseTypeSet = serde_json::from_str(r#"{"plaid": true, "brown": false}"#).unwrap();
        assert_eq!(set.get(&NoiseColor::White), Some(&true));
        assert_eq!(set.get(&NoiseColor::Brown), Some(&false));
        assert_eq!(serde_json::to_string(&NoiseColor::Gray).unwrap(), "\"gray\"");
    }
}
