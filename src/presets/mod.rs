//! Natural and hybrid sound layers.
//!
//! Event textures (rain, thunder, fire, crickets, train, vinyl) scatter short
//! enveloped transients over an optional filtered noise bed. Continuous textures
//! (wind, ocean, car) shape a noise bed or harmonic stack with slow LFOs.
//!
//! Every recipe returns a buffer normalized to the requested amplitude. Naturalness
//! is applied afterwards by the mixer.

pub mod car;
pub mod crickets;
pub mod fire;
pub mod ocean;
pub mod rain;
pub mod thunder;
pub mod train;
pub mod vinyl;
pub mod wind;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::synth::{Bandpass, SampleBuffer};

pub use car::CarParams;
pub use crickets::CricketsParams;
pub use fire::FireParams;
pub use ocean::OceanParams;
pub use rain::RainParams;
pub use thunder::ThunderParams;
pub use train::TrainParams;
pub use vinyl::VinylParams;
pub use wind::WindParams;

/// A sound layer and the knobs of its recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SoundLayer {
    Rain(RainParams),
    Thunder(ThunderParams),
    Wind(WindParams),
    Ocean(OceanParams),
    Fire(FireParams),
    Crickets(CricketsParams),
    Car(CarParams),
    Train(TrainParams),
    Vinyl(VinylParams),
}

impl SoundLayer {
    /// Every layer with its default recipe.
    pub fn variants() -> Vec<SoundLayer> {
        vec![
            SoundLayer::Rain(RainParams::default()),
            SoundLayer::Thunder(ThunderParams::default()),
            SoundLayer::Wind(WindParams::default()),
            SoundLayer::Ocean(OceanParams::default()),
            SoundLayer::Fire(FireParams::default()),
            SoundLayer::Crickets(CricketsParams::default()),
            SoundLayer::Car(CarParams::default()),
            SoundLayer::Train(TrainParams::default()),
            SoundLayer::Vinyl(VinylParams::default()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoundLayer::Rain(_) => "rain",
            SoundLayer::Thunder(_) => "thunder",
            SoundLayer::Wind(_) => "wind",
            SoundLayer::Ocean(_) => "ocean",
            SoundLayer::Fire(_) => "fire",
            SoundLayer::Crickets(_) => "crickets",
            SoundLayer::Car(_) => "car",
            SoundLayer::Train(_) => "train",
            SoundLayer::Vinyl(_) => "vinyl",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SoundLayer::Rain(p) => p.validate(),
            SoundLayer::Thunder(p) => p.validate(),
            SoundLayer::Wind(p) => p.validate(),
            SoundLayer::Ocean(p) => p.validate(),
            SoundLayer::Fire(p) => p.validate(),
            SoundLayer::Crickets(p) => p.validate(),
            SoundLayer::Car(p) => p.validate(),
            SoundLayer::Train(p) => p.validate(),
            SoundLayer::Vinyl(p) => p.validate(),
        }
    }

    /// Render `n_samples` of this layer with peak `amplitude`.
    pub fn synthesize<R: Rng>(&self, n_samples: usize, sample_rate: u32, amplitude: f64, rng: &mut R) -> Result<SampleBuffer> {
        match self {
            SoundLayer::Rain(p) => rain::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Thunder(p) => thunder::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Wind(p) => wind::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Ocean(p) => ocean::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Fire(p) => fire::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Crickets(p) => crickets::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Car(p) => car::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Train(p) => train::render(p, n_samples, sample_rate, amplitude, rng),
            SoundLayer::Vinyl(p) => vinyl::render(p, n_samples, sample_rate, amplitude, rng),
        }
    }
}

/// Uniform start offset in `[0, end)`, zero when the range is empty.
pub(crate) fn position<R: Rng>(end: usize, rng: &mut R) -> usize {
    rng.gen_range(0..end.max(1))
}

/// Number of events for a rate given per second of audio.
pub(crate) fn event_count(per_second: f64, n_samples: usize, sample_rate: u32) -> usize {
    let duration = n_samples as f64 / sample_rate as f64;
    (per_second * duration).max(0.0) as usize
}

pub(crate) fn non_negative(label: &str, value: f64) -> Result<()> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(SynthError::parameter(label, format!("{} must be a finite non-negative number", value)));
    }
    Ok(())
}

pub(crate) fn positive(label: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(SynthError::parameter(label, format!("{} must be a finite positive number", value)));
    }
    Ok(())
}

pub(crate) fn ordered(label: &str, (low, high): Bandpass) -> Result<()> {
    if !(low > 0.0 && low < high) {
        return Err(SynthError::range(label, low, high));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::volume::peak;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static SR: u32 = 22050;

    #[test]
    fn test_every_layer_renders_to_amplitude() {
        let n = SR as usize * 2;
        for layer in SoundLayer::variants() {
            let mut rng = StdRng::seed_from_u64(12);
            layer.validate().unwrap();
            let signal = layer.synthesize(n, SR, 0.6, &mut rng).unwrap();
            assert_eq!(signal.len(), n, "{} changed length", layer.name());
            assert!(peak(&signal) <= 0.6 + 1e-9, "{} is too loud", layer.name());
            assert!(peak(&signal) > 0.0, "{} is silent", layer.name());
            assert!(signal.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_tiny_buffers_do_not_panic() {
        for layer in SoundLayer::variants() {
            let mut rng = StdRng::seed_from_u64(1);
            for n in [0usize, 1, 7] {
                let signal = layer.synthesize(n, SR, 0.5, &mut rng).unwrap();
                assert_eq!(signal.len(), n);
            }
        }
    }

    #[test]
    fn test_kind_tag_round_trips_through_json() {
        let layer = SoundLayer::Crickets(CricketsParams { cricket_count: 3, ..Default::default() });
        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("\"kind\":\"crickets\""));
        let back: SoundLayer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);

        let partial: SoundLayer = serde_json::from_str(r#"{"kind":"rain","density":0.2}"#).unwrap();
        match partial {
            SoundLayer::Rain(p) => {
                assert_eq!(p.density, 0.2);
                assert_eq!(p.drop_freq_center, RainParams::default().drop_freq_center);
            }
            other => panic!("expected rain, got {:?}", other),
        }

        assert!(serde_json::from_str::<SoundLayer>(r#"{"kind":"bagpipes"}"#).is_err());
    }

    #[test]
    fn test_event_count() {
        assert_eq!(event_count(200.0, 44100, 44100), 200);
        assert_eq!(event_count(100.0, 22050, 44100), 50);
        assert_eq!(event_count(-5.0, 44100, 44100), 0);
    }
}
