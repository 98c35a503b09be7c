//! The mixing engine.
//!
//! A run collects the enabled sources into a list of [`ActiveLayer`]s, renders them in
//! parallel, each from its own sub-seed, and folds the results in list order. Frequency
//! surgery and the final normalization then act on the mono sum.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::volume::{normalize, peak};
use crate::brainwave::{self, BrainwaveConfig};
use crate::error::Result;
use crate::filter;
use crate::naturalness::{apply_naturalness, NaturalnessParams};
use crate::noise::{self, NoiseColor, NoiseTypeSet};
use crate::surgery::{self, FrequencyOp};
use crate::synth::{accumulate, silence, SampleBuffer};
use crate::synth_config::{check_unit, LayerConfig, SynthConfig};

/// Peak of each technical noise before it is mixed.
pub const NOISE_AMPLITUDE: f64 = 0.3;
/// Gain applied to each technical noise in the sum.
pub const NOISE_MIX_GAIN: f64 = 0.2;
/// Delay of the right channel, in seconds.
pub const STEREO_SHIFT: f64 = 0.001;

/// Everything one synthesis run consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub settings: SynthConfig,
    pub layers: Vec<LayerConfig>,
    pub noise_types: NoiseTypeSet,
    pub brainwaves: Vec<BrainwaveConfig>,
    pub frequency_ops: Vec<FrequencyOp>,
    pub naturalness: NaturalnessParams,
    pub natural_sounds_enabled: bool,
    pub noise_generator_enabled: bool,
    pub frequency_filters_enabled: bool,
    /// When off the run is a plain pink test signal at the master amplitude.
    pub mixing_enabled: bool,
    pub noise_amplitude: f64,
    pub noise_mix_gain: f64,
}

impl Default for MixConfig {
    fn default() -> Self {
        MixConfig {
            settings: SynthConfig::default(),
            layers: vec![],
            noise_types: NoiseTypeSet::new(),
            brainwaves: vec![],
            frequency_ops: vec![],
            naturalness: NaturalnessParams::default(),
            natural_sounds_enabled: true,
            noise_generator_enabled: true,
            frequency_filters_enabled: false,
            mixing_enabled: true,
            noise_amplitude: NOISE_AMPLITUDE,
            noise_mix_gain: NOISE_MIX_GAIN,
        }
    }
}

impl MixConfig {
    pub fn new(settings: SynthConfig) -> MixConfig {
        MixConfig { settings, ..Default::default() }
    }

    pub fn with_layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_noise(mut self, color: NoiseColor) -> Self {
        self.noise_types.insert(color, true);
        self
    }

    pub fn with_brainwave(mut self, config: BrainwaveConfig) -> Self {
        self.brainwaves.push(config);
        self
    }

    /// Appends `op` and turns frequency surgery on.
    pub fn with_frequency_op(mut self, op: FrequencyOp) -> Self {
        self.frequency_ops.push(op);
        self.frequency_filters_enabled = true;
        self
    }

    /// Sources that contribute to the sum, in accumulation order.
    pub fn active_layers(&self) -> Vec<ActiveLayer<'_>> {
        let mut active = vec![];
        if self.natural_sounds_enabled {
            active.extend(self.layers.iter().filter(|l| l.enabled).map(ActiveLayer::Sound));
        }
        if self.noise_generator_enabled {
            active.extend(self.noise_types.iter().filter(|(_, on)| **on).map(|(&color, _)| ActiveLayer::Noise(color)));
        }
        active.extend(self.brainwaves.iter().filter(|b| b.enabled).map(ActiveLayer::Brainwave));
        active
    }

    /// Checks every setting the run will read. Nothing is rendered when this fails.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        self.naturalness.validate()?;
        check_unit("noise_amplitude", self.noise_amplitude)?;
        check_unit("noise_mix_gain", self.noise_mix_gain)?;
        for layer in self.active_layers() {
            match layer {
                ActiveLayer::Sound(l) => l.validate(self.settings.sample_rate)?,
                ActiveLayer::Noise(_) => {}
                ActiveLayer::Brainwave(b) => b.validate()?,
            }
        }
        if self.frequency_filters_enabled {
            for op in self.frequency_ops.iter() {
                op.validate()?;
            }
        }
        Ok(())
    }
}

/// One source of the mix.
#[derive(Clone, Debug)]
pub enum ActiveLayer<'mix> {
    Sound(&'mix LayerConfig),
    Noise(NoiseColor),
    Brainwave(&'mix BrainwaveConfig),
}

impl<'mix> ActiveLayer<'mix> {
    pub fn label(&self) -> String {
        match self {
            ActiveLayer::Sound(l) => l.sound.name().to_string(),
            ActiveLayer::Noise(color) => format!("{} noise", color.name()),
            ActiveLayer::Brainwave(b) => format!("{} brainwave", b.band.name()),
        }
    }
}

/// Render one source at its final level in the sum.
fn render_layer<R: Rng>(layer: &ActiveLayer, config: &MixConfig, rng: &mut R) -> Result<SampleBuffer> {
    let sr = config.settings.sample_rate;
    let n = config.settings.n_samples();

    match layer {
        ActiveLayer::Sound(l) => {
            info!("Rendering {} (weight={:.2}, naturalness={:.2})", l.sound.name(), l.weight, l.naturalness);
            // the weight sets the layer's peak and scales it again in the sum
            let raw = l.sound.synthesize(n, sr, l.weight, rng)?;
            let natural = apply_naturalness(&raw, sr, l.naturalness, &config.naturalness, rng)?;
            let shaped = filter::band(&natural, sr, l.freq_range)?;
            Ok(shaped.into_iter().map(|x| x * l.weight).collect())
        }
        ActiveLayer::Noise(color) => {
            info!("Rendering {} noise (amplitude={:.2})", color.name(), config.noise_amplitude);
            let signal = noise::shape(*color, n, sr, config.noise_amplitude, rng)?;
            Ok(signal.into_iter().map(|x| x * config.noise_mix_gain).collect())
        }
        ActiveLayer::Brainwave(b) => {
            info!("Rendering {} brainwave (freq={}Hz, amp={:.2})", b.band.name(), b.center_freq, b.amplitude);
            brainwave::generate(b, n, sr, rng)
        }
    }
}

/// Produce the mono mix described by `config`.
pub fn mix(config: &MixConfig) -> Result<SampleBuffer> {
    config.validate()?;
    let settings = &config.settings;
    let mut rng = settings.rng();

    if !config.mixing_enabled {
        info!("Mixing disabled, rendering a pink test signal");
        return noise::pink(settings.n_samples(), settings.sample_rate, settings.master_amplitude, &mut rng);
    }

    let layers = config.active_layers();
    info!("Mixing {} layers: {} s at {} Hz", layers.len(), settings.duration, settings.sample_rate);

    // drawn up front so the parallel render cannot reorder the stream
    let seeds: Vec<u64> = layers.iter().map(|_| rng.gen()).collect();

    let channels: Vec<Result<SampleBuffer>> = layers
        .par_iter()
        .enumerate()
        .map(|(j, layer)| {
            let mut layer_rng = StdRng::seed_from_u64(seeds[j]);
            render_layer(layer, config, &mut layer_rng)
        })
        .collect();

    let mut mixed = silence(settings.n_samples());
    for (layer, channel) in layers.iter().zip(channels) {
        let channel = channel?;
        debug!("Accumulating {} with peak {:.4}", layer.label(), peak(&channel));
        accumulate(&mut mixed, &channel, 1.0);
    }

    if config.frequency_filters_enabled && !config.frequency_ops.is_empty() {
        info!("Applying {} frequency operations", config.frequency_ops.len());
        mixed = surgery::apply(&mixed, settings.sample_rate, &config.frequency_ops)?;
    }

    normalize(&mut mixed, settings.master_amplitude);
    info!("Mix complete: {} s, {} Hz", settings.duration, settings.sample_rate);
    Ok(mixed)
}

/// Two channel output. The right channel trails the left by a fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    pub left: SampleBuffer,
    pub right: SampleBuffer,
}

impl StereoBuffer {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Interleaved `[l0, r0, l1, r1, ...]` frames.
    pub fn interleave(&self) -> SampleBuffer {
        self.left.iter().zip(self.right.iter()).flat_map(|(&l, &r)| [l, r]).collect()
    }
}

pub fn stereo_shift(sample_rate: u32) -> usize {
    (STEREO_SHIFT * sample_rate as f64).round() as usize
}

/// Duplicate `mono` into a left channel and a right channel delayed by
/// `stereo_shift` samples. The delay pads with silence and drops the tail.
pub fn widen(mono: &[f64], sample_rate: u32) -> StereoBuffer {
    let k = stereo_shift(sample_rate).min(mono.len());
    let mut right = vec![0.0; k];
    right.extend_from_slice(&mono[..mono.len() - k]);
    StereoBuffer { left: mono.to_vec(), right }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Mono(SampleBuffer),
    Stereo(StereoBuffer),
}

/// Mix and, when the settings ask for it, widen to stereo.
pub fn render(config: &MixConfig) -> Result<Output> {
    let mono = mix(config)?;
    if config.settings.stereo {
        Ok(Output::Stereo(widen(&mono, config.settings.sample_rate)))
    } else {
        Ok(Output::Mono(mono))
    }
}
