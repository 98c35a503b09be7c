#![allow(non_upper_case_globals)]
pub mod analysis;
pub mod brainwave;
pub mod catalog;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod mix;
pub mod modulate;
pub mod naturalness;
pub mod noise;
pub mod presets;
pub mod surgery;
pub mod synth;
pub mod synth_config;

pub use error::{Result, SynthError};
pub use mix::{mix, render, MixConfig, Output, StereoBuffer};
pub use noise::NoiseColor;
pub use presets::SoundLayer;
pub use synth::SampleBuffer;
pub use synth_config::{LayerConfig, SynthConfig};
