mod common;

use noisebed::analysis::volume::peak;
use noisebed::brainwave::{BrainwaveBand, BrainwaveConfig};
use noisebed::mix::{mix, render, MixConfig, Output};
use noisebed::noise::NoiseColor;
use noisebed::presets::SoundLayer;
use noisebed::synth_config::{LayerConfig, SynthConfig};
use noisebed::SynthError;

#[test]
fn test_every_layer_mixes_to_full_length() {
    common::init_logging();
    let settings = common::config_of(22050, 0.5);
    for sound in SoundLayer::variants() {
        let name = sound.name();
        let config = MixConfig::new(settings.clone()).with_layer(LayerConfig::new(sound));
        let out = mix(&config).unwrap();
        assert_eq!(out.len(), 11025, "{} has the wrong length", name);
        assert!(peak(&out) <= 0.7 + 1e-12, "{} is too loud", name);
        assert!(out.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn test_empty_mix_is_all_zeros() {
    let mut config = MixConfig::new(common::test_config());
    config.layers.push(LayerConfig { enabled: false, ..LayerConfig::new(SoundLayer::Ocean(Default::default())) });
    config.noise_types.insert(NoiseColor::Pink, false);
    let out = mix(&config).unwrap();
    assert_eq!(out.len(), 22050);
    assert!(out.iter().all(|&x| x == 0.0));
}

#[test]
fn test_seeded_runs_are_bit_identical() {
    let config = MixConfig::new(common::config_of(22050, 0.5))
        .with_layer(LayerConfig::new(SoundLayer::Fire(Default::default())))
        .with_layer(LayerConfig::new(SoundLayer::Crickets(Default::default())).with_naturalness(1.0))
        .with_noise(NoiseColor::Gray)
        .with_brainwave(BrainwaveConfig::new(BrainwaveBand::Theta).enable());
    assert_eq!(mix(&config).unwrap(), mix(&config).unwrap());
}

#[test]
fn test_stereo_output_shifts_right_channel() {
    let mut settings = common::config_of(44100, 0.25);
    settings.stereo = true;
    let config = MixConfig::new(settings).with_noise(NoiseColor::Pink);
    let mono = mix(&config).unwrap();
    match render(&config).unwrap() {
        Output::Stereo(stereo) => {
            assert_eq!(stereo.left, mono);
            assert_eq!(stereo.right.len(), mono.len());
            assert_eq!(stereo.right[44], mono[0]);
            assert_eq!(stereo.right[mono.len() - 1], mono[mono.len() - 45]);
            assert!(stereo.right[..44].iter().all(|&x| x == 0.0));
        }
        Output::Mono(_) => panic!("stereo was requested"),
    }
}

#[test]
fn test_invalid_settings_fail_fast() {
    let config = MixConfig::new(SynthConfig { sample_rate: 0, ..common::test_config() });
    assert_eq!(mix(&config), Err(SynthError::InvalidSampleRate(0)));

    let config = MixConfig::new(SynthConfig { duration: -1.0, ..common::test_config() });
    assert_eq!(mix(&config), Err(SynthError::InvalidDuration(-1.0)));

    let config = MixConfig::new(SynthConfig { master_amplitude: 1.5, ..common::test_config() });
    assert!(matches!(mix(&config), Err(SynthError::InvalidAmplitude { .. })));

    let layer = LayerConfig::new(SoundLayer::Crickets(Default::default())).with_range(3000.0, 12000.0);
    let config = MixConfig::new(common::test_config()).with_layer(layer);
    assert!(matches!(mix(&config), Err(SynthError::InvalidRange { .. })));
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "settings": {"sample_rate": 22050, "duration": 0.25, "stereo": false, "seed": 7},
        "layers": [
            {"sound": {"kind": "rain", "density": 0.5}, "enabled": true, "weight": 0.6,
             "freq_range": [400, 2500], "naturalness": 0.2}
        ],
        "noise_types": {"brown": true, "green": false},
        "brainwaves": [
            {"band": "alpha", "enabled": true, "freq_range": [8, 13], "center_freq": 10,
             "amplitude": 0.4, "mode": "tone"}
        ],
        "frequency_ops": [{"freq": 1000, "operation": "notch"}],
        "frequency_filters_enabled": true
    }"#;
    let config: MixConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.settings.master_amplitude, 0.7);
    assert_eq!(config.active_layers().len(), 3);

    let out = mix(&config).unwrap();
    assert_eq!(out.len(), 5513);
    assert!(peak(&out) > 0.69 && peak(&out) <= 0.7 + 1e-12);
    assert_eq!(out, mix(&config).unwrap());
}

#[test]
fn test_unknown_noise_name_mixes_as_white() {
    let json = r#"{"settings": {"sample_rate": 22050, "duration": 0.25, "seed": 3}, "noise_types": {"plaid": true}}"#;
    let config: MixConfig = serde_json::from_str(json).unwrap();
    let white = MixConfig::new(SynthConfig { duration: 0.25, seed: Some(3), ..common::test_config() }).with_noise(NoiseColor::White);
    assert_eq!(config.noise_types, white.noise_types);
    assert_eq!(mix(&config).unwrap(), mix(&white).unwrap());
}
