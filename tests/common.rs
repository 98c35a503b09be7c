#![allow(dead_code)]
use noisebed::synth_config::SynthConfig;

pub const TEST_SEED: u64 = 1234;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Define a basic SynthConfig for testing
pub fn test_config() -> SynthConfig {
    SynthConfig {
        sample_rate: 22050,
        duration: 1.0,
        master_amplitude: 0.7,
        stereo: false,
        seed: Some(TEST_SEED),
    }
}

pub fn config_of(sample_rate: u32, duration: f64) -> SynthConfig {
    SynthConfig { sample_rate, duration, ..test_config() }
}
