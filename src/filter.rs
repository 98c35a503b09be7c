//! Butterworth band filters built from cascaded biquad sections.
//!
//! Every other component confines its output with these. Edges are given in Hz,
//! normalized against Nyquist and clamped to [0.001, 0.999]. A band that collapses
//! after clamping (`low >= high`) leaves the signal untouched.
use biquad::{Biquad, Coefficients, DirectForm1, Type as FilterType};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::synth::{nyquist, pi, Bandpass, SampleBuffer};

pub const MIN_NORMALIZED: f64 = 0.001;
pub const MAX_NORMALIZED: f64 = 0.999;

/// Order used across the pipeline unless a caller asks for a lighter touch.
pub const DEFAULT_ORDER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Keep energy inside the band
    Band,
    /// Reject energy inside the band
    Bandstop,
}

/// Clamp a (low, high) band in Hz to normalized frequency space.
/// Returns `None` when nothing is left of the band.
pub fn normalize_band(sample_rate: u32, (low, high): Bandpass) -> Option<Bandpass> {
    let nyq = nyquist(sample_rate);
    let low_norm = (low / nyq).clamp(MIN_NORMALIZED, MAX_NORMALIZED);
    let high_norm = (high / nyq).clamp(MIN_NORMALIZED, MAX_NORMALIZED);
    if low_norm >= high_norm {
        return None;
    }
    Some((low_norm, high_norm))
}

/// Q of each second order section of an `order`-pole Butterworth prototype.
fn butterworth_qs(order: usize) -> Vec<f64> {
    let n = order as f64;
    (0..order / 2)
        .map(|k| 1.0 / (2.0 * (pi * (2 * k + 1) as f64 / (2.0 * n)).cos()))
        .collect()
}

/// One biquad section at `f0_norm`, a fraction of Nyquist.
fn section(kind: FilterType<f64>, f0_norm: f64, q: f64) -> Result<DirectForm1<f64>> {
    let coeffs = Coefficients::<f64>::from_normalized_params(kind, f0_norm, q)
        .map_err(|e| SynthError::Filter(format!("Failed to create filter coefficients at {}: {:?}", f0_norm, e)))?;
    Ok(DirectForm1::<f64>::new(coeffs))
}

/// Q scale that puts the -3 dB edges of `stages` cascaded identical notches on the
/// requested band edges. A single notch needs no scaling.
fn notch_q_scale(stages: usize) -> f64 {
    let r = 0.5f64.powf(1.0 / stages.max(1) as f64);
    (r / (1.0 - r)).sqrt()
}

/// Design the section cascade for a band already clamped to normalized space.
///
/// The band-stop is `order / 2` identical notches at the geometric center, narrowed
/// so the cascade is -3 dB at the band edges. It is steeper than one notch but not a
/// true Butterworth band-stop shape.
fn design((low_norm, high_norm): Bandpass, order: usize, mode: FilterMode) -> Result<Vec<DirectForm1<f64>>> {
    let order = (order.max(2) / 2) * 2;

    match mode {
        FilterMode::Band => {
            let qs = butterworth_qs(order);
            let mut sections = Vec::with_capacity(qs.len() * 2);
            for &q in qs.iter() {
                sections.push(section(FilterType::HighPass, low_norm, q)?);
            }
            for &q in qs.iter() {
                sections.push(section(FilterType::LowPass, high_norm, q)?);
            }
            Ok(sections)
        }
        FilterMode::Bandstop => {
            let stages = order / 2;
            let center = (low_norm * high_norm).sqrt();
            let q = center / (high_norm - low_norm) * notch_q_scale(stages);
            (0..stages).map(|_| section(FilterType::Notch, center, q)).collect()
        }
    }
}

/// Apply a band or band-stop Butterworth filter in a single causal pass.
pub fn bandpass(signal: &[f64], sample_rate: u32, range: Bandpass, order: usize, mode: FilterMode) -> Result<SampleBuffer> {
    let band = match normalize_band(sample_rate, range) {
        Some(band) => band,
        None => {
            debug!("Band ({}, {}) Hz collapses at {} Hz, passing signal through", range.0, range.1, sample_rate);
            return Ok(signal.to_vec());
        }
    };

    let mut sections = design(band, order, mode)?;
    let out = signal
        .iter()
        .map(|&x| sections.iter_mut().fold(x, |acc, s| s.run(acc)))
        .collect();
    Ok(out)
}

/// Fourth order band-pass, the pipeline's default confinement.
pub fn band(signal: &[f64], sample_rate: u32, range: Bandpass) -> Result<SampleBuffer> {
    bandpass(signal, sample_rate, range, DEFAULT_ORDER, FilterMode::Band)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::volume::rms;
    use crate::synth::sine;
    use approx::assert_relative_eq;

    static SR: u32 = 44100;

    fn steady_rms(signal: &[f64]) -> f64 {
        rms(&signal[signal.len() / 2..])
    }

    #[test]
    fn test_butterworth_qs() {
        let qs = butterworth_qs(4);
        assert_relative_eq!(qs[0], 0.541196, epsilon = 1e-5);
        assert_relative_eq!(qs[1], 1.306563, epsilon = 1e-5);
        assert_relative_eq!(butterworth_qs(2)[0], std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_collapsed_band_is_a_no_op() {
        let signal = sine(440.0, 1024, SR);
        let out = band(&signal, SR, (2000.0, 1000.0)).unwrap();
        assert_eq!(out, signal);

        // both edges clamp to the same normalized floor
        let out = band(&signal, SR, (0.5, 4.0)).unwrap();
        assert_eq!(out, signal);
    }

    #[test]
    fn test_band_keeps_inside_and_rejects_outside() {
        let n = SR as usize;
        let inside = band(&sine(1000.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        let outside = band(&sine(8000.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        assert!(steady_rms(&inside) > 0.6, "passband lost energy: {}", steady_rms(&inside));
        assert!(steady_rms(&outside) < 0.01, "stopband leaked: {}", steady_rms(&outside));
    }

    #[test]
    fn test_bandstop_rejects_center() {
        let n = SR as usize;
        let center = bandpass(&sine(995.0, n, SR), SR, (900.0, 1100.0), 2, FilterMode::Bandstop).unwrap();
        let far = bandpass(&sine(5000.0, n, SR), SR, (900.0, 1100.0), 2, FilterMode::Bandstop).unwrap();
        assert!(steady_rms(&center) < 0.05);
        assert!(steady_rms(&far) > 0.65);
    }

    #[test]
    fn test_band_edges_land_where_asked() {
        let n = SR as usize;
        let below = band(&sine(250.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        let lower_mid = band(&sine(1000.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        let upper_mid = band(&sine(1500.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        assert!(steady_rms(&below) < 0.1, "250 Hz passed: {}", steady_rms(&below));
        assert!(steady_rms(&lower_mid) > 0.6);
        assert!(steady_rms(&upper_mid) > 0.6);

        // -3 dB at the cutoff halves the power of a unit sine
        let edge = band(&sine(2000.0, n, SR), SR, (500.0, 2000.0)).unwrap();
        assert_relative_eq!(steady_rms(&edge), 0.5, epsilon = 0.05);
    }

    #[test]
    fn test_notch_q_scale() {
        assert_relative_eq!(notch_q_scale(1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(notch_q_scale(2), 1.553774, epsilon = 1e-5);
    }

    #[test]
    fn test_bandstop_edges_are_half_power() {
        let n = SR as usize;
        for order in [2, 4] {
            let edge = bandpass(&sine(1100.0, n, SR), SR, (900.0, 1100.0), order, FilterMode::Bandstop).unwrap();
            assert_relative_eq!(steady_rms(&edge), 0.5, epsilon = 0.06);
        }
    }

    #[test]
    fn test_output_length_matches_input() {
        let signal = vec![0.25; 333];
        assert_eq!(band(&signal, SR, (100.0, 400.0)).unwrap().len(), 333);
    }
}
