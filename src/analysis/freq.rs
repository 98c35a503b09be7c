use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::synth::Bandpass;

/// Power spectrum of a real signal, one value per bin from DC to Nyquist.
pub fn power_spectrum(signal: &[f64]) -> Vec<f64> {
  let n = signal.len();
  if n == 0 {
    return vec![];
  }
  let mut planner = FftPlanner::<f64>::new();
  let fft = planner.plan_fft_forward(n);
  let mut bins: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
  fft.process(&mut bins);

  bins.iter().take(n / 2 + 1).map(|c| c.norm_sqr()).collect()
}

/// Total spectral power between `low` and `high` Hz, inclusive.
pub fn band_energy(signal: &[f64], sample_rate: u32, (low, high): Bandpass) -> f64 {
  let n = signal.len();
  let hz_per_bin = sample_rate as f64 / n.max(1) as f64;
  power_spectrum(signal)
    .iter()
    .enumerate()
    .filter(|(k, _)| {
      let f = *k as f64 * hz_per_bin;
      f >= low && f <= high
    })
    .map(|(_, p)| p)
    .sum()
}

/// Share of the signal's total power that lies inside the band.
pub fn band_share(signal: &[f64], sample_rate: u32, band: Bandpass) -> f64 {
  let total: f64 = power_spectrum(signal).iter().sum();
  if total == 0.0 {
    return 0.0;
  }
  band_energy(signal, sample_rate, band) / total
}
