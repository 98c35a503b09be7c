use crate::synth::SampleBuffer;

/// Better for linear modulation of amplitude
pub fn db_to_amp(db: f64) -> f64 {
    10f64.powf(db / 20f64)
}

pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.log10()
}

/// Largest absolute sample value. Zero for an empty signal.
pub fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0f64, |max, &x| max.max(x.abs()))
}

/// Identify the RMS value of a signal slice.
pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum: f64 = signal.iter().map(|&x| x * x).sum();
    (sum / signal.len() as f64).sqrt()
}

/// Scale `signal` so its peak equals `target_peak`, then hard clip to [-1, 1].
///
/// A silent signal is returned untouched. This is the one safety net applied after
/// every generator and after the final mix.
pub fn normalize(signal: &mut [f64], target_peak: f64) {
    let max_amplitude = peak(signal);
    if max_amplitude > 0.0 {
        let gain = target_peak / max_amplitude;
        signal.iter_mut().for_each(|x| *x *= gain);
    }
    signal.iter_mut().for_each(|x| *x = x.clamp(-1.0, 1.0));
}

/// Owned variant of `normalize`.
pub fn normalized(mut signal: SampleBuffer, target_peak: f64) -> SampleBuffer {
    normalize(&mut signal, target_peak);
    signal
}
