//! Targeted edits on a finished mix: narrow boosts, notches, isolation and added tones.
//!
//! Operations run in list order and each sees the output of the previous one. The
//! result is renormalized to the peak of the input so a chain never changes the
//! overall loudness.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::volume::{db_to_amp, normalized, peak};
use crate::error::{Result, SynthError};
use crate::filter::{self, FilterMode, MAX_NORMALIZED, MIN_NORMALIZED};
use crate::synth::{accumulate, nyquist, sine, Bandpass, SampleBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Boost,
    Notch,
    Bandpass,
    SynthTone,
    Additive,
}

impl Operation {
    pub fn default_q(&self) -> f64 {
        match self {
            Operation::Notch => 5.0,
            Operation::Bandpass => 1.5,
            _ => 2.0,
        }
    }

    pub fn default_gain_db(&self) -> f64 {
        match self {
            Operation::Notch => -20.0,
            _ => 6.0,
        }
    }

    pub fn default_amplitude(&self) -> f64 {
        match self {
            Operation::Additive => 0.05,
            _ => 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyOp {
    #[serde(alias = "freq")]
    pub freq_hz: f64,
    pub operation: Operation,
    #[serde(default)]
    pub q_factor: Option<f64>,
    #[serde(default)]
    pub gain_db: Option<f64>,
    #[serde(default)]
    pub amplitude: Option<f64>,
}

impl FrequencyOp {
    pub fn new(freq_hz: f64, operation: Operation) -> FrequencyOp {
        FrequencyOp { freq_hz, operation, q_factor: None, gain_db: None, amplitude: None }
    }

    pub fn boost(freq_hz: f64, q_factor: f64, gain_db: f64) -> FrequencyOp {
        FrequencyOp { q_factor: Some(q_factor), gain_db: Some(gain_db), ..FrequencyOp::new(freq_hz, Operation::Boost) }
    }

    pub fn notch(freq_hz: f64, q_factor: f64) -> FrequencyOp {
        FrequencyOp { q_factor: Some(q_factor), ..FrequencyOp::new(freq_hz, Operation::Notch) }
    }

    pub fn tone(freq_hz: f64, amplitude: f64) -> FrequencyOp {
        FrequencyOp { amplitude: Some(amplitude), ..FrequencyOp::new(freq_hz, Operation::SynthTone) }
    }

    pub fn q(&self) -> f64 {
        self.q_factor.unwrap_or_else(|| self.operation.default_q())
    }

    pub fn gain(&self) -> f64 {
        self.gain_db.unwrap_or_else(|| self.operation.default_gain_db())
    }

    pub fn tone_amplitude(&self) -> f64 {
        self.amplitude.unwrap_or_else(|| self.operation.default_amplitude())
    }

    /// `freq / q` wide band centered on `freq`, in Hz.
    pub fn band(&self) -> Bandpass {
        let half = self.freq_hz / self.q() / 2.0;
        (self.freq_hz - half, self.freq_hz + half)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.freq_hz > 0.0 && self.freq_hz.is_finite()) {
            return Err(SynthError::parameter("freq_hz", format!("{} must be a positive frequency", self.freq_hz)));
        }
        if !(self.q() > 0.0) {
            return Err(SynthError::parameter("q_factor", format!("{} must be positive", self.q())));
        }
        if !self.gain().is_finite() {
            return Err(SynthError::parameter("gain_db", "must be finite"));
        }
        Ok(())
    }
}

/// Whether `freq_hz` can be filtered at this rate.
fn in_filter_range(freq_hz: f64, sample_rate: u32) -> bool {
    let norm = freq_hz / nyquist(sample_rate);
    MIN_NORMALIZED < norm && norm < MAX_NORMALIZED
}

fn apply_op(signal: SampleBuffer, sample_rate: u32, op: &FrequencyOp) -> Result<SampleBuffer> {
    let filtered = matches!(op.operation, Operation::Boost | Operation::Notch | Operation::Bandpass);
    if filtered && !in_filter_range(op.freq_hz, sample_rate) {
        warn!("Skipping {:?} at {} Hz, outside the filterable range at {} Hz", op.operation, op.freq_hz, sample_rate);
        return Ok(signal);
    }

    match op.operation {
        Operation::Boost => {
            let component = filter::bandpass(&signal, sample_rate, op.band(), 2, FilterMode::Band)?;
            let mut out = signal;
            accumulate(&mut out, &component, db_to_amp(op.gain()) - 1.0);
            Ok(out)
        }
        Operation::Notch => filter::bandpass(&signal, sample_rate, op.band(), filter::DEFAULT_ORDER, FilterMode::Bandstop),
        Operation::Bandpass => filter::bandpass(&signal, sample_rate, op.band(), filter::DEFAULT_ORDER, FilterMode::Band),
        Operation::SynthTone | Operation::Additive => {
            let mut out = signal;
            let n = out.len();
            accumulate(&mut out, &sine(op.freq_hz, n, sample_rate), op.tone_amplitude());
            Ok(out)
        }
    }
}

/// Run `ops` over `signal` in order.
pub fn apply(signal: &[f64], sample_rate: u32, ops: &[FrequencyOp]) -> Result<SampleBuffer> {
    for op in ops {
        op.validate()?;
    }

    let mut out = signal.to_vec();
    for op in ops {
        debug!("Frequency op {:?} at {} Hz", op.operation, op.freq_hz);
        out = apply_op(out, sample_rate, op)?;
    }
    Ok(normalized(out, peak(signal)))
}
