//! Reference table of every named source the mixer knows about.

use serde::Serialize;

use crate::synth::Bandpass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Natural,
    Hybrid,
    Brainwave,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: Category,
    /// Characteristic band in Hz
    pub freq_range: Bandpass,
    pub naturalness_default: f64,
    pub amplitude_range: (f64, f64),
}

const fn entry(
    name: &'static str, category: Category, freq_range: Bandpass, naturalness_default: f64,
    amplitude_range: (f64, f64),
) -> CatalogEntry {
    CatalogEntry { name, category, freq_range, naturalness_default, amplitude_range }
}

use Category::*;

pub static CATALOG: [CatalogEntry; 23] = [
    entry("white", Technical, (20.0, 20000.0), 0.1, (0.3, 0.8)),
    entry("pink", Technical, (20.0, 20000.0), 0.3, (0.3, 0.8)),
    entry("brown", Technical, (20.0, 10000.0), 0.4, (0.3, 0.8)),
    entry("blue", Technical, (100.0, 20000.0), 0.1, (0.2, 0.7)),
    entry("violet", Technical, (500.0, 20000.0), 0.1, (0.2, 0.6)),
    entry("gray", Technical, (20.0, 20000.0), 0.2, (0.3, 0.8)),
    entry("green", Technical, (200.0, 2000.0), 0.2, (0.3, 0.7)),
    entry("rain", Natural, (400.0, 2500.0), 0.7, (0.4, 0.9)),
    entry("thunder", Natural, (20.0, 120.0), 0.9, (0.5, 1.0)),
    entry("wind", Natural, (100.0, 800.0), 0.6, (0.3, 0.8)),
    entry("ocean", Natural, (30.0, 500.0), 0.8, (0.4, 0.9)),
    entry("fire", Natural, (800.0, 5000.0), 0.75, (0.3, 0.7)),
    entry("crickets", Natural, (3000.0, 8000.0), 0.85, (0.2, 0.6)),
    entry("car", Hybrid, (80.0, 400.0), 0.5, (0.3, 0.7)),
    entry("train", Hybrid, (60.0, 300.0), 0.6, (0.4, 0.8)),
    entry("vinyl", Hybrid, (200.0, 4000.0), 0.7, (0.2, 0.5)),
    entry("perlin", Technical, (20.0, 10000.0), 0.8, (0.3, 0.8)),
    entry("granular", Technical, (100.0, 8000.0), 0.8, (0.2, 0.6)),
    entry("delta", Brainwave, (0.5, 4.0), 0.0, (0.2, 0.5)),
    entry("theta", Brainwave, (4.0, 8.0), 0.0, (0.2, 0.5)),
    entry("alpha", Brainwave, (8.0, 13.0), 0.0, (0.2, 0.6)),
    entry("beta", Brainwave, (13.0, 30.0), 0.0, (0.2, 0.5)),
    entry("gamma", Brainwave, (30.0, 100.0), 0.0, (0.1, 0.4)),
];

pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.name == name)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(move |e| e.category == category)
}
