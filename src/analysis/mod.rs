pub mod freq;
pub mod volume;
