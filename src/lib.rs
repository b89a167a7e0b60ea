//! Multirange — ordered note/velocity range maps for multisample and
//! multi-wavetable instruments.

pub mod config;
pub mod payload;
pub mod persistence;
pub mod range;

pub use config::MultiRangeConfig;
pub use payload::{RangeKind, RangePayload};
pub use range::{Bound, Range, RangeCollection, RangeError, OPEN_TOP};
