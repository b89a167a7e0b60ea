//! Payloads — the sound definition a range owns, sampled or wavetable.

pub mod sample;
pub mod wavetable;

pub use sample::{LoopMode, SampleError, SampleRef, SampledPayload};
pub use wavetable::{Waveform, WavetablePayload, WavetableSource};

use serde::{Deserialize, Serialize};

/// The mutually exclusive payload categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Sampled,
    Wavetable,
}

impl RangeKind {
    /// The kind a conversion turns this one into.
    pub fn other(self) -> Self {
        match self {
            RangeKind::Sampled => RangeKind::Wavetable,
            RangeKind::Wavetable => RangeKind::Sampled,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RangeKind::Sampled => "sampled",
            RangeKind::Wavetable => "wavetable",
        }
    }
}

impl std::fmt::Display for RangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A range's sound definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePayload {
    Sampled(SampledPayload),
    Wavetable(WavetablePayload),
}

impl RangePayload {
    /// A freshly initialised payload of `kind`.
    pub fn default_for(kind: RangeKind) -> Self {
        match kind {
            RangeKind::Sampled => RangePayload::Sampled(SampledPayload::default()),
            RangeKind::Wavetable => RangePayload::Wavetable(WavetablePayload::default()),
        }
    }

    pub fn kind(&self) -> RangeKind {
        match self {
            RangePayload::Sampled(_) => RangeKind::Sampled,
            RangePayload::Wavetable(_) => RangeKind::Wavetable,
        }
    }

    /// Coarse tuning in semitones.
    pub fn transpose(&self) -> i8 {
        match self {
            RangePayload::Sampled(p) => p.transpose,
            RangePayload::Wavetable(p) => p.transpose,
        }
    }

    /// Fine tuning in cents.
    pub fn cents(&self) -> i8 {
        match self {
            RangePayload::Sampled(p) => p.cents,
            RangePayload::Wavetable(p) => p.cents,
        }
    }

    pub fn as_sampled(&self) -> Option<&SampledPayload> {
        match self {
            RangePayload::Sampled(p) => Some(p),
            RangePayload::Wavetable(_) => None,
        }
    }

    pub fn as_sampled_mut(&mut self) -> Option<&mut SampledPayload> {
        match self {
            RangePayload::Sampled(p) => Some(p),
            RangePayload::Wavetable(_) => None,
        }
    }

    pub fn as_wavetable(&self) -> Option<&WavetablePayload> {
        match self {
            RangePayload::Wavetable(p) => Some(p),
            RangePayload::Sampled(_) => None,
        }
    }

    pub fn as_wavetable_mut(&mut self) -> Option<&mut WavetablePayload> {
        match self {
            RangePayload::Wavetable(p) => Some(p),
            RangePayload::Sampled(_) => None,
        }
    }

    /// One-line description used by listings.
    pub fn summary(&self) -> String {
        match self {
            RangePayload::Sampled(p) => match p.samples.first() {
                Some(first) if p.samples.len() > 1 => {
                    format!("{} (+{} more)", first.path.display(), p.samples.len() - 1)
                }
                Some(first) => first.path.display().to_string(),
                None => "(no sample)".to_string(),
            },
            RangePayload::Wavetable(p) => match &p.source {
                WavetableSource::Builtin(shape) => format!("builtin {shape:?}").to_lowercase(),
                WavetableSource::File(path) => path.display().to_string(),
            },
        }
    }
}
