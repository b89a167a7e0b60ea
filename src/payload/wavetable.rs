//! Wavetable payload — table source plus position modulation metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Single-cycle shapes available without a wavetable file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

/// Where a wavetable range gets its table from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavetableSource {
    Builtin(Waveform),
    File(PathBuf),
}

impl Default for WavetableSource {
    fn default() -> Self {
        WavetableSource::Builtin(Waveform::default())
    }
}

/// Sound definition for a wavetable range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavetablePayload {
    pub source: WavetableSource,
    /// Table scan position, 0.0..=1.0.
    pub position: f32,
    /// Envelope depth applied to `position`, -1.0..=1.0.
    pub position_mod_depth: f32,
    pub transpose: i8,
    pub cents: i8,
}

impl WavetablePayload {
    pub fn with_source(source: WavetableSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }
}
