//! Sampled payload — sample references, WAV probing, and pitch/loop metadata.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur when probing a sample file.
#[derive(Debug)]
pub enum SampleError {
    /// WAV decoding or I/O error.
    Wav(hound::Error),
    /// The WAV file contains no frames.
    Empty,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Wav(e) => write!(f, "WAV error: {e}"),
            SampleError::Empty => write!(f, "WAV file contains no samples"),
        }
    }
}

impl std::error::Error for SampleError {}

impl From<hound::Error> for SampleError {
    fn from(e: hound::Error) -> Self {
        SampleError::Wav(e)
    }
}

/// How playback wraps inside the loop points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    Off,
    Forward,
    PingPong,
}

/// A reference to one audio sample asset.
///
/// Only the path is required; rate and length are filled in by [`SampleRef::probe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRef {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
}

impl SampleRef {
    /// A reference that has not been probed yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sample_rate: None,
            frames: None,
        }
    }

    /// Open the WAV at `path` and record its sample rate and frame count.
    pub fn probe(path: &Path) -> Result<Self, SampleError> {
        let file = std::fs::File::open(path).map_err(hound::Error::IoError)?;
        Self::probe_reader(path, std::io::BufReader::new(file))
    }

    /// Like [`SampleRef::probe`], reading the WAV from `reader` instead of disk.
    pub fn probe_reader<R: Read>(path: impl Into<PathBuf>, reader: R) -> Result<Self, SampleError> {
        let wav = hound::WavReader::new(reader)?;
        let frames = wav.duration();
        if frames == 0 {
            return Err(SampleError::Empty);
        }
        Ok(Self {
            path: path.into(),
            sample_rate: Some(wav.spec().sample_rate),
            frames: Some(frames),
        })
    }
}

/// Sound definition for a sampled range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampledPayload {
    /// Sample assets, in round-robin order.
    pub samples: Vec<SampleRef>,
    /// Semitone offset applied to every sample.
    pub transpose: i8,
    /// Fine tuning in cents, -50..=50.
    pub cents: i8,
    pub loop_mode: LoopMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_end: Option<u32>,
}

impl SampledPayload {
    /// Add a sample. The first probed sample also sets the loop end to its length.
    pub fn with_sample(mut self, sample: SampleRef) -> Self {
        if self.loop_end.is_none() {
            self.loop_end = sample.frames;
        }
        self.samples.push(sample);
        self
    }

    /// Whether any sample asset is referenced.
    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }
}
