//! Range file persistence — YAML save/load for range collections.
//!
//! Loading rebuilds a collection the same way an instrument does: one
//! `insert_multi_range` per stored range, then the stored bound and payload
//! are written into the new slot.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{self, MultiRangeConfig};
use crate::payload::RangeKind;
use crate::range::{ControlDomain, Range, RangeCollection, RangeError};

/// Current range file format version.
pub const FORMAT_VERSION: u32 = 1;

const FILE_EXTENSION: &str = "yaml";

/// Errors from saving or loading a range file.
#[derive(Debug)]
pub enum PersistError {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    /// The target exists and overwriting was not allowed.
    AlreadyExists(PathBuf),
    /// The file parsed but does not describe a valid collection.
    Invalid(String),
    /// The collection could not hold the stored ranges.
    Range(RangeError),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "I/O error: {e}"),
            PersistError::Yaml(e) => write!(f, "YAML error: {e}"),
            PersistError::AlreadyExists(path) => {
                write!(f, "{} already exists", path.display())
            }
            PersistError::Invalid(msg) => write!(f, "invalid range file: {msg}"),
            PersistError::Range(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Yaml(e) => Some(e),
            PersistError::Range(e) => Some(e),
            PersistError::AlreadyExists(_) | PersistError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_yaml::Error> for PersistError {
    fn from(e: serde_yaml::Error) -> Self {
        PersistError::Yaml(e)
    }
}

impl From<RangeError> for PersistError {
    fn from(e: RangeError) -> Self {
        PersistError::Range(e)
    }
}

/// On-disk form of a range collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFile {
    pub version: u32,
    pub kind: RangeKind,
    #[serde(default)]
    pub domain: ControlDomain,
    #[serde(default)]
    pub ranges: Vec<Range>,
}

impl RangeFile {
    pub fn from_collection(ranges: &RangeCollection) -> Self {
        Self {
            version: FORMAT_VERSION,
            kind: ranges.kind(),
            domain: ranges.domain(),
            ranges: ranges.iter().cloned().collect(),
        }
    }

    /// Rebuild a collection. Policies and slot budget come from `config`, the domain from the file.
    pub fn into_collection(self, config: &MultiRangeConfig) -> Result<RangeCollection, PersistError> {
        if self.version != FORMAT_VERSION {
            return Err(PersistError::Invalid(format!(
                "unsupported version {}",
                self.version
            )));
        }
        let config = MultiRangeConfig {
            domain: self.domain,
            ..config.clone()
        };
        let mut collection = RangeCollection::new(self.kind, &config);

        for (index, stored) in self.ranges.into_iter().enumerate() {
            if stored.kind() != self.kind {
                return Err(PersistError::Invalid(format!(
                    "range {index} is {} in a {} file",
                    stored.kind(),
                    self.kind
                )));
            }
            if index == 0 && stored.upper < self.domain.min() {
                return Err(PersistError::Invalid(format!(
                    "range 0 upper bound {} is below the {:?} minimum {}",
                    stored.upper,
                    self.domain,
                    self.domain.min()
                )));
            }
            if let Some(prev) = index.checked_sub(1).map(|p| collection.element(p).upper) {
                if stored.upper <= prev {
                    return Err(PersistError::Invalid(format!(
                        "range {index} upper bound {} is not above {prev}",
                        stored.upper
                    )));
                }
            }
            let slot = collection.insert_multi_range(index)?;
            *slot = stored;
        }
        Ok(collection)
    }
}

/// Default folder for range files of `kind` (~/.multirange/ranges/<kind>).
pub fn default_folder(kind: RangeKind) -> PathBuf {
    let mut path = config::base_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ranges");
    path.push(kind.name());
    path
}

/// First path in `folder` named `stem.yaml`, `stem-2.yaml`, `stem-3.yaml`, … that doesn't exist yet.
pub fn suggest_path(folder: &Path, stem: &str) -> PathBuf {
    let first = folder.join(format!("{stem}.{FILE_EXTENSION}"));
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|n| folder.join(format!("{stem}-{n}.{FILE_EXTENSION}")))
        .find(|path| !path.exists())
        .unwrap_or(first)
}

/// Save a range collection, creating parent directories as needed.
///
/// If the file exists and `may_overwrite` is false, nothing is written and
/// [`PersistError::AlreadyExists`] is returned so the caller can ask before retrying.
pub fn save(path: &Path, ranges: &RangeCollection, may_overwrite: bool) -> Result<(), PersistError> {
    if path.exists() && !may_overwrite {
        return Err(PersistError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(&RangeFile::from_collection(ranges))?;
    std::fs::write(path, yaml)?;
    info!(path = %path.display(), ranges = ranges.len(), kind = %ranges.kind(), "saved ranges");
    Ok(())
}

/// Load a range collection from a YAML file.
pub fn load(path: &Path, config: &MultiRangeConfig) -> Result<RangeCollection, PersistError> {
    let content = std::fs::read_to_string(path)?;
    let file: RangeFile = serde_yaml::from_str(&content)?;
    let ranges = file.into_collection(config)?;
    debug!(path = %path.display(), ranges = ranges.len(), "loaded ranges");
    Ok(ranges)
}
