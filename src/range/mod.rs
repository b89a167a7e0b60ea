//! Ranges — contiguous note/velocity spans, each owning one sound definition,
//! and the ordered collection that keeps them sorted by upper bound.

pub mod collection;
pub mod error;
pub mod policy;
pub mod store;

pub use collection::RangeCollection;
pub use error::RangeError;
pub use policy::{ControlDomain, ExtensionPolicy, InsertPolicy};
pub use store::{GrowError, OrderedStore};

use serde::{Deserialize, Serialize};

use crate::payload::{RangeKind, RangePayload};

/// A control value bound (note number or velocity).
pub type Bound = u16;

/// Upper bound of an open-ended top range.
pub const OPEN_TOP: Bound = 32767;

/// One span of a multi-range instrument.
///
/// Only the upper bound is stored; the lower bound is one above the previous
/// range's upper bound, see [`RangeCollection::span`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub upper: Bound,
    pub payload: RangePayload,
}

impl Range {
    pub fn new(upper: Bound, payload: RangePayload) -> Self {
        Self { upper, payload }
    }

    /// A range with a freshly initialised payload of `kind`.
    pub fn with_kind(upper: Bound, kind: RangeKind) -> Self {
        Self::new(upper, RangePayload::default_for(kind))
    }

    pub fn kind(&self) -> RangeKind {
        self.payload.kind()
    }

    /// Whether this range reaches the conventional open top (or beyond, after growth past it).
    pub fn is_open_top(&self) -> bool {
        self.upper >= OPEN_TOP
    }
}
