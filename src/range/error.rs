//! Error types for range collection mutations.

use std::fmt;

use super::store::GrowError;
use super::Bound;

/// A recoverable failure from a range collection operation.
///
/// Every variant is returned before the collection is touched, so the
/// collection still holds exactly what it held before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Storage could not grow to `requested` ranges.
    OutOfMemory { requested: usize, cause: GrowError },
    /// No strictly increasing bounds fit above `after` for `needed` new ranges.
    BoundSpaceExhausted { after: Option<Bound>, needed: usize },
    /// Setting `upper` at `index` would break ascending order.
    Unordered { index: usize, upper: Bound },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::OutOfMemory { requested, cause } => {
                write!(f, "out of memory growing to {requested} ranges: {cause}")
            }
            RangeError::BoundSpaceExhausted { after, needed } => match after {
                Some(after) => write!(f, "no room for {needed} more ranges above bound {after}"),
                None => write!(f, "no room for {needed} ranges in the bound space"),
            },
            RangeError::Unordered { index, upper } => {
                write!(f, "upper bound {upper} at index {index} breaks ascending order")
            }
        }
    }
}

impl std::error::Error for RangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RangeError::OutOfMemory { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
