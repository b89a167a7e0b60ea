//! Bound policies — provisional bounds for inserted ranges and bounds for ranges
//! appended by a kind conversion.

use serde::{Deserialize, Serialize};

use super::{Bound, OPEN_TOP};

/// Integer control value a collection is keyed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlDomain {
    #[default]
    Note,
    Velocity,
}

impl ControlDomain {
    /// Lowest value a range can respond to.
    pub fn min(self) -> Bound {
        match self {
            ControlDomain::Note => 0,
            ControlDomain::Velocity => 1,
        }
    }
}

/// Provisional upper bound given to a range by `insert_multi_range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPolicy {
    /// Halfway between the slot's lower bound and the upper bound of the range it displaces.
    #[default]
    SplitHalf,
    /// The slot's lower bound.
    LowerEdge,
}

impl InsertPolicy {
    /// `lo` is the lower bound of the slot, `hi` the upper bound of the range being pushed up
    /// (or [`OPEN_TOP`] when appending).
    pub fn provisional_upper(self, lo: Bound, hi: Bound) -> Bound {
        match self {
            InsertPolicy::SplitHalf if hi > lo => lo + (hi - lo) / 2,
            InsertPolicy::SplitHalf | InsertPolicy::LowerEdge => lo,
        }
    }
}

/// Bounds for ranges appended when a conversion grows the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPolicy {
    /// Consecutive bounds above the current top, with the last range left open at
    /// [`OPEN_TOP`], or at `Bound::MAX` once the collection already reaches [`OPEN_TOP`].
    #[default]
    OpenTop,
    /// Each appended range spans `step` values.
    Step { step: Bound },
}

impl ExtensionPolicy {
    /// Upper bounds for `count` ranges appended above `after` (the current top bound,
    /// `None` for an empty collection). `None` if they cannot all fit below `Bound::MAX`.
    pub fn extend(self, after: Option<Bound>, count: usize, domain: ControlDomain) -> Option<Vec<Bound>> {
        if count == 0 {
            return Some(Vec::new());
        }
        let ceiling = u32::from(Bound::MAX);
        let count32 = u32::try_from(count).ok()?;
        match self {
            ExtensionPolicy::OpenTop => {
                let start = after.map_or(u32::from(domain.min()), |b| u32::from(b) + 1);
                let last = start.checked_add(count32 - 1)?;
                if last > ceiling {
                    return None;
                }
                let open = if last <= u32::from(OPEN_TOP) {
                    OPEN_TOP
                } else {
                    Bound::MAX
                };
                let mut bounds: Vec<Bound> = (0..count32 - 1).map(|k| (start + k) as Bound).collect();
                bounds.push(open);
                Some(bounds)
            }
            ExtensionPolicy::Step { step } => {
                let step = u32::from(step.max(1));
                // Without a current top, the first range starts at the domain minimum.
                let base = after.map_or(u32::from(domain.min()) + step - 1, |b| u32::from(b) + step);
                let last = base.checked_add(step.checked_mul(count32 - 1)?)?;
                if last > ceiling {
                    return None;
                }
                Some((0..count32).map(|k| (base + step * k) as Bound).collect())
            }
        }
    }
}
