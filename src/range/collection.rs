//! Range collection — ranges sorted by upper bound, all of one payload kind.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::config::MultiRangeConfig;
use crate::payload::{RangeKind, RangePayload};

use super::error::RangeError;
use super::policy::{ControlDomain, ExtensionPolicy, InsertPolicy};
use super::store::OrderedStore;
use super::{Bound, Range, OPEN_TOP};

/// The ranges of one multi-range instrument.
///
/// Ranges are kept in ascending order of upper bound. The collection does not
/// re-sort; callers that change bounds through [`RangeCollection::element_mut`]
/// must keep them ordered, or use [`RangeCollection::set_upper`], which checks.
///
/// Every range holds a payload of [`RangeCollection::kind`]. The kind is only
/// changed by [`RangeCollection::change_type`], which converts all ranges at once.
#[derive(Debug, Clone)]
pub struct RangeCollection {
    store: OrderedStore<Range>,
    kind: RangeKind,
    domain: ControlDomain,
    insert_policy: InsertPolicy,
    extension_policy: ExtensionPolicy,
}

impl RangeCollection {
    /// An empty collection whose ranges will be of `kind`.
    pub fn new(kind: RangeKind, config: &MultiRangeConfig) -> Self {
        Self {
            store: OrderedStore::new(config.max_ranges),
            kind,
            domain: config.domain,
            insert_policy: config.insert_policy,
            extension_policy: config.extension_policy,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn kind(&self) -> RangeKind {
        self.kind
    }

    pub fn domain(&self) -> ControlDomain {
        self.domain
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.store.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Range> {
        self.store.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Range> {
        self.store.get_mut(index)
    }

    /// The range at sorted position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn element(&self, index: usize) -> &Range {
        let len = self.len();
        match self.store.get(index) {
            Some(range) => range,
            None => panic!("range index {index} out of bounds for collection of length {len}"),
        }
    }

    /// Mutable access to the range at sorted position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn element_mut(&mut self, index: usize) -> &mut Range {
        let len = self.len();
        match self.store.get_mut(index) {
            Some(range) => range,
            None => panic!("range index {index} out of bounds for collection of length {len}"),
        }
    }

    /// Lowest value covered by the slot at `index`.
    fn lower_bound(&self, index: usize) -> Bound {
        match index.checked_sub(1).and_then(|prev| self.store.get(prev)) {
            Some(prev) => prev.upper.saturating_add(1),
            None => self.domain.min(),
        }
    }

    /// Closed interval of control values the range at `index` responds to.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn span(&self, index: usize) -> RangeInclusive<Bound> {
        let upper = self.element(index).upper;
        self.lower_bound(index)..=upper
    }

    /// Index of the first range whose upper bound is at least `value`, or `len()` if none.
    pub fn search(&self, value: Bound) -> usize {
        self.store.as_slice().partition_point(|r| r.upper < value)
    }

    /// The range that responds to `value`, if any.
    pub fn range_for(&self, value: Bound) -> Option<&Range> {
        if value < self.domain.min() {
            return None;
        }
        self.store.get(self.search(value))
    }

    /// Whether upper bounds are strictly ascending.
    pub fn is_sorted(&self) -> bool {
        self.store
            .as_slice()
            .windows(2)
            .all(|pair| pair[0].upper < pair[1].upper)
    }

    /// Insert a new range of the collection's kind at sorted position `index`.
    ///
    /// Ranges at `index` and above move up one slot. The new range gets a
    /// provisional upper bound from the configured [`InsertPolicy`]; callers
    /// normally overwrite it straight away. On error nothing has moved.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_multi_range(&mut self, index: usize) -> Result<&mut Range, RangeError> {
        let len = self.len();
        assert!(
            index <= len,
            "insert index {index} out of bounds for collection of length {len}"
        );

        let lo = self.lower_bound(index);
        let hi = self.store.get(index).map_or(OPEN_TOP, |r| r.upper);
        let upper = self.insert_policy.provisional_upper(lo, hi);

        if let Err(cause) = self.store.insert_at(index, Range::with_kind(upper, self.kind)) {
            warn!(index, len, %cause, "range insert failed");
            return Err(RangeError::OutOfMemory {
                requested: len + 1,
                cause,
            });
        }
        debug!(index, upper, kind = %self.kind, "inserted range");
        Ok(self.element_mut(index))
    }

    /// Remove and return the range at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove_range(&mut self, index: usize) -> Range {
        let removed = self.store.remove_at(index);
        debug!(index, upper = removed.upper, "removed range");
        removed
    }

    /// Set the upper bound at `index`, refusing values that would break ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set_upper(&mut self, index: usize, upper: Bound) -> Result<(), RangeError> {
        let len = self.len();
        assert!(
            index < len,
            "range index {index} out of bounds for collection of length {len}"
        );
        let above_prev = index == 0 || self.element(index - 1).upper < upper;
        let below_next = index + 1 == len || upper < self.element(index + 1).upper;
        if !(above_prev && below_next) {
            return Err(RangeError::Unordered { index, upper });
        }
        self.element_mut(index).upper = upper;
        Ok(())
    }

    /// Convert every range to the other kind and resize to `new_size` ranges.
    ///
    /// Retained ranges keep their bounds but get a fresh payload of the new
    /// kind; old payloads are dropped, nothing is translated. Extra ranges are
    /// discarded from the top. Missing ranges are appended above the current
    /// top with bounds from the configured [`ExtensionPolicy`]. A collection
    /// whose top already sits at [`OPEN_TOP`] grows into the values above it,
    /// up to `Bound::MAX`.
    ///
    /// Storage and bounds are checked before anything changes, so on error the
    /// collection is exactly as it was.
    pub fn change_type(&mut self, new_size: usize) -> Result<(), RangeError> {
        let old_kind = self.kind;
        let new_kind = old_kind.other();
        let len = self.len();

        let appended = match new_size.checked_sub(len) {
            Some(needed) if needed > 0 => {
                let after = self.store.as_slice().last().map(|r| r.upper);
                match self.extension_policy.extend(after, needed, self.domain) {
                    Some(bounds) => bounds,
                    None => {
                        warn!(?after, needed, "no bound space for converted ranges");
                        return Err(RangeError::BoundSpaceExhausted { after, needed });
                    }
                }
            }
            _ => Vec::new(),
        };

        if let Err(cause) = self.store.reserve_total(new_size) {
            warn!(new_size, len, %cause, "range conversion failed");
            return Err(RangeError::OutOfMemory {
                requested: new_size,
                cause,
            });
        }

        self.store.truncate(new_size);
        for range in self.store.as_mut_slice() {
            range.payload = RangePayload::default_for(new_kind);
        }
        self.kind = new_kind;

        for upper in appended {
            self.store
                .push(Range::with_kind(upper, new_kind))
                .map_err(|cause| RangeError::OutOfMemory {
                    requested: new_size,
                    cause,
                })?;
        }

        debug!(from = %old_kind, to = %new_kind, old_len = len, new_len = new_size, "converted ranges");
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RangeCollection {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{SampleRef, SampledPayload, Waveform, WavetableSource};
    use crate::range::GrowError;

    fn sampled() -> RangeCollection {
        RangeCollection::new(RangeKind::Sampled, &MultiRangeConfig::default())
    }

    /// Build a sampled collection with the given upper bounds, each with one sample.
    fn with_bounds(bounds: &[Bound], config: &MultiRangeConfig) -> RangeCollection {
        let mut ranges = RangeCollection::new(RangeKind::Sampled, config);
        for (i, &upper) in bounds.iter().enumerate() {
            let range = ranges.insert_multi_range(i).unwrap();
            range.upper = upper;
            range.payload = RangePayload::Sampled(
                SampledPayload::default().with_sample(SampleRef::new(format!("s{i}.wav"))),
            );
        }
        ranges
    }

    fn uppers(ranges: &RangeCollection) -> Vec<Bound> {
        ranges.iter().map(|r| r.upper).collect()
    }

    #[test]
    fn new_collection_is_empty() {
        let ranges = sampled();
        assert!(ranges.is_empty());
        assert_eq!(ranges.len(), 0);
        assert_eq!(ranges.kind(), RangeKind::Sampled);
        assert!(ranges.is_sorted());
    }

    #[test]
    fn insert_returns_new_range_at_index() {
        let mut ranges = with_bounds(&[47, 71, OPEN_TOP], &MultiRangeConfig::default());
        let inserted = ranges.insert_multi_range(1).unwrap();
        inserted.upper = 59;
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges.element(1).upper, 59);
        assert!(!ranges.element(1).payload.as_sampled().unwrap().has_samples());
        assert_eq!(uppers(&ranges), vec![47, 59, 71, OPEN_TOP]);
        assert!(ranges.is_sorted());
    }

    #[test]
    fn insert_matches_collection_kind() {
        let mut ranges = RangeCollection::new(RangeKind::Wavetable, &MultiRangeConfig::default());
        let range = ranges.insert_multi_range(0).unwrap();
        assert_eq!(range.kind(), RangeKind::Wavetable);
    }

    #[test]
    fn insert_split_half_provisional_bound() {
        let mut ranges = with_bounds(&[47, 71], &MultiRangeConfig::default());
        // Slot 1 covers 48..=71 before the insert.
        assert_eq!(ranges.insert_multi_range(1).unwrap().upper, 59);
        assert!(ranges.is_sorted());
    }

    #[test]
    fn insert_lower_edge_provisional_bound() {
        let config = MultiRangeConfig {
            insert_policy: InsertPolicy::LowerEdge,
            ..MultiRangeConfig::default()
        };
        let mut ranges = with_bounds(&[47, 71], &config);
        assert_eq!(ranges.insert_multi_range(1).unwrap().upper, 48);
    }

    #[test]
    fn append_to_empty_uses_open_top() {
        let mut ranges = sampled();
        assert_eq!(ranges.insert_multi_range(0).unwrap().upper, OPEN_TOP / 2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn insert_past_end_panics() {
        let mut ranges = sampled();
        let _ = ranges.insert_multi_range(1);
    }

    #[test]
    fn insert_over_budget_leaves_collection_unchanged() {
        let config = MultiRangeConfig::default().with_max_ranges(Some(2));
        let mut ranges = with_bounds(&[59, OPEN_TOP], &config);
        let before: Vec<Range> = ranges.iter().cloned().collect();

        let err = ranges.insert_multi_range(1).unwrap_err();
        assert_eq!(
            err,
            RangeError::OutOfMemory {
                requested: 3,
                cause: GrowError::Budget {
                    requested: 3,
                    budget: 2
                }
            }
        );
        assert_eq!(ranges.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn element_mut_edits_payload() {
        let mut ranges = with_bounds(&[OPEN_TOP], &MultiRangeConfig::default());
        ranges
            .element_mut(0)
            .payload
            .as_sampled_mut()
            .unwrap()
            .transpose = 5;
        assert_eq!(ranges.element(0).payload.transpose(), 5);
    }

    #[test]
    #[should_panic(expected = "range index 3 out of bounds")]
    fn element_out_of_bounds_panics() {
        let ranges = with_bounds(&[10, 20, 30], &MultiRangeConfig::default());
        let _ = ranges.element(3);
    }

    #[test]
    fn get_out_of_bounds_is_none() {
        let ranges = with_bounds(&[10], &MultiRangeConfig::default());
        assert!(ranges.get(1).is_none());
        assert!(ranges.get(0).is_some());
    }

    #[test]
    fn spans_are_contiguous() {
        let ranges = with_bounds(&[47, 71, OPEN_TOP], &MultiRangeConfig::default());
        assert_eq!(ranges.span(0), 0..=47);
        assert_eq!(ranges.span(1), 48..=71);
        assert_eq!(ranges.span(2), 72..=OPEN_TOP);
    }

    #[test]
    fn velocity_domain_starts_at_one() {
        let config = MultiRangeConfig {
            domain: ControlDomain::Velocity,
            ..MultiRangeConfig::default()
        };
        let ranges = with_bounds(&[63, 127], &config);
        assert_eq!(ranges.span(0), 1..=63);
        assert!(ranges.range_for(0).is_none());
        assert_eq!(ranges.range_for(1).unwrap().upper, 63);
    }

    #[test]
    fn search_and_range_for() {
        let ranges = with_bounds(&[47, 71, 100], &MultiRangeConfig::default());
        assert_eq!(ranges.search(0), 0);
        assert_eq!(ranges.search(47), 0);
        assert_eq!(ranges.search(48), 1);
        assert_eq!(ranges.search(100), 2);
        assert_eq!(ranges.search(101), 3);
        assert_eq!(ranges.range_for(60).unwrap().upper, 71);
        assert!(ranges.range_for(101).is_none());
    }

    #[test]
    fn set_upper_checks_neighbours() {
        let mut ranges = with_bounds(&[47, 71, 100], &MultiRangeConfig::default());
        assert!(ranges.set_upper(1, 60).is_ok());
        assert_eq!(
            ranges.set_upper(1, 47),
            Err(RangeError::Unordered {
                index: 1,
                upper: 47
            })
        );
        assert!(ranges.set_upper(1, 100).is_err());
        assert!(ranges.set_upper(0, 0).is_ok());
        assert!(ranges.set_upper(2, OPEN_TOP).is_ok());
        assert_eq!(uppers(&ranges), vec![0, 60, OPEN_TOP]);
    }

    #[test]
    fn remove_range_returns_it() {
        let mut ranges = with_bounds(&[47, 71, 100], &MultiRangeConfig::default());
        let removed = ranges.remove_range(1);
        assert_eq!(removed.upper, 71);
        assert_eq!(uppers(&ranges), vec![47, 100]);
    }

    #[test]
    fn change_type_same_size_keeps_bounds() {
        let mut ranges = with_bounds(&[47, 71, OPEN_TOP], &MultiRangeConfig::default());
        ranges.change_type(3).unwrap();
        assert_eq!(ranges.kind(), RangeKind::Wavetable);
        assert_eq!(uppers(&ranges), vec![47, 71, OPEN_TOP]);
        for range in &ranges {
            assert_eq!(
                range.payload.as_wavetable().unwrap().source,
                WavetableSource::Builtin(Waveform::Sine)
            );
        }
    }

    #[test]
    fn change_type_shrink_drops_top() {
        let mut ranges = with_bounds(&[20, 40, 60, 80], &MultiRangeConfig::default());
        ranges.change_type(2).unwrap();
        assert_eq!(uppers(&ranges), vec![20, 40]);
        assert!(ranges.iter().all(|r| r.kind() == RangeKind::Wavetable));
    }

    #[test]
    fn change_type_grow_appends_above_top() {
        let mut ranges = with_bounds(&[20, 40], &MultiRangeConfig::default());
        ranges.change_type(5).unwrap();
        assert_eq!(uppers(&ranges), vec![20, 40, 41, 42, OPEN_TOP]);
        assert!(ranges.is_sorted());
        assert!(ranges.iter().all(|r| r.kind() == RangeKind::Wavetable));
    }

    #[test]
    fn change_type_grow_with_step_policy() {
        let config = MultiRangeConfig {
            extension_policy: ExtensionPolicy::Step { step: 12 },
            ..MultiRangeConfig::default()
        };
        let mut ranges = with_bounds(&[47], &config);
        ranges.change_type(3).unwrap();
        assert_eq!(uppers(&ranges), vec![47, 59, 71]);
    }

    #[test]
    fn change_type_to_zero_flips_kind() {
        let mut ranges = with_bounds(&[20, 40], &MultiRangeConfig::default());
        ranges.change_type(0).unwrap();
        assert!(ranges.is_empty());
        assert_eq!(ranges.kind(), RangeKind::Wavetable);
        assert_eq!(ranges.insert_multi_range(0).unwrap().kind(), RangeKind::Wavetable);
    }

    #[test]
    fn change_type_twice_round_trips_kind() {
        let mut ranges = with_bounds(&[20, 40], &MultiRangeConfig::default());
        ranges.change_type(2).unwrap();
        ranges.change_type(2).unwrap();
        assert_eq!(ranges.kind(), RangeKind::Sampled);
        // Payload data does not survive a round trip.
        assert!(!ranges.element(0).payload.as_sampled().unwrap().has_samples());
    }

    #[test]
    fn change_type_over_budget_leaves_collection_unchanged() {
        let config = MultiRangeConfig::default().with_max_ranges(Some(3));
        let mut ranges = with_bounds(&[20, 40], &config);
        let before: Vec<Range> = ranges.iter().cloned().collect();

        let err = ranges.change_type(4).unwrap_err();
        assert!(matches!(err, RangeError::OutOfMemory { requested: 4, .. }));
        assert_eq!(ranges.kind(), RangeKind::Sampled);
        assert_eq!(ranges.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn change_type_grows_past_open_top() {
        let mut ranges = with_bounds(&[20, OPEN_TOP], &MultiRangeConfig::default());
        ranges.change_type(3).unwrap();
        assert_eq!(uppers(&ranges), vec![20, OPEN_TOP, Bound::MAX]);
        assert_eq!(ranges.kind(), RangeKind::Wavetable);
        assert!(ranges.is_sorted());
        assert_eq!(ranges.span(2), OPEN_TOP + 1..=Bound::MAX);
    }

    #[test]
    fn change_type_grows_single_open_top_range() {
        let mut ranges = with_bounds(&[OPEN_TOP], &MultiRangeConfig::default());
        ranges.change_type(2).unwrap();
        assert_eq!(uppers(&ranges), vec![OPEN_TOP, Bound::MAX]);
        assert!(ranges.iter().all(|r| r.kind() == RangeKind::Wavetable));
    }

    #[test]
    fn change_type_without_bound_space_leaves_collection_unchanged() {
        let mut ranges = with_bounds(&[20, Bound::MAX - 1], &MultiRangeConfig::default());
        let before: Vec<Range> = ranges.iter().cloned().collect();

        let err = ranges.change_type(4).unwrap_err();
        assert_eq!(
            err,
            RangeError::BoundSpaceExhausted {
                after: Some(Bound::MAX - 1),
                needed: 2
            }
        );
        assert_eq!(ranges.kind(), RangeKind::Sampled);
        assert_eq!(ranges.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn error_messages() {
        let err = RangeError::BoundSpaceExhausted {
            after: Some(OPEN_TOP),
            needed: 2,
        };
        assert_eq!(err.to_string(), "no room for 2 more ranges above bound 32767");
        let err = RangeError::Unordered { index: 1, upper: 5 };
        assert!(err.to_string().contains("index 1"));
    }
}
