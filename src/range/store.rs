//! Ordered resizable store — contiguous slot storage with a fallible growth path.
//!
//! Every growth goes through [`OrderedStore::reserve_total`], which checks the
//! slot budget and asks the allocator with `try_reserve` before any element
//! moves. A failed reservation therefore never leaves a half-shifted store.

use std::collections::TryReserveError;
use std::fmt;

/// Why the store could not make room for more slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowError {
    /// The configured slot budget would be exceeded.
    Budget { requested: usize, budget: usize },
    /// The allocator refused the reservation.
    Alloc { requested: usize },
}

impl fmt::Display for GrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowError::Budget { requested, budget } => {
                write!(f, "{requested} slots requested, budget is {budget}")
            }
            GrowError::Alloc { requested } => {
                write!(f, "allocator refused room for {requested} slots")
            }
        }
    }
}

impl std::error::Error for GrowError {}

/// A contiguous, index-addressable sequence with an optional slot budget.
#[derive(Debug, Clone)]
pub struct OrderedStore<T> {
    slots: Vec<T>,
    budget: Option<usize>,
}

impl<T> OrderedStore<T> {
    /// Create an empty store. `budget` caps the number of slots it may ever hold.
    pub fn new(budget: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            budget,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn budget(&self) -> Option<usize> {
        self.budget
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    /// Make sure the store can hold `total` elements without reallocating.
    ///
    /// Never touches existing elements.
    pub fn reserve_total(&mut self, total: usize) -> Result<(), GrowError> {
        if let Some(budget) = self.budget {
            if total > budget {
                return Err(GrowError::Budget {
                    requested: total,
                    budget,
                });
            }
        }
        let additional = total.saturating_sub(self.slots.len());
        self.slots
            .try_reserve(additional)
            .map_err(|_: TryReserveError| GrowError::Alloc { requested: total })
    }

    /// Insert `value` at `index`, shifting later elements one slot right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), GrowError> {
        assert!(
            index <= self.slots.len(),
            "insert index {index} out of bounds for store of length {}",
            self.slots.len()
        );
        self.reserve_total(self.slots.len() + 1)?;
        self.slots.insert(index, value);
        Ok(())
    }

    /// Append `value`. Growth is checked the same way as [`Self::insert_at`].
    pub fn push(&mut self, value: T) -> Result<(), GrowError> {
        self.reserve_total(self.slots.len() + 1)?;
        self.slots.push(value);
        Ok(())
    }

    /// Remove and return the element at `index`, shifting later elements left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> T {
        assert!(
            index < self.slots.len(),
            "remove index {index} out of bounds for store of length {}",
            self.slots.len()
        );
        self.slots.remove(index)
    }

    /// Drop every element from `len` onwards.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }
}

impl<T> Default for OrderedStore<T> {
    fn default() -> Self {
        Self::new(None)
    }
}
