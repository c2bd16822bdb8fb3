//! A mapping from [`Pair`] to occurrence count, with an efficient
//! multi-way merge.
//!
//! See spec §4.2. Backed by `std::collections::HashMap` keyed on
//! [`ahash::RandomState`] (the teacher's hasher choice), wrapped in a thin
//! newtype so the spec's `create`/`get_or_zero`/`put`/`iter`/`merge`
//! operations read as named methods rather than raw map calls.

use crate::error::{Error, Result};
use crate::types::Pair;
use std::collections::HashMap;

type Inner = HashMap<Pair, u64, ahash::RandomState>;

/// A mapping from ordered symbol pairs to their occurrence count.
#[derive(Debug, Default, Clone)]
pub struct PairCountMap {
    inner: Inner,
}

impl PairCountMap {
    /// Creates a map pre-sized for `capacity_hint` distinct pairs.
    pub fn with_capacity(capacity_hint: usize) -> Result<Self> {
        let mut inner: Inner = HashMap::with_hasher(ahash::RandomState::new());
        inner
            .try_reserve(capacity_hint)
            .map_err(|_| Error::OutOfMemory)?;
        Ok(Self { inner })
    }

    /// Returns the count for `pair`, or 0 if absent. Never fails.
    pub fn get_or_zero(&self, pair: Pair) -> u64 {
        self.inner.get(&pair).copied().unwrap_or(0)
    }

    /// Inserts or overwrites the count for `pair`.
    pub fn put(&mut self, pair: Pair, count: u64) -> Result<()> {
        if !self.inner.contains_key(&pair) {
            self.inner.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        }
        self.inner.insert(pair, count);
        Ok(())
    }

    /// Adds `delta` to the count for `pair`, inserting it at `delta` if
    /// absent. `delta` may be negative in effect via [`Self::subtract`].
    pub fn add(&mut self, pair: Pair, delta: u64) -> Result<()> {
        if let Some(v) = self.inner.get_mut(&pair) {
            *v += delta;
        } else {
            self.put(pair, delta)?;
        }
        Ok(())
    }

    /// Subtracts `delta` from the count for `pair`, saturating at zero and
    /// removing the entry once it reaches zero. Absent pairs are a no-op.
    pub fn subtract(&mut self, pair: Pair, delta: u64) {
        if let Some(v) = self.inner.get_mut(&pair) {
            *v = v.saturating_sub(delta);
            if *v == 0 {
                self.inner.remove(&pair);
            }
        }
    }

    /// Removes `pair` entirely, if present.
    pub fn remove(&mut self, pair: Pair) {
        self.inner.remove(&pair);
    }

    /// A finite, order-independent iterator over `(pair, count)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.inner.iter().map(|(&p, &c)| (p, c))
    }

    /// Number of distinct pairs tracked.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no pairs are tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Creates a new map whose keys are the union of `maps`' keys, combining
    /// values for identical keys with `combine`. Every key is visited once;
    /// a key missing from a given input is treated as `combine`d with 0 for
    /// that input.
    pub fn merge(maps: &[PairCountMap], combine: impl Fn(u64, u64) -> u64) -> Result<PairCountMap> {
        let total_hint: usize = maps.iter().map(|m| m.len()).sum();
        let mut merged = PairCountMap::with_capacity(total_hint.min(1 << 18))?;

        for map in maps {
            for (pair, count) in map.iter() {
                let existing = merged.get_or_zero(pair);
                merged.put(pair, combine(existing, count))?;
            }
        }

        Ok(merged)
    }
}
