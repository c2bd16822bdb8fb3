//! A homogeneous, sparsely-growable sequence addressable by integer index.
//!
//! See spec §4.1. The container is partitioned into fixed-size blocks so
//! that growth never copies previously-written element data — only the
//! (small) vector of block pointers moves. This mirrors
//! `original_source/dyn_arr/src/dyn_arr.c`'s `nodes` array of
//! `MAX_NODE_SIZE`-sized blocks, translated from `malloc`/`realloc` to
//! `Vec<Option<Box<[Option<T>]>>>`.

use crate::error::{Error, Result};

/// Elements per block. A tuning parameter, not a semantic constant (same
/// status as `MAX_NODE_SIZE` in the source).
const BLOCK_SIZE: usize = 1024;

/// A grow-on-write sparse vector of fixed-size elements.
///
/// `set` beyond the current capacity grows the block table to the next
/// power-of-two that accommodates the index; newly-covered cells are left
/// unwritten, and `get` on them fails with [`Error::InvariantViolation`].
#[derive(Debug)]
pub struct IndexedSequence<T> {
    blocks: Vec<Option<Box<[Option<T>]>>>,
}

impl<T> IndexedSequence<T> {
    /// Creates a sequence sized to comfortably hold `capacity_hint`
    /// elements without an initial resize.
    pub fn new(capacity_hint: usize) -> Self {
        let num_blocks = capacity_hint.div_ceil(BLOCK_SIZE).max(1);
        Self {
            blocks: (0..num_blocks).map(|_| None).collect(),
        }
    }

    fn block_and_slot(index: usize) -> (usize, usize) {
        (index / BLOCK_SIZE, index % BLOCK_SIZE)
    }

    /// Stores `value` at `index`, growing capacity if necessary.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let (block_no, slot) = Self::block_and_slot(index);

        if block_no >= self.blocks.len() {
            let needed = block_no + 1;
            let new_len = needed.next_power_of_two();
            self.blocks
                .try_reserve(new_len - self.blocks.len())
                .map_err(|_| Error::OutOfMemory)?;
            self.blocks.resize_with(new_len, || None);
        }

        if self.blocks[block_no].is_none() {
            let mut block = Vec::new();
            block
                .try_reserve_exact(BLOCK_SIZE)
                .map_err(|_| Error::OutOfMemory)?;
            block.resize_with(BLOCK_SIZE, || None);
            self.blocks[block_no] = Some(block.into_boxed_slice());
        }

        self.blocks[block_no].as_mut().unwrap()[slot] = Some(value);
        Ok(())
    }

    /// Returns the element at `index`, failing if it was never written or
    /// is out of range.
    pub fn get(&self, index: usize) -> Result<&T> {
        let (block_no, slot) = Self::block_and_slot(index);
        self.blocks
            .get(block_no)
            .and_then(|b| b.as_ref())
            .and_then(|b| b[slot].as_ref())
            .ok_or_else(|| Error::InvariantViolation(format!("index {index} never written")))
    }

    /// Returns some element in `seq[lo..=hi]` such that no other element in
    /// the range compares strictly greater under `is_less`. Ties are broken
    /// by scan order: the first-encountered maximal element wins.
    pub fn max_by(
        &self,
        lo: usize,
        hi: usize,
        is_less: impl Fn(&T, &T) -> bool,
    ) -> Result<&T> {
        let mut best: Option<&T> = None;
        for i in lo..=hi {
            let v = self.get(i)?;
            match best {
                None => best = Some(v),
                Some(b) if is_less(b, v) => best = Some(v),
                _ => {}
            }
        }
        best.ok_or_else(|| Error::InvariantViolation("max_by over empty range".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut seq = IndexedSequence::new(8);
        seq.set(0, 10u32).unwrap();
        seq.set(5, 20u32).unwrap();
        assert_eq!(*seq.get(0).unwrap(), 10);
        assert_eq!(*seq.get(5).unwrap(), 20);
    }

    #[test]
    fn test_get_unwritten_fails() {
        let mut seq = IndexedSequence::new(8);
        seq.set(0, 1u32).unwrap();
        assert!(seq.get(1).is_err());
    }

    #[test]
    fn test_growth_beyond_initial_capacity() {
        let mut seq = IndexedSequence::new(4);
        seq.set(10_000, 42u32).unwrap();
        assert_eq!(*seq.get(10_000).unwrap(), 42);
        // Cells before it remain unwritten.
        assert!(seq.get(9_999).is_err());
    }

    #[test]
    fn test_set_across_block_boundary() {
        let mut seq = IndexedSequence::new(1);
        seq.set(BLOCK_SIZE - 1, 1u32).unwrap();
        seq.set(BLOCK_SIZE, 2u32).unwrap();
        seq.set(BLOCK_SIZE + 1, 3u32).unwrap();
        assert_eq!(*seq.get(BLOCK_SIZE - 1).unwrap(), 1);
        assert_eq!(*seq.get(BLOCK_SIZE).unwrap(), 2);
        assert_eq!(*seq.get(BLOCK_SIZE + 1).unwrap(), 3);
    }

    #[test]
    fn test_max_by_first_encountered_wins_on_tie() {
        let mut seq = IndexedSequence::new(4);
        seq.set(0, (1, "first")).unwrap();
        seq.set(1, (5, "max")).unwrap();
        seq.set(2, (5, "also-max-but-later")).unwrap();
        seq.set(3, (2, "third")).unwrap();

        let best = seq
            .max_by(0, 3, |a: &(u32, &str), b: &(u32, &str)| a.0 < b.0)
            .unwrap();
        assert_eq!(best.1, "max");
    }

    #[test]
    fn test_max_by_idempotent_on_single_element() {
        let mut seq = IndexedSequence::new(1);
        seq.set(0, 7u32).unwrap();
        let best = seq.max_by(0, 0, |a, b| a < b).unwrap();
        assert_eq!(*best, 7);
    }
}
