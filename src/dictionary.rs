//! The merge-rule dictionary: a forest of [`MergeRule`]s indexed by
//! composite symbol ID, plus its on-disk serialization.
//!
//! See spec §4.3 and §6. Leaf symbols `0..256` carry the identity rule
//! `(s, 0)`; `rule.a == s` is how [`Dictionary::is_leaf`] recognises them
//! without a side flag, matching `original_source/bpe/src/bpe.c`'s
//! `resolve_pair` base case (`if (pairs[sym].a == sym)`).

use crate::error::{Error, Result};
use crate::indexed_seq::IndexedSequence;
use crate::types::{MergeRule, Pair, Symbol, LEAF_COUNT};
use std::io::{Read, Write};

/// The ordered collection of merge rules minted during training.
///
/// Symbol IDs `0..LEAF_COUNT` are implicit leaves; IDs `>= LEAF_COUNT` are
/// minted by [`Dictionary::mint`] in strictly increasing order, so `a < s`
/// and `b < s` hold for every composite rule by construction.
#[derive(Debug)]
pub struct Dictionary {
    rules: IndexedSequence<MergeRule>,
    next_symbol: Symbol,
}

impl Dictionary {
    /// Creates an empty dictionary with the 256 leaf identities pre-seeded.
    pub fn new() -> Result<Self> {
        let mut rules = IndexedSequence::new(LEAF_COUNT as usize);
        for leaf in 0..LEAF_COUNT {
            rules.set(leaf as usize, Pair::new(leaf, 0))?;
        }
        Ok(Self {
            rules,
            next_symbol: LEAF_COUNT,
        })
    }

    /// Mints a new composite symbol standing for `a` followed by `b`,
    /// returning its freshly-assigned ID.
    pub fn mint(&mut self, a: Symbol, b: Symbol) -> Result<Symbol> {
        let id = self.next_symbol;
        self.rules.set(id as usize, Pair::new(a, b))?;
        self.next_symbol = self
            .next_symbol
            .checked_add(1)
            .ok_or(Error::InvariantViolation("symbol space exhausted".into()))?;
        Ok(id)
    }

    /// Returns the rule for `symbol`.
    pub fn rule(&self, symbol: Symbol) -> Result<MergeRule> {
        self.rules.get(symbol as usize).copied()
    }

    /// True if `symbol` is a leaf (expands to a single raw byte).
    pub fn is_leaf(&self, symbol: Symbol) -> Result<bool> {
        Ok(self.rule(symbol)?.a == symbol && symbol < LEAF_COUNT)
    }

    /// Number of symbols known to the dictionary, leaves included.
    pub fn len(&self) -> usize {
        self.next_symbol as usize
    }

    /// True if no composite symbols have been minted yet.
    pub fn is_empty(&self) -> bool {
        self.next_symbol == LEAF_COUNT
    }

    /// Writes the dictionary's composite entries as a sequence of
    /// little-endian `(a, b)` `u32` pairs, in ascending symbol order.
    /// No header, no magic, no leaf entries: matches spec §6's on-disk
    /// layout and `original_source/bpe/src/bpe.c`'s `dump_pairs`, which
    /// writes only the entries past the 256 implicit leaf identities.
    pub fn serialize<W: Write>(&self, mut out: W) -> Result<()> {
        for symbol in LEAF_COUNT..self.next_symbol {
            let rule = self.rule(symbol)?;
            out.write_all(&rule.a.to_le_bytes())?;
            out.write_all(&rule.b.to_le_bytes())?;
        }
        Ok(())
    }

    /// Reads a dictionary previously written by [`Self::serialize`]:
    /// records until EOF, each one a composite entry starting at symbol
    /// 256. The 256 leaf identities are materialised implicitly, not
    /// read from the stream. Matches `original_source/bpe/src/bpe.c`'s
    /// `read_pairs`.
    pub fn deserialize<R: Read>(mut input: R) -> Result<Self> {
        let mut dict = Self::new()?;
        let mut pair_buf = [0u8; 8];

        loop {
            let mut filled = 0;
            while filled < pair_buf.len() {
                match input.read(&mut pair_buf[filled..])? {
                    0 => break,
                    n => filled += n,
                }
            }
            if filled == 0 {
                break;
            }
            if filled != pair_buf.len() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "truncated dictionary record",
                )));
            }

            let a = u32::from_le_bytes(pair_buf[0..4].try_into().unwrap());
            let b = u32::from_le_bytes(pair_buf[4..8].try_into().unwrap());
            let symbol = dict.next_symbol;

            if a >= symbol || b >= symbol {
                return Err(Error::InvariantViolation(format!(
                    "symbol {symbol} references non-strictly-smaller constituent ({a}, {b})"
                )));
            }

            dict.rules.set(symbol as usize, Pair::new(a, b))?;
            dict.next_symbol = symbol
                .checked_add(1)
                .ok_or(Error::InvariantViolation("symbol space exhausted".into()))?;
        }

        Ok(dict)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new().expect("seeding 256 leaf identities cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_preseeded_as_identity() {
        let dict = Dictionary::new().unwrap();
        assert_eq!(dict.rule(65).unwrap(), Pair::new(65, 0));
        assert!(dict.is_leaf(65).unwrap());
        assert_eq!(dict.len(), LEAF_COUNT as usize);
    }

    #[test]
    fn test_mint_assigns_increasing_ids() {
        let mut dict = Dictionary::new().unwrap();
        let s1 = dict.mint(b'a' as u32, b'b' as u32).unwrap();
        let s2 = dict.mint(s1, b'c' as u32).unwrap();
        assert_eq!(s1, LEAF_COUNT);
        assert_eq!(s2, LEAF_COUNT + 1);
        assert!(!dict.is_leaf(s1).unwrap());
        assert_eq!(dict.rule(s2).unwrap(), Pair::new(s1, b'c' as u32));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut dict = Dictionary::new().unwrap();
        let s1 = dict.mint(b'a' as u32, b'b' as u32).unwrap();
        dict.mint(s1, b'c' as u32).unwrap();

        let mut buf = Vec::new();
        dict.serialize(&mut buf).unwrap();

        let restored = Dictionary::deserialize(&buf[..]).unwrap();
        assert_eq!(restored.len(), dict.len());
        for symbol in 0..dict.len() as u32 {
            assert_eq!(restored.rule(symbol).unwrap(), dict.rule(symbol).unwrap());
        }
    }

    #[test]
    fn test_deserialize_rejects_truncated_record() {
        let mut dict = Dictionary::new().unwrap();
        dict.mint(b'a' as u32, b'b' as u32).unwrap();
        let mut buf = Vec::new();
        dict.serialize(&mut buf).unwrap();
        buf.truncate(3);
        assert!(Dictionary::deserialize(&buf[..]).is_err());
    }

    #[test]
    fn test_deserialize_rejects_forward_reference() {
        let mut buf = Vec::new();
        // Composite symbol 256 illegally references symbol 256 itself.
        buf.extend_from_slice(&256u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());

        assert!(matches!(
            Dictionary::deserialize(&buf[..]),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_serialize_omits_leaf_entries() {
        let dict = Dictionary::new().unwrap();
        let mut buf = Vec::new();
        dict.serialize(&mut buf).unwrap();
        assert!(buf.is_empty());

        let restored = Dictionary::deserialize(&buf[..]).unwrap();
        assert_eq!(restored.len(), LEAF_COUNT as usize);
    }
}
