//! Expanding symbols back into raw bytes.
//!
//! See spec §4.6 and §9. `original_source/bpe/src/bpe.c`'s `resolve_pair`
//! recurses and memoizes through a string-keyed hash table; the recursion
//! is fine for the shallow dictionaries that small inputs produce, but
//! nothing bounds the merge DAG's depth in general, so this port replaces
//! the call stack with an explicit one and keeps the memo table keyed
//! directly on symbol ID.

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::types::Symbol;
use std::collections::HashMap;

/// Recursion/stack-depth ceiling. A dictionary trained on realistic
/// inputs never approaches this; it exists so a corrupt or adversarial
/// dictionary fails with [`Error::InvariantViolation`] instead of
/// exhausting memory on an unbounded expansion.
const MAX_EXPANSION_DEPTH: usize = 1 << 20;

/// Expands a single symbol to its byte sequence.
///
/// `memo` may be reused across calls (e.g. across the symbols of one
/// encoded stream) to amortize repeated expansion of the same symbol.
pub fn expand_symbol(
    symbol: Symbol,
    dictionary: &Dictionary,
    memo: &mut HashMap<Symbol, Box<[u8]>, ahash::RandomState>,
) -> Result<Box<[u8]>> {
    if let Some(cached) = memo.get(&symbol) {
        return Ok(cached.clone());
    }

    // Explicit post-order traversal: push (symbol, visited) frames, expand
    // children before parents, cache on the way back up.
    enum Frame {
        Enter(Symbol),
        Exit(Symbol),
    }

    let mut stack = vec![Frame::Enter(symbol)];
    let mut depth_guard = 0usize;

    while let Some(frame) = stack.pop() {
        depth_guard += 1;
        if depth_guard > MAX_EXPANSION_DEPTH {
            return Err(Error::InvariantViolation(
                "expansion exceeded maximum depth; dictionary may contain a cycle".into(),
            ));
        }

        match frame {
            Frame::Enter(s) => {
                if memo.contains_key(&s) {
                    continue;
                }
                if dictionary.is_leaf(s)? {
                    memo.insert(s, Box::from([s as u8]));
                    continue;
                }
                let rule = dictionary.rule(s)?;
                if rule.a >= s || rule.b >= s {
                    return Err(Error::InvariantViolation(format!(
                        "symbol {s} references a non-strictly-smaller constituent"
                    )));
                }
                stack.push(Frame::Exit(s));
                stack.push(Frame::Enter(rule.b));
                stack.push(Frame::Enter(rule.a));
            }
            Frame::Exit(s) => {
                if memo.contains_key(&s) {
                    continue;
                }
                let rule = dictionary.rule(s)?;
                let a = memo.get(&rule.a).expect("child expanded before parent");
                let b = memo.get(&rule.b).expect("child expanded before parent");
                let mut combined = Vec::with_capacity(a.len() + b.len());
                combined.extend_from_slice(a);
                combined.extend_from_slice(b);
                memo.insert(s, combined.into_boxed_slice());
            }
        }
    }

    Ok(memo.get(&symbol).expect("symbol expanded by traversal").clone())
}

/// Expands an entire encoded stream back into its original bytes.
pub fn decode(encoded: &[Symbol], dictionary: &Dictionary) -> Result<Vec<u8>> {
    let mut memo: HashMap<Symbol, Box<[u8]>, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());

    let mut out = Vec::new();
    for &symbol in encoded {
        let bytes = expand_symbol(symbol, dictionary, &mut memo)?;
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{train, TrainingOptions};

    #[test]
    fn test_expand_leaf_is_identity() {
        let dict = Dictionary::new().unwrap();
        let mut memo = HashMap::with_hasher(ahash::RandomState::new());
        let expanded = expand_symbol(b'x' as u32, &dict, &mut memo).unwrap();
        assert_eq!(&*expanded, b"x");
    }

    #[test]
    fn test_expand_composite_symbol() {
        let mut dict = Dictionary::new().unwrap();
        let ab = dict.mint(b'a' as u32, b'b' as u32).unwrap();
        let abc = dict.mint(ab, b'c' as u32).unwrap();

        let mut memo = HashMap::with_hasher(ahash::RandomState::new());
        let expanded = expand_symbol(abc, &dict, &mut memo).unwrap();
        assert_eq!(&*expanded, b"abc");
    }

    #[test]
    fn test_decode_roundtrips_training_output() {
        for input in [&b"abcabcabcabc"[..], b"aaabdaaabac", b"ab"] {
            let result = train(input, TrainingOptions::default()).unwrap();
            let decoded = decode(&result.encoded, &result.dictionary).unwrap();
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn test_decode_rejects_forward_referencing_rule() {
        let mut dict = Dictionary::new().unwrap();
        // Composite symbol 256 illegally references itself as constituent `a`.
        let corrupt = dict.mint(256, b'a' as u32).unwrap();
        let mut memo = HashMap::with_hasher(ahash::RandomState::new());
        assert!(matches!(
            expand_symbol(corrupt, &dict, &mut memo),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_memo_reused_across_repeated_symbols() {
        let mut dict = Dictionary::new().unwrap();
        let ab = dict.mint(b'a' as u32, b'b' as u32).unwrap();
        let mut memo = HashMap::with_hasher(ahash::RandomState::new());
        let first = expand_symbol(ab, &dict, &mut memo).unwrap();
        let second = expand_symbol(ab, &dict, &mut memo).unwrap();
        assert_eq!(first, second);
        assert_eq!(memo.len(), 3); // 'a', 'b' leaves plus ab, memoised once
    }
}
