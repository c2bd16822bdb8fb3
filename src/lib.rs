//! # BPE Compressor
//!
//! A byte-level byte-pair-encoding compressor: it repeatedly replaces the
//! most frequent adjacent pair of symbols in a byte stream with a freshly
//! minted symbol, producing a short encoded stream and a dictionary of
//! merge rules that expand it back to the original bytes.
//!
//! The frequency count behind the first merge decision is computed in
//! parallel across scoped worker threads; every subsequent count is
//! recomputed in the same pass that rewrites the stream, rather than
//! in a second pass over the result.
//!
//! ## Example
//!
//! ```
//! use bpe_compressor::{encode, decode};
//!
//! let input = b"abcabcabcabc";
//! let result = encode(input, Default::default()).unwrap();
//! assert!(result.encoded.len() < input.len());
//!
//! let restored = decode(&result.encoded, &result.dictionary).unwrap();
//! assert_eq!(restored, input);
//! ```
//!
//! ## Dictionary persistence
//!
//! ```
//! use bpe_compressor::{encode, Dictionary};
//!
//! let result = encode(b"abcabcabcabc", Default::default()).unwrap();
//! let mut buf = Vec::new();
//! result.dictionary.serialize(&mut buf).unwrap();
//! let restored = Dictionary::deserialize(&buf[..]).unwrap();
//! assert_eq!(restored.len(), result.dictionary.len());
//! ```

mod dictionary;
mod error;
mod frequency_counter;
mod indexed_seq;
mod pair_count_map;
mod training;

mod decoder;

pub mod types;

#[cfg(test)]
mod tests;

pub use decoder::{decode, expand_symbol};
pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use training::{train as encode, TrainingOptions, TrainingResult};
pub use types::{MergeRule, Pair, PairFrequency, Symbol, LEAF_COUNT};

pub use frequency_counter::count_pairs;
pub use indexed_seq::IndexedSequence;
pub use pair_count_map::PairCountMap;
