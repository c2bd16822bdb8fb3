//! Error types surfaced by training, encoding and decoding.

/// Everything that can go wrong in this crate.
///
/// Propagation is strict: no error is recovered internally. A failing call
/// unwinds, releases its owned resources via `Drop`, and returns the error
/// to its caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input has fewer than 2 bytes; no training is possible.
    #[error("input too short: need at least 2 bytes, got {len}")]
    InputTooShort {
        /// Number of bytes actually supplied.
        len: usize,
    },

    /// An allocation failed somewhere in the pipeline.
    #[error("out of memory")]
    OutOfMemory,

    /// The dictionary or encoded stream is corrupt: a composite symbol
    /// references a symbol that is not strictly smaller than itself, or an
    /// encoded token references a symbol absent from the dictionary.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O failure at the serialization boundary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
