//! Error types for the CRDT core.
//!
//! Every operation in this crate is total except merging a delta decoded
//! from JSON whose `_type` discriminator does not match the expected CRDT
//! kind; in-process merges are rejected by the type system instead (see
//! the `Crdt` trait). A stale or duplicate timestamp passed to `assign`,
//! `put`, or `delete` is a defined no-op, never an error.

use std::fmt;

/// Errors surfaced to callers of this crate.
#[derive(Debug, thiserror::Error)]
pub enum CrdtError {
    /// A JSON payload carried a `_type` discriminator for a different CRDT
    /// kind than the one being deserialized into.
    #[error("unexpected CRDT type: expected {expected}, found {found}")]
    UnexpectedType {
        /// The CRDT kind the caller asked to decode.
        expected: &'static str,
        /// The `_type` discriminator actually present in the payload.
        found: String,
    },

    /// The JSON payload did not satisfy the required shape for this CRDT.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The payload was valid JSON but missing a field this CRDT's shape
    /// requires.
    #[error("malformed JSON: missing field `{0}`")]
    MissingField(&'static str),

    /// The payload was valid JSON, had the right fields, but its shape
    /// violated a constraint specific to the CRDT being decoded (e.g. a map
    /// key without a recognized type-tag suffix, or a value that does not
    /// match its declared type tag).
    #[error("malformed JSON: {0}")]
    InvalidShape(&'static str),
}

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, CrdtError>;

/// Panics in debug builds if `condition` is false; a no-op in release
/// builds. Used at points where violating the condition indicates a bug in
/// this crate rather than bad input; never surfaced to callers as an
/// error.
#[inline]
pub(crate) fn debug_check_invariant(condition: bool, what: impl fmt::Display) {
    debug_assert!(condition, "CRDT invariant violated: {what}");
}
