//! The common shape shared by every CRDT in this crate.
//!
//! Each CRDT's delta is tied to its own type through the associated `Delta`
//! type below, so the compiler rejects cross-type merges at the call site
//! rather than needing a runtime check in `merge`.
//! [`crate::error::CrdtError::UnexpectedType`] still exists for the one
//! place a mismatch can occur at runtime: decoding a `_type` discriminator
//! from JSON that does not match the CRDT being deserialized into.

use crate::version_vector::VersionVector;

/// Common operations for a delta-state CRDT.
///
/// `generate_delta` produces a value representing everything the instance
/// knows that a peer summarized by `context` does not; `merge` folds a
/// delta (possibly received out of order, possibly a duplicate) into the
/// local state. Both are total: there is no error case in this trait,
/// because a stale or duplicate delta is a defined no-op.
pub trait Crdt {
    /// The type used to carry a delta. For every CRDT in this crate this is
    /// either `Self` (when the CRDT's own empty/default state already acts
    /// as a neutral element under merge) or an `Option<_>` wrapper around a
    /// dedicated delta payload (when it does not).
    type Delta;

    /// Merge `delta` into `self`. Must be commutative, associative, and
    /// idempotent with respect to the set of deltas ever produced by any
    /// replica for this CRDT instance.
    fn merge(&mut self, delta: Self::Delta);

    /// Produce the delta representing everything `self` knows that is not
    /// already covered by `context`.
    fn generate_delta(&self, context: &VersionVector) -> Self::Delta;
}
