//! A delta-state CRDT core.
//!
//! Every type in this crate is a replicated data structure that converges
//! under concurrent, out-of-order, at-least-once delivery: merging is
//! commutative, associative, and idempotent, so two replicas that have seen
//! the same set of updates, in whatever order, with whatever duplication,
//! end up in the same state (Strong Eventual Consistency).
//!
//! State lives behind the [`Crdt`] trait: `generate_delta` produces what a
//! replica knows that a peer (summarized by a [`VersionVector`]) does not,
//! and `merge` folds a received delta back in. Six CRDT variants build on
//! the same causal metadata ([`Timestamp`], [`VersionVector`]):
//!
//! - [`LwwRegister`]: single value, last writer wins by timestamp.
//! - [`MvRegister`]: single slot, every concurrent write is kept.
//! - [`LwwMap`]: map of independently timestamped LWW slots.
//! - [`MvMap`]: map of MV slots sharing one causal context.
//! - [`JsmRegister`]: value is the join (max) of every assignment.
//! - [`Immutable`]: set once; a divergent second write fails loudly.
//!
//! Every type also has `to_json`/`from_json` for the wire encoding described
//! in each module.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod crdt;
pub mod error;
pub mod immutable;
pub mod jsm_register;
pub mod lww_map;
pub mod lww_register;
pub mod mv_map;
pub mod mv_register;
pub mod tagged;
pub mod timestamp;
pub mod version_vector;

mod json;

pub use clock::{MonotonicClock, TimestampSource};
pub use crdt::Crdt;
pub use error::{CrdtError, Result};
pub use immutable::Immutable;
pub use jsm_register::JsmRegister;
pub use lww_map::LwwMap;
pub use lww_register::{LwwRegister, LwwRegisterDelta, LwwRegisterPayload};
pub use mv_map::MvMap;
pub use mv_register::MvRegister;
pub use tagged::{MapKey, PrimitiveValue, TypeTag};
pub use timestamp::{ReplicaId, Timestamp};
pub use version_vector::VersionVector;
