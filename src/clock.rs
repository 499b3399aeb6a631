//! The environment contract: a source of fresh, monotonically increasing
//! timestamps on one replica.
//!
//! This is deliberately outside the core algebra; the core only needs the
//! contract in [`TimestampSource`] to be upheld. [`MonotonicClock`] is a
//! minimal, in-crate implementation a hosting application can use directly
//! or replace; it is a plain per-replica counter, not a hybrid-physical-time
//! clock, since timestamps here are `(cnt, replica_id)` pairs with no
//! wall-clock component.

use crate::timestamp::{ReplicaId, Timestamp};

/// A source of fresh timestamps for one replica.
///
/// Implementations must never return a `cnt` they have already returned
/// before on this replica, and must upheld the contract that
/// `next_timestamp()` always returns a timestamp strictly greater (by
/// [`Timestamp`]'s order) than every timestamp previously returned or
/// passed to [`TimestampSource::update_state`].
pub trait TimestampSource {
    /// Produce a timestamp strictly greater than every previously returned
    /// timestamp on this replica.
    fn next_timestamp(&mut self) -> Timestamp;

    /// Lift the local counter above an externally observed timestamp, so
    /// that the next locally generated timestamp is still guaranteed to be
    /// fresh even after receiving deltas from other replicas.
    fn update_state(&mut self, ts: &Timestamp);
}

/// A plain per-replica monotonic counter implementing [`TimestampSource`].
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    replica_id: ReplicaId,
    counter: i32,
}

impl MonotonicClock {
    /// Create a clock for `replica_id` starting below any issued counter.
    #[must_use]
    pub fn new(replica_id: ReplicaId) -> Self {
        Self {
            replica_id,
            counter: i32::MIN,
        }
    }

    /// Create a clock whose next timestamp will have counter `start`.
    ///
    /// Useful in tests that need to pin exact counter values rather than
    /// just monotonic progression.
    #[must_use]
    pub fn starting_at(replica_id: ReplicaId, start: i32) -> Self {
        Self {
            replica_id,
            counter: start.saturating_sub(1),
        }
    }

    /// The replica id this clock issues timestamps for.
    #[must_use]
    pub fn replica_id(&self) -> &ReplicaId {
        &self.replica_id
    }

    /// The counter of the last timestamp issued or observed, without
    /// advancing the clock.
    #[must_use]
    pub fn current_counter(&self) -> i32 {
        self.counter
    }
}

impl TimestampSource for MonotonicClock {
    fn next_timestamp(&mut self) -> Timestamp {
        self.counter = self
            .counter
            .checked_add(1)
            .expect("timestamp counter exhausted");
        let ts = Timestamp::new(self.counter, self.replica_id.clone());
        tracing::trace!(replica_id = %self.replica_id, cnt = self.counter, "issued timestamp");
        ts
    }

    fn update_state(&mut self, ts: &Timestamp) {
        if ts.cnt() > self.counter {
            self.counter = ts.cnt();
            tracing::trace!(
                replica_id = %self.replica_id,
                observed_cnt = ts.cnt(),
                "lifted local counter"
            );
        }
    }
}
