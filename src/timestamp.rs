//! Replica identifiers and the causal timestamps built on top of them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An opaque, totally ordered name for a replica (e.g. a short string).
///
/// Ordering is simple lexicographic ordering on the underlying name; the
/// core only relies on `ReplicaId` being a total order, never on its
/// contents having any other meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicaId {
    name: String,
}

impl ReplicaId {
    /// Create a replica id from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for ReplicaId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ReplicaId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A causal timestamp: `(cnt, replica_id)`, ordered lexicographically on
/// `cnt` first and `replica_id` second.
///
/// A replica must issue timestamps with strictly increasing `cnt` relative
/// to its own previously issued timestamps. Counters from different
/// replicas may collide; the tie is then broken by `replica_id`, which
/// makes the order total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(rename = "id")]
    replica_id: ReplicaId,
    cnt: i32,
}

impl Timestamp {
    /// Construct a timestamp directly. Most callers should instead obtain
    /// timestamps from an environment implementing [`crate::clock::TimestampSource`].
    #[must_use]
    pub fn new(cnt: i32, replica_id: ReplicaId) -> Self {
        Self { replica_id, cnt }
    }

    /// The counter component.
    #[must_use]
    pub fn cnt(&self) -> i32 {
        self.cnt
    }

    /// The replica that issued this timestamp.
    #[must_use]
    pub fn replica_id(&self) -> &ReplicaId {
        &self.replica_id
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cnt
            .cmp(&other.cnt)
            .then_with(|| self.replica_id.cmp(&other.replica_id))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cnt, self.replica_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(cnt: i32, rid: &str) -> Timestamp {
        Timestamp::new(cnt, ReplicaId::new(rid))
    }

    #[test]
    fn orders_by_counter_first() {
        assert!(ts(1, "z") < ts(2, "a"));
    }

    #[test]
    fn breaks_ties_by_replica_id() {
        assert!(ts(1, "a") < ts(1, "b"));
        assert!(ts(1, "b") > ts(1, "a"));
        assert_eq!(ts(1, "a").cmp(&ts(1, "a")), Ordering::Equal);
    }

    #[test]
    fn is_a_total_order() {
        let mut timestamps = vec![ts(2, "a"), ts(1, "b"), ts(1, "a"), ts(2, "b")];
        timestamps.sort();
        assert_eq!(
            timestamps,
            vec![ts(1, "a"), ts(1, "b"), ts(2, "a"), ts(2, "b")]
        );
    }

    #[test]
    fn json_roundtrip() {
        let t = ts(5, "replica-a");
        let encoded = serde_json::to_string(&t).unwrap();
        let decoded: Timestamp = serde_json::from_str(&encoded).unwrap();
        assert_eq!(t, decoded);
    }

    #[test]
    fn json_shape_uses_expected_field_names() {
        let t = ts(5, "replica-a");
        let value: serde_json::Value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["id"]["name"], "replica-a");
        assert_eq!(value["cnt"], 5);
    }
}
