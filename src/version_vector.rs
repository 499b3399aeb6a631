//! The version vector summarizing every timestamp a replica has observed.

use crate::timestamp::{ReplicaId, Timestamp};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A mapping from replica id to the highest counter observed for that
/// replica. A replica absent from the map is treated as having counter
/// `i32::MIN` (i.e. "never observed"), which makes [`VersionVector::le`] a
/// total comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionVector {
    entries: HashMap<ReplicaId, i32>,
}

impl VersionVector {
    /// An empty version vector; nothing observed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The counter recorded for `replica_id`, or `i32::MIN` if absent.
    #[must_use]
    pub fn counter(&self, replica_id: &ReplicaId) -> i32 {
        self.entries.get(replica_id).copied().unwrap_or(i32::MIN)
    }

    /// Whether this vector has observed `ts`, i.e. `self[ts.replica_id] >= ts.cnt`.
    #[must_use]
    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.counter(ts.replica_id()) >= ts.cnt()
    }

    /// Record `ts` as observed: `self[ts.replica_id] := max(self[ts.replica_id], ts.cnt)`.
    pub fn add(&mut self, ts: &Timestamp) {
        let entry = self.entries.entry(ts.replica_id().clone()).or_insert(i32::MIN);
        if ts.cnt() > *entry {
            *entry = ts.cnt();
        }
    }

    /// Pointwise max of `self` and `other`, merged into `self`.
    pub fn max(&mut self, other: &Self) {
        for (replica_id, &other_cnt) in &other.entries {
            let entry = self.entries.entry(replica_id.clone()).or_insert(i32::MIN);
            if other_cnt > *entry {
                *entry = other_cnt;
            }
        }
    }

    /// Whether `self` is dominated pointwise by `other`, i.e. for every
    /// replica id present in either vector, `self[k] <= other[k]`.
    #[must_use]
    pub fn le(&self, other: &Self) -> bool {
        self.entries
            .keys()
            .chain(other.entries.keys())
            .all(|replica_id| self.counter(replica_id) <= other.counter(replica_id))
    }

    /// Iterate over the `(replica_id, counter)` pairs actually stored. Does
    /// not include replicas this vector has never observed.
    pub fn iter(&self) -> impl Iterator<Item = (&ReplicaId, i32)> {
        self.entries.iter().map(|(k, &v)| (k, v))
    }
}

impl Serialize for VersionVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Wire {
            entries: BTreeMap<String, i32>,
        }
        let wire = Wire {
            entries: self
                .entries
                .iter()
                .map(|(k, &v)| (k.as_str().to_string(), v))
                .collect(),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VersionVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wire {
            entries: BTreeMap<String, i32>,
        }
        let wire = Wire::deserialize(deserializer).map_err(D::Error::custom)?;
        Ok(VersionVector {
            entries: wire
                .entries
                .into_iter()
                .map(|(k, v)| (ReplicaId::new(k), v))
                .collect(),
        })
    }
}
