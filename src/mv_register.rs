//! Multi-value register: concurrent writes are all retained and returned
//! together.

use crate::crdt::Crdt;
use crate::error::{debug_check_invariant, CrdtError};
use crate::json;
use crate::timestamp::Timestamp;
use crate::version_vector::VersionVector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json as json_value;

/// A register that keeps every concurrently written value rather than
/// picking a single winner.
///
/// State is the set of `(value, timestamp)` pairs still considered current,
/// plus the causal context summarizing every timestamp ever observed.
#[derive(Clone, Debug, PartialEq)]
pub struct MvRegister<T> {
    entries: Vec<(T, Timestamp)>,
    cc: VersionVector,
}

impl<T: Clone> MvRegister<T> {
    /// An empty register that has observed nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cc: VersionVector::new(),
        }
    }

    /// The set of currently visible values (projection of the entries onto
    /// their first component). Concurrent writes all appear; order is
    /// unspecified.
    #[must_use]
    pub fn get(&self) -> Vec<T> {
        self.entries.iter().map(|(v, _)| v.clone()).collect()
    }

    /// The causal context: every timestamp this register has observed.
    #[must_use]
    pub fn causal_context(&self) -> &VersionVector {
        &self.cc
    }

    /// Assign `value` as of `ts`. A no-op (empty delta) if `ts` is already
    /// in the causal context (a stale or duplicate write); otherwise clears
    /// the entry set down to just this write and returns a full copy of the
    /// new state as the delta.
    pub fn assign(&mut self, value: T, ts: Timestamp) -> Self {
        if self.cc.contains(&ts) {
            tracing::trace!(ts = %ts, "mv register assign ignored (already observed)");
            return Self::new();
        }
        self.entries = vec![(value, ts.clone())];
        self.cc.add(&ts);
        tracing::debug!(ts = %ts, "mv register assigned");
        self.clone()
    }
}

impl<T: Clone> Default for MvRegister<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> Crdt for MvRegister<T> {
    /// The empty register (`Self::default()`) is the neutral element: it
    /// carries no entries and no causal context, so merging it changes
    /// nothing.
    type Delta = Self;

    fn merge(&mut self, delta: Self::Delta) {
        let kept_local = self.entries.iter().filter(|(_, ts)| {
            !delta.cc.contains(ts) || delta.entries.iter().any(|(_, other_ts)| other_ts == ts)
        });
        let kept_remote = delta.entries.iter().filter(|(_, ts)| !self.cc.contains(ts));

        let mut merged: Vec<(T, Timestamp)> = kept_local.cloned().collect();
        for (value, ts) in kept_remote {
            if !merged.iter().any(|(_, kept_ts)| kept_ts == ts) {
                merged.push((value.clone(), ts.clone()));
            }
        }

        self.entries = merged;
        self.cc.max(&delta.cc);

        for (_, ts) in &self.entries {
            debug_check_invariant(self.cc.contains(ts), format_args!("entry {ts} not in causal context after merge"));
        }
    }

    fn generate_delta(&self, context: &VersionVector) -> Self::Delta {
        if self.cc.le(context) {
            Self::new()
        } else {
            self.clone()
        }
    }
}

impl<T> MvRegister<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Encode as
    /// `{"_type":"MVRegister","_metadata":{"entries":[<ts>,...],"causalContext":<vv>},"value":[<v>,...]}`
    /// where `value[i]` corresponds to `_metadata.entries[i]`.
    #[must_use]
    pub fn to_json(&self) -> String {
        let entries: Vec<&Timestamp> = self.entries.iter().map(|(_, ts)| ts).collect();
        let values: Vec<&T> = self.entries.iter().map(|(v, _)| v).collect();
        json_value!({
            "_type": "MVRegister",
            "_metadata": { "entries": entries, "causalContext": &self.cc },
            "value": values,
        })
        .to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        json::check_type(&value, "MVRegister")?;
        let metadata = json::field(&value, "_metadata")?;
        let entries: Vec<Timestamp> = serde_json::from_value(json::field(metadata, "entries")?.clone())?;
        let cc: VersionVector = serde_json::from_value(json::field(metadata, "causalContext")?.clone())?;
        let values: Vec<T> = serde_json::from_value(json::field(&value, "value")?.clone())?;
        if values.len() != entries.len() {
            return Err(CrdtError::MissingField("value"));
        }
        Ok(Self {
            entries: entries.into_iter().zip(values).map(|(ts, v)| (v, ts)).collect(),
            cc,
        })
    }
}
