//! Single-value, last-writer-wins register.

use crate::crdt::Crdt;
use crate::error::CrdtError;
use crate::json;
use crate::timestamp::{ReplicaId, Timestamp};
use crate::version_vector::VersionVector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json as json_value;

/// A single-slot register where concurrent writes are resolved by keeping
/// the value with the greatest [`Timestamp`].
///
/// Because [`Timestamp`]'s order is total, ties are only possible when both
/// the counter and replica id match, which can only happen if the same
/// write was observed twice; in that case the values are equal by
/// construction and the tie is immaterial.
#[derive(Clone, Debug, PartialEq)]
pub struct LwwRegister<T> {
    value: T,
    ts: Timestamp,
}

/// A non-empty delta for [`LwwRegister`] replication; `None` represents
/// the empty delta produced when an `assign` does not win.
pub type LwwRegisterDelta<T> = Option<LwwRegisterPayload<T>>;

/// The payload of a non-empty [`LwwRegister`] delta.
#[derive(Clone, Debug, PartialEq)]
pub struct LwwRegisterPayload<T> {
    /// The value as of `ts`.
    pub value: T,
    /// The timestamp of the write this payload represents.
    pub ts: Timestamp,
}

impl<T: Clone> LwwRegister<T> {
    /// Create a register holding `value` as of `ts`.
    #[must_use]
    pub fn new(value: T, ts: Timestamp) -> Self {
        Self { value, ts }
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// The timestamp of the current value.
    #[must_use]
    pub fn timestamp(&self) -> &Timestamp {
        &self.ts
    }

    /// Assign `value` as of `ts`. Returns the delta representing this
    /// write: `Some` if it won (`ts` greater than the current timestamp),
    /// `None` (the empty delta) otherwise.
    pub fn assign(&mut self, value: T, ts: Timestamp) -> LwwRegisterDelta<T> {
        if ts > self.ts {
            self.value = value.clone();
            self.ts = ts.clone();
            tracing::debug!(ts = %ts, "lww register assigned");
            Some(LwwRegisterPayload { value, ts })
        } else {
            tracing::trace!(ts = %ts, current_ts = %self.ts, "lww register assign ignored (stale)");
            None
        }
    }
}

impl<T: Clone> Crdt for LwwRegister<T> {
    type Delta = LwwRegisterDelta<T>;

    fn merge(&mut self, delta: Self::Delta) {
        if let Some(payload) = delta {
            if payload.ts > self.ts {
                self.value = payload.value;
                self.ts = payload.ts;
            }
        }
    }

    fn generate_delta(&self, context: &VersionVector) -> Self::Delta {
        if context.contains(&self.ts) {
            None
        } else {
            Some(LwwRegisterPayload {
                value: self.value.clone(),
                ts: self.ts.clone(),
            })
        }
    }
}

impl<T> LwwRegister<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Encode as `{"_type":"LWWRegister","_metadata":{"uid":<replica id>,"cnt":<counter>},"value":<v>}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        json_value!({
            "_type": "LWWRegister",
            "_metadata": { "uid": self.ts.replica_id().as_str(), "cnt": self.ts.cnt() },
            "value": &self.value,
        })
        .to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        json::check_type(&value, "LWWRegister")?;
        let metadata = json::field(&value, "_metadata")?;
        let uid = json::field(metadata, "uid")?
            .as_str()
            .ok_or(CrdtError::InvalidShape("_metadata.uid is not a string"))?;
        let cnt = json::field(metadata, "cnt")?
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(CrdtError::InvalidShape("_metadata.cnt is not an i32"))?;
        let ts = Timestamp::new(cnt, ReplicaId::new(uid));
        let data: T = serde_json::from_value(json::field(&value, "value")?.clone())?;
        Ok(Self { value: data, ts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::ReplicaId;

    fn ts(cnt: i32, rid: &str) -> Timestamp {
        Timestamp::new(cnt, ReplicaId::new(rid))
    }

    #[test]
    fn assign_with_greater_timestamp_wins() {
        let mut reg = LwwRegister::new("A", ts(1, "a"));
        let delta = reg.assign("B", ts(2, "a"));
        assert_eq!(*reg.get(), "B");
        assert!(delta.is_some());
    }

    #[test]
    fn assign_with_lesser_timestamp_is_a_noop() {
        let mut reg = LwwRegister::new("A", ts(5, "a"));
        let delta = reg.assign("B", ts(1, "a"));
        assert_eq!(*reg.get(), "A");
        assert!(delta.is_none());
    }

    #[test]
    fn concurrent_creation_resolves_by_replica_id() {
        // R1 creates with ("A", ts=(1,"a")); R2 creates with ("B", ts=(1,"b")).
        let mut r1 = LwwRegister::new("A", ts(1, "a"));
        let mut r2 = LwwRegister::new("B", ts(1, "b"));

        let delta_from_r2 = r2.generate_delta(&VersionVector::new());
        let delta_from_r1 = r1.generate_delta(&VersionVector::new());
        r1.merge(delta_from_r2);
        r2.merge(delta_from_r1);

        assert_eq!(*r1.get(), "B");
        assert_eq!(*r2.get(), "B");
    }

    #[test]
    fn generate_delta_is_empty_when_context_covers_timestamp() {
        let reg = LwwRegister::new("A", ts(1, "a"));
        let mut vv = VersionVector::new();
        vv.add(&ts(1, "a"));
        assert!(reg.generate_delta(&vv).is_none());
    }

    #[test]
    fn merge_with_empty_delta_is_a_noop() {
        let mut reg = LwwRegister::new("A", ts(1, "a"));
        reg.merge(None);
        assert_eq!(*reg.get(), "A");
    }

    #[test]
    fn json_roundtrip() {
        let reg = LwwRegister::new(42, ts(3, "a"));
        let encoded = reg.to_json();
        let decoded: LwwRegister<i32> = LwwRegister::from_json(&encoded).unwrap();
        assert_eq!(reg, decoded);
    }

    #[test]
    fn json_shape_uses_expected_field_names() {
        let reg = LwwRegister::new(42, ts(3, "a"));
        let value: serde_json::Value = serde_json::from_str(&reg.to_json()).unwrap();
        assert_eq!(value["_type"], "LWWRegister");
        assert_eq!(value["value"], 42);
        assert_eq!(value["_metadata"]["uid"], "a");
        assert_eq!(value["_metadata"]["cnt"], 3);
    }

    #[test]
    fn from_json_rejects_wrong_type() {
        let err = LwwRegister::<i32>::from_json(r#"{"_type":"MVRegister","value":1}"#);
        assert!(matches!(err, Err(CrdtError::UnexpectedType { .. })));
    }
}
