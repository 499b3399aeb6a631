//! Map of multi-value registers sharing one causal context, keyed by
//! [`MapKey`] (text key plus [`TypeTag`]).
//!
//! Unlike [`crate::lww_map::LwwMap`], where each slot carries its own
//! timestamp, every slot here is governed by a single causal context shared
//! across the whole map, mirroring [`crate::mv_register::MvRegister`] but
//! fanned out over many keys at once.

use crate::crdt::Crdt;
use crate::error::CrdtError;
use crate::json;
use crate::tagged::{MapKey, PrimitiveValue, TypeTag};
use crate::timestamp::Timestamp;
use crate::version_vector::VersionVector;
use serde_json::{json as json_value, Map, Value};
use std::collections::HashMap;

type Entry = Vec<(Option<PrimitiveValue>, Timestamp)>;

/// A map of multi-value slots sharing one causal context.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MvMap {
    entries: HashMap<MapKey, Entry>,
    cc: VersionVector,
}

impl MvMap {
    /// An empty map that has observed nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The causal context shared by every key in this map.
    #[must_use]
    pub fn causal_context(&self) -> &VersionVector {
        &self.cc
    }

    /// The currently visible values under `key`/`tag`. `None` if the key is
    /// absent or its only entry is a tombstone; concurrent writes all appear
    /// together, and a tombstone concurrent with a real write is suppressed
    /// in favor of the real value(s).
    #[must_use]
    pub fn get(&self, key: &str, tag: TypeTag) -> Option<Vec<PrimitiveValue>> {
        let set = self.entries.get(&MapKey::new(key, tag))?;
        let values: Vec<PrimitiveValue> = set.iter().filter_map(|(v, _)| v.clone()).collect();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    fn write(&mut self, key: MapKey, value: Option<PrimitiveValue>, ts: Timestamp) -> Self {
        if self.cc.contains(&ts) {
            tracing::trace!(key = key.name(), ts = %ts, "mv map write ignored (already observed)");
            return Self::new();
        }
        self.entries.insert(key.clone(), vec![(value.clone(), ts.clone())]);
        self.cc.add(&ts);
        tracing::debug!(key = key.name(), ts = %ts, "mv map slot written");

        let mut delta_cc = VersionVector::new();
        delta_cc.add(&ts);
        let mut entries = HashMap::new();
        entries.insert(key, vec![(value, ts)]);
        Self { entries, cc: delta_cc }
    }

    /// Set `key` (under `tag`) to `value` as of `ts`. The returned delta
    /// carries only this key and a causal context containing only `ts`, not
    /// the map's full history.
    pub fn put(&mut self, key: &str, tag: TypeTag, value: PrimitiveValue, ts: Timestamp) -> Self {
        self.write(MapKey::new(key, tag), Some(value), ts)
    }

    /// Delete `key` (under `tag`) as of `ts`, leaving a tombstone entry.
    pub fn delete(&mut self, key: &str, tag: TypeTag, ts: Timestamp) -> Self {
        self.write(MapKey::new(key, tag), None, ts)
    }

    /// Put a boolean value.
    pub fn put_bool(&mut self, key: &str, value: bool, ts: Timestamp) -> Self {
        self.put(key, TypeTag::Boolean, PrimitiveValue::Bool(value), ts)
    }

    /// Put a double value.
    pub fn put_f64(&mut self, key: &str, value: f64, ts: Timestamp) -> Self {
        self.put(key, TypeTag::Double, PrimitiveValue::Double(value), ts)
    }

    /// Put an integer value.
    pub fn put_i32(&mut self, key: &str, value: i32, ts: Timestamp) -> Self {
        self.put(key, TypeTag::Integer, PrimitiveValue::Integer(value), ts)
    }

    /// Put a string value.
    pub fn put_string(&mut self, key: &str, value: impl Into<String>, ts: Timestamp) -> Self {
        self.put(key, TypeTag::Str, PrimitiveValue::Str(value.into()), ts)
    }
}

impl Crdt for MvMap {
    /// Both an assign-style delta (a single key, a partial causal context)
    /// and a full `generate_delta` result share this type. The empty map is
    /// the neutral element for `merge`.
    type Delta = Self;

    fn merge(&mut self, delta: Self::Delta) {
        let prior_cc = self.cc.clone();

        for (key, remote_set) in delta.entries {
            let kept_local: Entry = self
                .entries
                .get(&key)
                .map(|local_set| {
                    local_set
                        .iter()
                        .filter(|(_, ts)| {
                            !delta.cc.contains(ts) || remote_set.iter().any(|(_, rts)| rts == ts)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let mut merged = kept_local;
            for (value, ts) in remote_set {
                if !prior_cc.contains(&ts) && !merged.iter().any(|(_, kept)| *kept == ts) {
                    merged.push((value, ts));
                }
            }

            if merged.is_empty() {
                self.entries.remove(&key);
            } else {
                self.entries.insert(key, merged);
            }
        }

        self.cc.max(&delta.cc);

        for set in self.entries.values() {
            for (_, ts) in set {
                crate::error::debug_check_invariant(self.cc.contains(ts), format_args!("entry {ts} not in causal context after merge"));
            }
        }
    }

    fn generate_delta(&self, context: &VersionVector) -> Self::Delta {
        let entries = self
            .entries
            .iter()
            .filter(|(_, set)| set.iter().any(|(_, ts)| !context.contains(ts)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { entries, cc: self.cc.clone() }
    }
}

impl MvMap {
    /// Encode as
    /// `{"_type":"MVMap","_metadata":{"entries":{"<key>%<TAG>":[<ts>,...],...},"causalContext":<vv>},"<key>%<TAG>":[<v>,...],...}`.
    ///
    /// Numeric values are encoded as JSON strings in this shape (unlike
    /// [`crate::lww_map::LwwMap`], which uses natural JSON primitives) and
    /// re-parsed on read.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut metadata_entries = Map::new();
        let mut obj = Map::new();
        for (key, set) in &self.entries {
            let wire = key.wire();
            let timestamps: Vec<&Timestamp> = set.iter().map(|(_, ts)| ts).collect();
            metadata_entries.insert(wire.clone(), serde_json::to_value(timestamps).unwrap_or(Value::Null));
            let values: Vec<Value> = set
                .iter()
                .map(|(v, _)| v.as_ref().map_or(Value::Null, |pv| pv.to_json(true)))
                .collect();
            obj.insert(wire, Value::Array(values));
        }
        obj.insert("_type".to_string(), Value::String("MVMap".to_string()));
        obj.insert(
            "_metadata".to_string(),
            json_value!({ "entries": metadata_entries, "causalContext": &self.cc }),
        );
        Value::Object(obj).to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: Value = serde_json::from_str(s)?;
        json::check_type(&value, "MVMap")?;
        let obj = value.as_object().ok_or(CrdtError::InvalidShape("top-level value is not an object"))?;
        let metadata = json::field(&value, "_metadata")?;
        let cc: VersionVector = serde_json::from_value(json::field(metadata, "causalContext")?.clone())?;
        let metadata_entries = json::field(metadata, "entries")?
            .as_object()
            .ok_or(CrdtError::InvalidShape("_metadata.entries is not an object"))?;

        let mut entries = HashMap::with_capacity(metadata_entries.len());
        for (wire, ts_json) in metadata_entries {
            let key = MapKey::from_wire(wire)
                .ok_or(CrdtError::InvalidShape("map key missing a recognized type-tag suffix"))?;
            let timestamps: Vec<Timestamp> = serde_json::from_value(ts_json.clone())?;
            let values = obj
                .get(wire)
                .and_then(Value::as_array)
                .ok_or(CrdtError::InvalidShape("map key missing its paired value array"))?;
            if values.len() != timestamps.len() {
                return Err(CrdtError::InvalidShape("value array length does not match timestamp array length"));
            }
            let set = timestamps
                .into_iter()
                .zip(values)
                .map(|(ts, raw)| {
                    let pv = if raw.is_null() {
                        None
                    } else {
                        Some(
                            PrimitiveValue::from_json(key.tag(), raw)
                                .ok_or(CrdtError::InvalidShape("map value does not match its type tag"))?,
                        )
                    };
                    Ok((pv, ts))
                })
                .collect::<Result<Entry, CrdtError>>()?;
            entries.insert(key, set);
        }
        Ok(Self { entries, cc })
    }
}
