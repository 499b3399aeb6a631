//! Map of last-writer-wins slots, each independently timestamped.
//!
//! Keys are partitioned by [`TypeTag`] (see [`crate::tagged`]), so `"count"`
//! as an integer and `"count"` as a string occupy distinct slots. Deletes are
//! tombstones: a slot with `value: None` still carries a timestamp so a
//! late-arriving stale `put` does not resurrect it.

use crate::crdt::Crdt;
use crate::error::CrdtError;
use crate::json;
use crate::tagged::{MapKey, PrimitiveValue, TypeTag};
use crate::timestamp::Timestamp;
use crate::version_vector::VersionVector;
use serde_json::{json as json_value, Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    value: Option<PrimitiveValue>,
    ts: Timestamp,
}

/// A map of independently-timestamped, last-writer-wins slots.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LwwMap {
    entries: HashMap<MapKey, Slot>,
}

impl LwwMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live value stored under `key`/`tag`, or `None` if absent or
    /// deleted.
    #[must_use]
    pub fn get(&self, key: &str, tag: TypeTag) -> Option<PrimitiveValue> {
        self.entries
            .get(&MapKey::new(key, tag))
            .and_then(|slot| slot.value.clone())
    }

    fn write(&mut self, key: MapKey, value: Option<PrimitiveValue>, ts: Timestamp) -> Self {
        let wins = match self.entries.get(&key) {
            Some(existing) => ts > existing.ts,
            None => true,
        };
        if !wins {
            tracing::trace!(key = key.name(), ts = %ts, "lww map write ignored (stale)");
            return Self::new();
        }
        self.entries.insert(key.clone(), Slot { value: value.clone(), ts: ts.clone() });
        tracing::debug!(key = key.name(), ts = %ts, "lww map slot written");
        let mut delta = Self::new();
        delta.entries.insert(key, Slot { value, ts });
        delta
    }

    /// Set `key` (under `tag`) to `value` as of `ts`. Returns the delta
    /// representing this write: empty if a newer write is already present.
    pub fn put(&mut self, key: &str, tag: TypeTag, value: PrimitiveValue, ts: Timestamp) -> Self {
        self.write(MapKey::new(key, tag), Some(value), ts)
    }

    /// Delete `key` (under `tag`) as of `ts`, leaving a tombstone.
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

    /// Get a boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key, TypeTag::Boolean) {
            Some(PrimitiveValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// Get a double value.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key, TypeTag::Double) {
            Some(PrimitiveValue::Double(d)) => Some(d),
            _ => None,
        }
    }

    /// Get an integer value.
    #[must_use]
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.get(key, TypeTag::Integer) {
            Some(PrimitiveValue::Integer(i)) => Some(i),
            _ => None,
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key, TypeTag::Str) {
            Some(PrimitiveValue::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl Crdt for LwwMap {
    /// An empty map is the neutral element: it holds no slots to merge in.
    type Delta = Self;

    fn merge(&mut self, delta: Self::Delta) {
        for (key, slot) in delta.entries {
            let wins = match self.entries.get(&key) {
                Some(existing) => slot.ts > existing.ts,
                None => true,
            };
            if wins {
                self.entries.insert(key, slot);
            }
        }
    }

    fn generate_delta(&self, context: &VersionVector) -> Self::Delta {
        let entries = self
            .entries
            .iter()
            .filter(|(_, slot)| !context.contains(&slot.ts))
            .map(|(k, s)| (k.clone(), s.clone()))
            .collect();
        Self { entries }
    }
}

impl LwwMap {
    /// Encode as
    /// `{"_type":"LWWMap","_metadata":{"entries":{"<key>%<TAG>":<ts>,...}},"<key>%<TAG>":<v_or_null>,...}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut metadata_entries = Map::new();
        let mut obj = Map::new();
        for (key, slot) in &self.entries {
            let wire = key.wire();
            metadata_entries.insert(wire.clone(), serde_json::to_value(&slot.ts).unwrap_or(Value::Null));
            let v = slot.value.as_ref().map_or(Value::Null, |pv| pv.to_json(false));
            obj.insert(wire, v);
        }
        obj.insert("_type".to_string(), Value::String("LWWMap".to_string()));
        obj.insert("_metadata".to_string(), json_value!({ "entries": metadata_entries }));
        Value::Object(obj).to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: Value = serde_json::from_str(s)?;
        json::check_type(&value, "LWWMap")?;
        let obj = value.as_object().ok_or(CrdtError::InvalidShape("top-level value is not an object"))?;
        let metadata_entries = json::field(json::field(&value, "_metadata")?, "entries")?
            .as_object()
            .ok_or(CrdtError::InvalidShape("_metadata.entries is not an object"))?;

        let mut entries = HashMap::with_capacity(metadata_entries.len());
        for (wire, ts_json) in metadata_entries {
            let key = MapKey::from_wire(wire)
                .ok_or(CrdtError::InvalidShape("map key missing a recognized type-tag suffix"))?;
            let ts: Timestamp = serde_json::from_value(ts_json.clone())?;
            let raw = obj.get(wire).ok_or(CrdtError::InvalidShape("map key missing its paired value field"))?;
            let pv = if raw.is_null() {
                None
            } else {
                Some(
                    PrimitiveValue::from_json(key.tag(), raw)
                        .ok_or(CrdtError::InvalidShape("map value does not match its type tag"))?,
                )
            };
            entries.insert(key, Slot { value: pv, ts });
        }
        Ok(Self { entries })
    }
}
