//! A value that may be set exactly once, then never changes.
//!
//! Concurrent `set`s with the same value converge silently; concurrent
//! `set`s with different values indicate a violated precondition in the
//! application (two replicas disagreeing on something meant to be decided
//! once) and fail loudly rather than picking a winner.

use crate::crdt::Crdt;
use crate::error::CrdtError;
use crate::json;
use crate::version_vector::VersionVector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json as json_value;
use std::fmt::Debug;

/// A value set at most once.
#[derive(Clone, Debug, PartialEq)]
pub struct Immutable<T> {
    value: Option<T>,
}

impl<T: Clone + PartialEq + Debug> Immutable<T> {
    /// An unset instance.
    #[must_use]
    pub fn new() -> Self {
        Self { value: None }
    }

    /// The value, if set.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Set the value. A second `set` with the same value is a harmless
    /// no-op (returns the empty delta); a second `set` with a different
    /// value panics.
    ///
    /// # Panics
    /// If this instance already holds a value and `value` differs from it.
    pub fn set(&mut self, value: T) -> Option<T> {
        match &self.value {
            None => {
                self.value = Some(value.clone());
                tracing::debug!("immutable value set");
                Some(value)
            }
            Some(existing) if *existing == value => None,
            Some(existing) => panic!(
                "Immutable value set twice with divergent values: {existing:?} vs {value:?}"
            ),
        }
    }
}

impl<T: Clone + PartialEq + Debug> Default for Immutable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Debug> Crdt for Immutable<T> {
    /// `None` is the empty delta: an unset instance has nothing to offer.
    type Delta = Option<T>;

    /// # Panics
    /// If `self` already holds a value that differs from `delta`'s.
    fn merge(&mut self, delta: Self::Delta) {
        let Some(value) = delta else { return };
        match &self.value {
            None => self.value = Some(value),
            Some(existing) if *existing == value => {}
            Some(existing) => panic!(
                "Immutable value merged with a divergent value: {existing:?} vs {value:?}"
            ),
        }
    }

    /// There is no timestamp to compare against `context`; an unset
    /// instance has nothing to give, a set instance always offers its
    /// value, and merge's idempotence absorbs redundant delivery.
    fn generate_delta(&self, _context: &VersionVector) -> Self::Delta {
        self.value.clone()
    }
}

impl<T> Immutable<T>
where
    T: Clone + PartialEq + Debug + Serialize + DeserializeOwned,
{
    /// Encode as `{"_type":"Immutable","value":<v>}`, with `value: null` if
    /// unset.
    #[must_use]
    pub fn to_json(&self) -> String {
        json_value!({
            "_type": "Immutable",
            "value": &self.value,
        })
        .to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        json::check_type(&value, "Immutable")?;
        let data: Option<T> = serde_json::from_value(json::field(&value, "value")?.clone())?;
        Ok(Self { value: data })
    }
}
