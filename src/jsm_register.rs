//! Join-semilattice register: the value itself supplies the merge operator.
//!
//! Unlike [`crate::lww_register::LwwRegister`], which picks a winner by
//! timestamp, a `JsmRegister` resolves concurrent writes by taking the
//! maximum of every value ever assigned, so `T` must be a total order, and
//! the register carries no timestamp at all.

use crate::crdt::Crdt;
use crate::error::CrdtError;
use crate::json;
use crate::version_vector::VersionVector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json as json_value;

/// A register whose value is the join (maximum) of every assignment it has
/// observed, local or remote.
#[derive(Clone, Debug, PartialEq)]
pub struct JsmRegister<T> {
    value: T,
}

impl<T: Clone + Ord> JsmRegister<T> {
    /// Create a register initialized to `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// The current value: the maximum of everything assigned so far.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Fold `value` into the register. Returns the delta representing this
    /// write: `Some` if `value` raised the join, `None` otherwise.
    pub fn assign(&mut self, value: T) -> Option<T> {
        if value > self.value {
            self.value = value.clone();
            tracing::debug!("jsm register raised");
            Some(value)
        } else {
            None
        }
    }
}

impl<T: Clone + Ord> Crdt for JsmRegister<T> {
    /// `None` is the empty delta: joining it with anything is a no-op.
    type Delta = Option<T>;

    fn merge(&mut self, delta: Self::Delta) {
        if let Some(value) = delta {
            if value > self.value {
                self.value = value;
            }
        }
    }

    /// This register carries no timestamp, so `context` (a causal summary)
    /// cannot tell whether a peer has already observed this exact value.
    /// The full value is always returned; merge's idempotence absorbs the
    /// redundancy.
    fn generate_delta(&self, _context: &VersionVector) -> Self::Delta {
        Some(self.value.clone())
    }
}

impl<T> JsmRegister<T>
where
    T: Clone + Ord + Serialize + DeserializeOwned,
{
    /// Encode as `{"_type":"JSMRegister","value":<v>}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        json_value!({
            "_type": "JSMRegister",
            "value": &self.value,
        })
        .to_string()
    }

    /// Decode a value produced by [`Self::to_json`].
    pub fn from_json(s: &str) -> Result<Self, CrdtError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        json::check_type(&value, "JSMRegister")?;
        let data: T = serde_json::from_value(json::field(&value, "value")?.clone())?;
        Ok(Self { value: data })
    }
}
