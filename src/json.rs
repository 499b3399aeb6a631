//! Shared helpers for the `_type`/`_metadata` JSON shape every CRDT in this
//! crate exposes through its own `to_json`/`from_json` methods.

use crate::error::CrdtError;
use serde_json::Value;

/// Check that `value` carries the expected `_type` discriminator.
pub(crate) fn check_type(value: &Value, expected: &'static str) -> Result<(), CrdtError> {
    let found = value
        .get("_type")
        .and_then(Value::as_str)
        .ok_or(CrdtError::MissingField("_type"))?;
    if found == expected {
        Ok(())
    } else {
        Err(CrdtError::UnexpectedType {
            expected,
            found: found.to_string(),
        })
    }
}

/// Fetch a required field by name.
pub(crate) fn field<'a>(value: &'a Value, key: &'static str) -> Result<&'a Value, CrdtError> {
    value.get(key).ok_or(CrdtError::MissingField(key))
}
