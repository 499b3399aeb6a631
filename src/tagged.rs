//! The type-tag scheme shared by [`crate::lww_map::LwwMap`] and
//! [`crate::mv_map::MvMap`]: keys are partitioned by value type so the same
//! text key can independently carry a bool, a double, an integer, and a
//! string at once.

use serde_json::Value;

/// The value types a map entry can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `bool`
    Boolean,
    /// `f64`
    Double,
    /// `i32`
    Integer,
    /// `String`
    Str,
}

impl TypeTag {
    /// The literal suffix used on the wire, e.g. `"BOOLEAN"`.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Double => "DOUBLE",
            TypeTag::Integer => "INTEGER",
            TypeTag::Str => "STRING",
        }
    }

    /// Parse a wire suffix back into a tag.
    #[must_use]
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "BOOLEAN" => Some(TypeTag::Boolean),
            "DOUBLE" => Some(TypeTag::Double),
            "INTEGER" => Some(TypeTag::Integer),
            "STRING" => Some(TypeTag::Str),
            _ => None,
        }
    }
}

/// A present value of one of the four supported primitive types.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    /// A boolean value.
    Bool(bool),
    /// A double-precision float.
    Double(f64),
    /// A 32-bit integer.
    Integer(i32),
    /// A UTF-8 string.
    Str(String),
}

impl PrimitiveValue {
    /// The type tag matching this value's variant.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        match self {
            PrimitiveValue::Bool(_) => TypeTag::Boolean,
            PrimitiveValue::Double(_) => TypeTag::Double,
            PrimitiveValue::Integer(_) => TypeTag::Integer,
            PrimitiveValue::Str(_) => TypeTag::Str,
        }
    }

    /// Encode as a JSON value. MV-Map numeric values are encoded as JSON
    /// strings and re-parsed on read; LWW-Map values are encoded as their
    /// natural JSON primitive.
    #[must_use]
    pub fn to_json(&self, numeric_as_string: bool) -> Value {
        match self {
            PrimitiveValue::Bool(b) => Value::Bool(*b),
            PrimitiveValue::Double(d) => {
                if numeric_as_string {
                    Value::String(d.to_string())
                } else {
                    serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number)
                }
            }
            PrimitiveValue::Integer(i) => {
                if numeric_as_string {
                    Value::String(i.to_string())
                } else {
                    Value::Number((*i).into())
                }
            }
            PrimitiveValue::Str(s) => Value::String(s.clone()),
        }
    }

    /// Decode a value previously produced by [`Self::to_json`].
    #[must_use]
    pub fn from_json(tag: TypeTag, value: &Value) -> Option<Self> {
        match tag {
            TypeTag::Boolean => value.as_bool().map(PrimitiveValue::Bool),
            TypeTag::Double => value
                .as_f64()
                .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
                .map(PrimitiveValue::Double),
            TypeTag::Integer => value
                .as_i64()
                .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
                .and_then(|i| i32::try_from(i).ok())
                .map(PrimitiveValue::Integer),
            TypeTag::Str => value.as_str().map(|s| PrimitiveValue::Str(s.to_string())),
        }
    }
}

/// A map key partitioned by value type: the same text key may carry a bool,
/// a double, an integer, and a string independently.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapKey {
    name: String,
    tag: TypeTag,
}

impl MapKey {
    /// Construct a key for `name` under `tag`.
    #[must_use]
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    /// The text key, without the type-tag suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type tag partitioning this key.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// The wire form: `"<key>%<TAG>"`.
    #[must_use]
    pub fn wire(&self) -> String {
        format!("{}%{}", self.name, self.tag.suffix())
    }

    /// Parse a wire-form key back into a [`MapKey`].
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        let (name, suffix) = s.rsplit_once('%')?;
        let tag = TypeTag::from_suffix(suffix)?;
        Some(Self {
            name: name.to_string(),
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let key = MapKey::new("status", TypeTag::Str);
        assert_eq!(key.wire(), "status%STRING");
        assert_eq!(MapKey::from_wire("status%STRING").unwrap(), key);
    }

    #[test]
    fn same_text_key_different_types_are_distinct() {
        let a = MapKey::new("x", TypeTag::Integer);
        let b = MapKey::new("x", TypeTag::Str);
        assert_ne!(a, b);
    }

    #[test]
    fn numeric_values_round_trip_through_string_encoding() {
        let v = PrimitiveValue::Integer(42);
        let json = v.to_json(true);
        assert_eq!(json, Value::String("42".to_string()));
        assert_eq!(PrimitiveValue::from_json(TypeTag::Integer, &json), Some(v));
    }
}
