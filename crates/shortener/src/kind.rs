use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShortenerError;
use crate::value::Value;

/// Shape-based category of a value, used to pick a truncation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralKind {
    /// Text or byte strings
    String,
    /// Key-value mapping
    Mapping,
    /// Fixed-arity sequence without field names
    Tuple,
    /// Fixed-arity sequence with field names
    NamedTuple,
    /// Ordered, growable sequence
    List,
    Set,
    FrozenSet,
    /// Typed numeric array
    Array,
    /// Double-ended queue
    Deque,
    /// Numbers and booleans, truncated by digit count
    Number,
    /// Anything else (null, opaque host objects)
    Other,
}

impl StructuralKind {
    pub const ALL: [Self; 11] = [
        Self::String,
        Self::Mapping,
        Self::Tuple,
        Self::NamedTuple,
        Self::List,
        Self::Set,
        Self::FrozenSet,
        Self::Array,
        Self::Deque,
        Self::Number,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Mapping => "mapping",
            Self::Tuple => "tuple",
            Self::NamedTuple => "named_tuple",
            Self::List => "list",
            Self::Set => "set",
            Self::FrozenSet => "frozen_set",
            Self::Array => "array",
            Self::Deque => "deque",
            Self::Number => "number",
            Self::Other => "other",
        }
    }

    /// Kinds whose elements are counted and recursed into
    #[must_use]
    pub const fn is_composite(self) -> bool {
        !matches!(self, Self::String | Self::Number | Self::Other)
    }
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructuralKind {
    type Err = ShortenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "bytes" => Self::String,
            "mapping" | "dict" => Self::Mapping,
            "tuple" => Self::Tuple,
            "named_tuple" | "namedtuple" => Self::NamedTuple,
            "list" => Self::List,
            "set" => Self::Set,
            "frozen_set" | "frozenset" => Self::FrozenSet,
            "array" => Self::Array,
            "deque" => Self::Deque,
            "number" | "long" | "int" => Self::Number,
            "other" => Self::Other,
            _ => return Err(ShortenerError::UnknownSizeKey(s.to_string())),
        };
        Ok(kind)
    }
}

/// Classify a value by its shape.
///
/// Precedence: strings, mappings, named tuples, tuples, sets, ordered
/// sequences, numbers, then everything else.
#[must_use]
pub fn classify(value: &Value) -> StructuralKind {
    match value {
        Value::Str(_) | Value::Bytes(_) => StructuralKind::String,
        Value::Mapping(_) => StructuralKind::Mapping,
        Value::NamedTuple(_) => StructuralKind::NamedTuple,
        Value::Tuple(_) => StructuralKind::Tuple,
        Value::Set(_) => StructuralKind::Set,
        Value::FrozenSet(_) => StructuralKind::FrozenSet,
        Value::List(_) => StructuralKind::List,
        Value::Array(_) => StructuralKind::Array,
        Value::Deque(_) => StructuralKind::Deque,
        Value::Number(_) | Value::Bool(_) => StructuralKind::Number,
        Value::None | Value::Opaque(_) => StructuralKind::Other,
    }
}
