use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::error::{Result, ShortenerError};
use crate::repr::UNPRINTABLE;

/// Insertion-ordered mapping
pub type Mapping = IndexMap<Key, Value>;

/// Mapping key, also used as a key-path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// Number kept as its canonical text, so integers of any length survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Parse a decimal literal (`-12`, `3.5`, `1e10`, `inf`, `nan`)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if is_number_literal(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(ShortenerError::InvalidNumber(text.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        let body = self.0.trim_start_matches(|c: char| c == '-' || c == '+');
        !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_number_literal(text: &str) -> bool {
    let body = text.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(text);
    if matches!(body, "inf" | "nan" | "NaN" | "infinity") {
        return true;
    }

    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    if let Some(exponent) = exponent {
        let digits = exponent
            .strip_prefix(|c: char| c == '-' || c == '+')
            .unwrap_or(exponent);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    !(int_part.is_empty() && frac_part.is_empty()) && all_digits(int_part) && all_digits(frac_part)
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

number_from_int!(i32, i64, i128, u32, u64, u128, usize);

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self("nan".to_string())
        } else if value.is_infinite() {
            Self(if value > 0.0 { "inf" } else { "-inf" }.to_string())
        } else {
            Self(format!("{value:?}"))
        }
    }
}

/// Fixed-arity sequence with named fields
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTuple {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

/// Homogeneous typed array; `typecode` is shown in its literal form
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    pub typecode: char,
    pub items: Vec<Value>,
}

/// Host object the shortener cannot look inside.
///
/// `Debug` is the native representation; `to_text` is the coercion used in
/// safe mode. Either may fail, in which case a placeholder is rendered.
pub trait OpaqueValue: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn to_text(&self) -> std::result::Result<String, fmt::Error> {
        Ok(format!("<{} object>", self.type_name()))
    }
}

/// Shared handle to an [`OpaqueValue`]; equality is identity.
#[derive(Clone)]
pub struct Opaque(Arc<dyn OpaqueValue>);

impl Opaque {
    pub fn new(value: impl OpaqueValue + 'static) -> Self {
        Self(Arc::new(value))
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn to_text(&self) -> std::result::Result<String, fmt::Error> {
        self.0.to_text()
    }

    /// Native debug representation, without panicking on a failing `Debug`.
    pub fn debug_text(&self) -> std::result::Result<String, fmt::Error> {
        let mut out = String::new();
        write!(out, "{:?}", self.0)?;
        Ok(out)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name())
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0).cast::<()>(),
            Arc::as_ptr(&other.0).cast::<()>(),
        )
    }
}

/// A node of the structure being shortened
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Number(Number),
    Str(String),
    Bytes(Vec<u8>),
    Mapping(Mapping),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    NamedTuple(NamedTuple),
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    Array(TypedArray),
    Deque(VecDeque<Value>),
    Opaque(Opaque),
}

impl Value {
    pub fn list<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a set, dropping repeated elements while keeping first-seen order.
    pub fn set<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Set(unique(items))
    }

    pub fn frozen_set<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::FrozenSet(unique(items))
    }

    pub fn deque<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Deque(items.into_iter().map(Into::into).collect())
    }

    pub fn array<T: Into<Self>>(typecode: char, items: impl IntoIterator<Item = T>) -> Self {
        Self::Array(TypedArray {
            typecode,
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn mapping<K: Into<Key>, V: Into<Self>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn named_tuple<F: Into<String>, V: Into<Self>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (F, V)>,
    ) -> Self {
        Self::NamedTuple(NamedTuple {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(f, v)| (f.into(), v.into()))
                .collect(),
        })
    }

    pub fn opaque(value: impl OpaqueValue + 'static) -> Self {
        Self::Opaque(Opaque::new(value))
    }

    /// Number from literal text, e.g. an integer too wide for `i128`
    pub fn number(text: &str) -> Result<Self> {
        Number::parse(text).map(Self::Number)
    }

    /// Element count for composites, `None` for leaves
    #[must_use]
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Self::Mapping(map) => Some(map.len()),
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                Some(items.len())
            }
            Self::NamedTuple(nt) => Some(nt.fields.len()),
            Self::Array(array) => Some(array.items.len()),
            Self::Deque(items) => Some(items.len()),
            Self::None
            | Self::Bool(_)
            | Self::Number(_)
            | Self::Str(_)
            | Self::Bytes(_)
            | Self::Opaque(_) => None,
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.element_count().is_some()
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Child lookup by key; sequences are indexed by `Key::Int`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Self> {
        let index = |key: &Key| match key {
            Key::Int(n) => usize::try_from(*n).ok(),
            Key::Str(_) => None,
        };
        match self {
            Self::Mapping(map) => map.get(key),
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                index(key).and_then(|i| items.get(i))
            }
            Self::Array(array) => index(key).and_then(|i| array.items.get(i)),
            Self::Deque(items) => index(key).and_then(|i| items.get(i)),
            Self::NamedTuple(nt) => match key {
                Key::Str(name) => nt.fields.iter().find(|(f, _)| f == name).map(|(_, v)| v),
                Key::Int(_) => index(key).and_then(|i| nt.fields.get(i)).map(|(_, v)| v),
            },
            _ => None,
        }
    }
}

fn unique<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        let item = item.into();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_number!(i32, i64, i128, u32, u64, u128, usize, f64);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(Number(n.to_string())),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(obj) => Self::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (Key::Str(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Ok(n) = self.0.parse::<i64>() {
            return serializer.serialize_i64(n);
        }
        if let Ok(n) = self.0.parse::<u64>() {
            return serializer.serialize_u64(n);
        }
        if !self.is_integer() {
            if let Ok(n) = self.0.parse::<f64>() {
                if n.is_finite() {
                    return serializer.serialize_f64(n);
                }
            }
        }
        serializer.serialize_str(&self.0)
    }
}

fn serialize_seq<'a, S: Serializer>(
    serializer: S,
    items: impl ExactSizeIterator<Item = &'a Value>,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Self::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(&k.to_string(), v)?;
                }
                out.end()
            }
            Self::NamedTuple(nt) => {
                let mut out = serializer.serialize_map(Some(nt.fields.len()))?;
                for (field, v) in &nt.fields {
                    out.serialize_entry(field, v)?;
                }
                out.end()
            }
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                serialize_seq(serializer, items.iter())
            }
            Self::Array(array) => serialize_seq(serializer, array.items.iter()),
            Self::Deque(items) => serialize_seq(serializer, items.iter()),
            Self::Opaque(opaque) => {
                let text = opaque.to_text().unwrap_or_else(|_| UNPRINTABLE.to_string());
                serializer.serialize_str(&text)
            }
        }
    }
}
