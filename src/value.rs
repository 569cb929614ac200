use core::fmt;
use std::collections::HashMap;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;

use crate::float;

/// The Noop marker as a value.
///
/// Decoding yields [`Value::Noop`] only when Noop markers are explicitly allowed; encoding a
/// `Noop` writes the bare `N` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Noop;

/// An owned Draft-8 value.
///
/// Integers are a single kind regardless of their wire width. Floats keep the width they
/// were decoded with, but equality compares them by numeric value: `Float32(1.5)` equals
/// `Float64(1.5)`, and a finite float equals a decimal holding its exact expansion.
#[derive(Debug, Clone)]
pub enum Value {
    /// Filler marker.
    Noop,
    /// `Z`.
    Null,
    /// `F` / `T`.
    Bool(bool),
    /// Any of `B`, `i`, `I`, `L`.
    Int(i64),
    /// `d`.
    Float32(f32),
    /// `D`.
    Float64(f64),
    /// Arbitrary-precision decimal (`h` / `H`).
    Decimal(BigDecimal),
    /// UTF-8 text (`s` / `S`).
    Text(String),
    /// Sized or materialized unsized array.
    Array(Vec<Value>),
    /// Sized or materialized unsized object.
    Object(Map),
}

/// The runtime kind of a [`Value`], used to select an encoding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Noop`].
    Noop,
    /// [`Value::Null`].
    Null,
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Int`].
    Integer,
    /// [`Value::Float32`] and [`Value::Float64`].
    Float,
    /// [`Value::Decimal`].
    Decimal,
    /// [`Value::Text`].
    Text,
    /// [`Value::Array`].
    Array,
    /// [`Value::Object`].
    Object,
}

impl ValueKind {
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Noop => "noop",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

/// A set of value kinds, used as an encoding session's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet(u16);

impl KindSet {
    /// Every kind has a rule.
    pub const ALL: Self = Self((1 << 9) - 1);

    /// No kind has a rule; every value goes through the fallback.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if `kind` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, kind: ValueKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Return a copy with `kind` added.
    #[must_use]
    pub const fn with(self, kind: ValueKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Return a copy with `kind` removed.
    #[must_use]
    pub const fn without(self, kind: ValueKind) -> Self {
        Self(self.0 & !kind.bit())
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl Value {
    /// The runtime kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Noop => ValueKind::Noop,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Integer,
            Self::Float32(_) | Self::Float64(_) => ValueKind::Float,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Text(_) => ValueKind::Text,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`Value::Noop`].
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }

    /// Return the boolean if this is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the integer if this is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Return the float, widened to `f64`, for either float width.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Return the decimal if this is a decimal.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Return the text if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Return the elements if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Return the map if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Build the value for a signed integer of any width.
    ///
    /// Values outside the signed 64-bit range become decimals.
    #[must_use]
    pub fn from_i128(v: i128) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Decimal(decimal_from_i128(v)), Self::Int)
    }

    /// Build the value for an unsigned integer of any width.
    #[must_use]
    pub fn from_u128(v: u128) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Decimal(decimal_from_u128(v)), Self::Int)
    }
}

pub(crate) fn decimal_from_i128(v: i128) -> BigDecimal {
    BigDecimal::new(BigInt::from(v), 0)
}

pub(crate) fn decimal_from_u128(v: u128) -> BigDecimal {
    BigDecimal::new(BigInt::from(v), 0)
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::from_u128(u128::from(v))
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Self::from_i128(v)
    }
}

impl From<u128> for Value {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Noop> for Value {
    fn from(_: Noop) -> Self {
        Self::Noop
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Self>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Array(iter.into_iter().map(Into::into).collect())
    }
}

/// A text-keyed object preserving insertion order.
///
/// Inserting an existing key replaces its value in place, so the entry keeps the position of
/// its first insertion and the value of its last.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Map {
    /// Construct an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, returning the replaced value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            return Some(core::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Noop, Self::Noop) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Decimal(d), f) | (f, Self::Decimal(d)) => f
                .as_f64()
                .is_some_and(|v| v.is_finite() && float::exact_decimal(v) == *d),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Map {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
