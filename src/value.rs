//! Dynamic CBOR values.
//!
//! [`CborValue`] covers every kind of item the encoder can emit, so a tree of them
//! can be built at runtime (or with the [`cbor!`](crate::cbor) macro) and written in
//! one call with [`Encoder::write_value`](crate::Encoder::write_value).
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::{CborValue, Encoder};
//!
//! let value = CborValue::Array(vec![
//!     CborValue::from(1),
//!     CborValue::Tag(32, Box::new(CborValue::from("https://example.com"))),
//!     CborValue::Null,
//! ]);
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_value(&value).unwrap();
//! assert_eq!(encoder.get_ref()[..3], [0x83, 0x01, 0xd8]);
//! ```

use crate::CborMap;
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use serde::{Serialize, Serializer};

/// A dynamically-typed CBOR data item.
///
/// `Integer` holds values that fit in `i64`, `Unsigned` the remaining `u64` range
/// and `BigInt` anything else. The encoder picks the minimal encoding regardless of
/// which variant a number is stored in.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CborValue {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    BigInt(BigInt),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborValue>),
    Map(CborMap),
    Tag(u64, Box<CborValue>),
    Simple(u8),
    DateTime(DateTime<Utc>),
}

impl CborValue {
    /// Wraps `value` in a semantic tag.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::CborValue;
    ///
    /// let uri = CborValue::tagged(32, "https://example.com");
    /// assert_eq!(uri.tag(), Some(32));
    /// ```
    pub fn tagged(tag: u64, value: impl Into<CborValue>) -> Self {
        CborValue::Tag(tag, Box::new(value.into()))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, CborValue::Null)
    }

    /// Returns `true` for any of the integer variants.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            CborValue::Integer(_) | CborValue::Unsigned(_) | CborValue::BigInt(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, CborValue::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, CborValue::Map(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CborValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::CborValue;
    ///
    /// assert_eq!(CborValue::from(-7).as_i64(), Some(-7));
    /// assert_eq!(CborValue::from(u64::MAX).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CborValue::Integer(i) => Some(*i),
            CborValue::Unsigned(u) => i64::try_from(*u).ok(),
            CborValue::BigInt(bi) => i64::try_from(bi).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CborValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CborValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CborValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<CborValue>> {
        match self {
            CborValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&CborMap> {
        match self {
            CborValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the tag number if this value is tagged.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<u64> {
        match self {
            CborValue::Tag(tag, _) => Some(*tag),
            _ => None,
        }
    }
}

/// Serializes through the generic data model.
///
/// Serde has no notion of tags or simple values, so tags serialize as their inner
/// value, simple values as `u8`, dates as RFC 3339 strings and big integers beyond
/// the `i128` range as decimal strings. Use
/// [`Encoder::write_value`](crate::Encoder::write_value) for a lossless encoding.
impl Serialize for CborValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CborValue::Null | CborValue::Undefined => serializer.serialize_unit(),
            CborValue::Bool(b) => serializer.serialize_bool(*b),
            CborValue::Integer(i) => serializer.serialize_i64(*i),
            CborValue::Unsigned(u) => serializer.serialize_u64(*u),
            CborValue::BigInt(bi) => match i128::try_from(bi) {
                Ok(i) => serializer.serialize_i128(i),
                Err(_) => serializer.serialize_str(&bi.to_string()),
            },
            CborValue::Float(f) => serializer.serialize_f64(*f),
            CborValue::Bytes(b) => serializer.serialize_bytes(b),
            CborValue::Text(s) => serializer.serialize_str(s),
            CborValue::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            CborValue::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            CborValue::Tag(_, inner) => inner.serialize(serializer),
            CborValue::Simple(code) => serializer.serialize_u8(*code),
            CborValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        }
    }
}

impl From<bool> for CborValue {
    fn from(b: bool) -> Self {
        CborValue::Bool(b)
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CborValue {
                fn from(n: $ty) -> Self {
                    CborValue::Integer(i64::from(n))
                }
            }
        )*
    };
}

from_signed!(i8, i16, i32, i64);

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CborValue {
                fn from(n: $ty) -> Self {
                    CborValue::Unsigned(u64::from(n))
                }
            }
        )*
    };
}

from_unsigned!(u8, u16, u32, u64);

impl From<i128> for CborValue {
    fn from(n: i128) -> Self {
        match i64::try_from(n) {
            Ok(small) => CborValue::Integer(small),
            Err(_) => CborValue::BigInt(BigInt::from(n)),
        }
    }
}

impl From<u128> for CborValue {
    fn from(n: u128) -> Self {
        match u64::try_from(n) {
            Ok(small) => CborValue::Unsigned(small),
            Err(_) => CborValue::BigInt(BigInt::from(n)),
        }
    }
}

impl From<BigInt> for CborValue {
    fn from(n: BigInt) -> Self {
        CborValue::BigInt(n)
    }
}

impl From<BigUint> for CborValue {
    fn from(n: BigUint) -> Self {
        CborValue::BigInt(BigInt::from(n))
    }
}

impl From<f32> for CborValue {
    fn from(f: f32) -> Self {
        CborValue::Float(f64::from(f))
    }
}

impl From<f64> for CborValue {
    fn from(f: f64) -> Self {
        CborValue::Float(f)
    }
}

impl From<String> for CborValue {
    fn from(s: String) -> Self {
        CborValue::Text(s)
    }
}

impl From<&str> for CborValue {
    fn from(s: &str) -> Self {
        CborValue::Text(s.to_string())
    }
}

impl From<&[u8]> for CborValue {
    fn from(b: &[u8]) -> Self {
        CborValue::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(b: Vec<u8>) -> Self {
        CborValue::Bytes(b)
    }
}

impl From<Vec<CborValue>> for CborValue {
    fn from(arr: Vec<CborValue>) -> Self {
        CborValue::Array(arr)
    }
}

impl From<CborMap> for CborValue {
    fn from(map: CborMap) -> Self {
        CborValue::Map(map)
    }
}

impl From<DateTime<Utc>> for CborValue {
    fn from(dt: DateTime<Utc>) -> Self {
        CborValue::DateTime(dt)
    }
}

impl<T: Into<CborValue>> From<Option<T>> for CborValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(CborValue::Null, Into::into)
    }
}
