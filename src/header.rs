//! CBOR item headers.
//!
//! Every CBOR data item starts with one initial byte: the 3-bit major type in the
//! high bits and a 5-bit "additional information" field in the low bits. Small
//! magnitudes live directly in that field; larger ones follow the initial byte as a
//! big-endian unsigned integer of 1, 2, 4 or 8 bytes.
//!
//! | magnitude `v`            | additional bytes | info |
//! |--------------------------|------------------|------|
//! | `v < 24`                 | 0                | `v`  |
//! | `24 <= v <= 0xff`        | 1                | 24   |
//! | `0x100 <= v <= 0xffff`   | 2                | 25   |
//! | `0x1_0000 <= v <= 2^32-1`| 4                | 26   |
//! | `2^32 <= v <= 2^64-1`    | 8                | 27   |
//!
//! The writer always picks the narrowest row, so the output is the preferred
//! (shortest) serialization. Magnitudes of 2^64 and above have no header form and
//! fail with [`Error::MagnitudeOverflow`].
//!
//! The width ladder is implemented once, on `u64`. Other integer domains
//! (`u32`, `usize`, `u128`, [`BigUint`]) participate through the [`Magnitude`]
//! trait, which only has to report whether the value fits in 64 bits.
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::header::{write_header, MAJOR_ARRAY, MAJOR_UNSIGNED};
//!
//! let mut out = Vec::new();
//! write_header(&mut out, MAJOR_UNSIGNED, 500u32).unwrap();
//! write_header(&mut out, MAJOR_ARRAY, 2usize).unwrap();
//! assert_eq!(out, [0x19, 0x01, 0xf4, 0x82]);
//! ```

use crate::{Error, Result};
use num_bigint::BigUint;
use std::io::Write;

pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

pub const INFO_U8: u8 = 24;
pub const INFO_U16: u8 = 25;
pub const INFO_U32: u8 = 26;
pub const INFO_U64: u8 = 27;
pub const INFO_INDEFINITE: u8 = 31;

/// Largest magnitude that fits in the initial byte.
pub const MAX_IMMEDIATE: u64 = 23;

pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;

/// Simple values 24..=31 are not well-formed in any encoding.
pub const SIMPLE_RESERVED_MIN: u8 = 24;
pub const SIMPLE_RESERVED_MAX: u8 = 31;

/// Initial byte of a half-precision float (major 7, info 25).
pub const FLOAT16: u8 = 0xf9;
pub const FLOAT32: u8 = 0xfa;
pub const FLOAT64: u8 = 0xfb;

/// "break" stop code closing an indefinite-length item.
pub const BREAK: u8 = 0xff;

pub const TAG_DATETIME_STRING: u64 = 0;
pub const TAG_EPOCH_DATETIME: u64 = 1;
pub const TAG_POSITIVE_BIGNUM: u64 = 2;
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
pub const TAG_SELF_DESCRIBE: u64 = 55799;

/// Packs a major type and additional information into an initial byte.
#[inline]
#[must_use]
pub const fn initial_byte(major: u8, info: u8) -> u8 {
    (major << 5) | info
}

/// The size class chosen for a header magnitude.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::header::Width;
///
/// assert_eq!(Width::of(23), Width::Immediate(23));
/// assert_eq!(Width::of(24), Width::One);
/// assert_eq!(Width::of(65_536).additional_bytes(), 4);
/// assert_eq!(Width::of(u64::MAX).info(), 27);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// The magnitude itself is the additional information.
    Immediate(u8),
    One,
    Two,
    Four,
    Eight,
}

impl Width {
    /// Selects the narrowest width able to hold `value`.
    #[inline]
    #[must_use]
    pub const fn of(value: u64) -> Width {
        if value <= MAX_IMMEDIATE {
            Width::Immediate(value as u8)
        } else if value <= u8::MAX as u64 {
            Width::One
        } else if value <= u16::MAX as u64 {
            Width::Two
        } else if value <= u32::MAX as u64 {
            Width::Four
        } else {
            Width::Eight
        }
    }

    /// The 5-bit additional information value for this width.
    #[inline]
    #[must_use]
    pub const fn info(self) -> u8 {
        match self {
            Width::Immediate(v) => v,
            Width::One => INFO_U8,
            Width::Two => INFO_U16,
            Width::Four => INFO_U32,
            Width::Eight => INFO_U64,
        }
    }

    /// Number of bytes following the initial byte.
    #[inline]
    #[must_use]
    pub const fn additional_bytes(self) -> usize {
        match self {
            Width::Immediate(_) => 0,
            Width::One => 1,
            Width::Two => 2,
            Width::Four => 4,
            Width::Eight => 8,
        }
    }

    /// Total header length, initial byte included.
    #[inline]
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        1 + self.additional_bytes()
    }
}

/// Returns the encoded length of a header carrying `value`.
#[inline]
#[must_use]
pub const fn header_len(value: u64) -> usize {
    Width::of(value).encoded_len()
}

/// A non-negative integer usable as a header magnitude.
///
/// Implementors only decide whether the value fits in 64 bits; width selection
/// and byte layout happen once in [`encode_header`].
pub trait Magnitude {
    /// Returns the value as a `u64`, or `None` when it is 2^64 or larger.
    fn to_u64(&self) -> Option<u64>;
}

macro_rules! impl_magnitude_lossless {
    ($($ty:ty),*) => {
        $(
            impl Magnitude for $ty {
                #[inline]
                fn to_u64(&self) -> Option<u64> {
                    Some(u64::from(*self))
                }
            }
        )*
    };
}

impl_magnitude_lossless!(u8, u16, u32, u64);

impl Magnitude for usize {
    #[inline]
    fn to_u64(&self) -> Option<u64> {
        u64::try_from(*self).ok()
    }
}

impl Magnitude for u128 {
    #[inline]
    fn to_u64(&self) -> Option<u64> {
        u64::try_from(*self).ok()
    }
}

impl Magnitude for BigUint {
    #[inline]
    fn to_u64(&self) -> Option<u64> {
        u64::try_from(self).ok()
    }
}

impl<T: Magnitude + ?Sized> Magnitude for &T {
    #[inline]
    fn to_u64(&self) -> Option<u64> {
        (**self).to_u64()
    }
}

/// Encodes a header into a fixed buffer, returning the buffer and the used length.
///
/// `major` must be in `0..=7`; larger values corrupt the initial byte.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::header::encode_header;
///
/// let (buf, len) = encode_header(0, 65_536);
/// assert_eq!(&buf[..len], &[0x1a, 0x00, 0x01, 0x00, 0x00]);
/// ```
#[inline]
#[must_use]
pub fn encode_header(major: u8, value: u64) -> ([u8; 9], usize) {
    debug_assert!(major <= MAJOR_SIMPLE, "major type out of range: {major}");
    let width = Width::of(value);
    let extra = width.additional_bytes();
    let mut buf = [0u8; 9];
    buf[0] = initial_byte(major, width.info());
    buf[1..=extra].copy_from_slice(&value.to_be_bytes()[8 - extra..]);
    (buf, 1 + extra)
}

/// Writes the minimal header for a 64-bit magnitude.
#[inline]
pub fn write_header_u64<W>(writer: &mut W, major: u8, value: u64) -> Result<()>
where
    W: ?Sized + Write,
{
    let (buf, len) = encode_header(major, value);
    writer.write_all(&buf[..len])?;
    Ok(())
}

/// Writes the minimal header for any [`Magnitude`].
///
/// # Errors
///
/// Returns [`Error::MagnitudeOverflow`] when the magnitude is 2^64 or larger (nothing
/// is written in that case), or [`Error::Io`] when the writer fails.
pub fn write_header<W, M>(writer: &mut W, major: u8, magnitude: M) -> Result<()>
where
    W: ?Sized + Write,
    M: Magnitude,
{
    match magnitude.to_u64() {
        Some(value) => write_header_u64(writer, major, value),
        None => {
            tracing::debug!(major, "header magnitude does not fit in 64 bits");
            Err(Error::overflow(major))
        }
    }
}
