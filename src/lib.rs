//! # serde_cbor_writer
//!
//! A streaming writer for CBOR, the Concise Binary Object Representation
//! ([RFC 8949](https://www.rfc-editor.org/rfc/rfc8949)).
//!
//! ## Key Features
//!
//! - **Minimal headers**: every length, count, tag and integer uses the shortest
//!   header width that can hold it
//! - **Any magnitude**: 32-bit, 64-bit, `u128`/`i128` and [`num_bigint`] integers share
//!   one header routine; values beyond 64 bits become bignum tags (or are rejected,
//!   see [`BignumPolicy`])
//! - **Streaming**: bytes go straight to any [`std::io::Write`], nothing is buffered
//! - **Serde Compatible**: [`to_vec`] and [`to_writer`] work with any
//!   `#[derive(Serialize)]` type
//! - **Opt-in structure checks**: [`CheckedEncoder`] enforces declared array and map
//!   sizes
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use serde_cbor_writer::to_vec;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u32,
//!     active: bool,
//! }
//!
//! let bytes = to_vec(&User { id: 300, active: true }).unwrap();
//! assert_eq!(
//!     bytes,
//!     [0xa2, 0x62, b'i', b'd', 0x19, 0x01, 0x2c, 0x66, b'a', b'c', b't', b'i', b'v', b'e', 0xf5]
//! );
//! ```
//!
//! ### Low-level encoding
//!
//! ```rust
//! use serde_cbor_writer::Encoder;
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_array(3u32).unwrap();
//! encoder.write_u64(23).unwrap();
//! encoder.write_u64(24).unwrap();
//! encoder.write_bytes(&[1, 2, 3]).unwrap();
//!
//! assert_eq!(encoder.into_inner(), [0x83, 0x17, 0x18, 0x18, 0x43, 1, 2, 3]);
//! ```
//!
//! ### Dynamic values with the cbor! macro
//!
//! ```rust
//! use serde_cbor_writer::{cbor, Encoder};
//!
//! let value = cbor!({ "ok": true, "ids": [1, 2] });
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_value(&value).unwrap();
//! assert_eq!(encoder.get_ref()[0], 0xa2);
//! ```
//!
//! ## Threading
//!
//! Encoders take `&mut self` everywhere and hold no locks. Driving one sink from
//! several threads needs external synchronization.

pub mod checked;
pub mod encoder;
pub mod error;
pub mod header;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod value;

pub use checked::CheckedEncoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use header::Magnitude;
pub use map::CborMap;
pub use options::{BignumPolicy, DateTimeFormat, EncoderOptions};
pub use ser::Serializer;
pub use value::CborValue;

use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to a CBOR byte vector.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::to_vec;
///
/// assert_eq!(to_vec(&vec![1, 2]).unwrap(), [0x82, 0x01, 0x02]);
/// ```
///
/// # Errors
///
/// Returns an error if an integer exceeds 64 bits under [`BignumPolicy::Reject`] or
/// the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_options(value, EncoderOptions::default())
}

/// Serialize any `T: Serialize` to a CBOR byte vector with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, options: EncoderOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut buffer = Vec::with_capacity(128);
    to_writer_with_options(&mut buffer, value, options)?;
    Ok(buffer)
}

/// Serialize any `T: Serialize` as CBOR into a writer.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, "hi").unwrap();
/// assert_eq!(buffer, [0x62, b'h', b'i']);
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or the writer fails. Writer errors are
/// returned unchanged as [`Error::Io`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncoderOptions::default())
}

/// Serialize any `T: Serialize` as CBOR into a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: EncoderOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let self_describe = options.self_describe;
    let mut serializer = Serializer::with_options(writer, options);
    if self_describe {
        serializer.encoder_mut().write_self_describe()?;
    }
    value.serialize(&mut serializer)
}
