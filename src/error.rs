//! Error types for CBOR encoding.
//!
//! The encoder itself has very few ways to fail:
//!
//! - **I/O Errors**: the sink rejected a write. The underlying
//!   [`std::io::Error`] is handed back unchanged.
//! - **Magnitude Overflow**: a header magnitude of 2^64 or more, which no CBOR
//!   header can carry.
//! - **Structure Errors**: only raised by [`CheckedEncoder`](crate::CheckedEncoder),
//!   when the number of items written disagrees with the declared container sizes.
//!
//! ## Examples
//!
//! ```rust
//! use num_bigint::BigUint;
//! use serde_cbor_writer::{Encoder, Error};
//!
//! let mut encoder = Encoder::new(Vec::new());
//! let huge = BigUint::from(u64::MAX) + 1u32;
//!
//! // Array lengths cannot fall back to a bignum.
//! let err = encoder.write_array(&huge).unwrap_err();
//! assert!(matches!(err, Error::MagnitudeOverflow { major: 4 }));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding CBOR.
#[derive(Debug, Error)]
pub enum Error {
    /// The output sink failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A magnitude does not fit in the 8 additional bytes of a CBOR header.
    #[error("magnitude for major type {major} exceeds encodable range (>= 2^64)")]
    MagnitudeOverflow { major: u8 },

    /// Simple values 24..=31 have no well-formed encoding.
    #[error("simple value {code} is reserved")]
    InvalidSimple { code: u8 },

    /// A break code was written while the innermost open item was not an
    /// indefinite-length container, or would leave a map key without its value.
    #[error("unexpected break: innermost item cannot be closed here")]
    UnexpectedBreak,

    /// An indefinite-length string received something other than a definite chunk
    /// of its own kind.
    #[error("invalid chunk inside indefinite-length {expected} string")]
    InvalidChunk { expected: &'static str },

    /// The encoder was finished while containers were still open.
    #[error("incomplete encoding: {depth} container(s) still open")]
    Incomplete { depth: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a magnitude overflow error for the given major type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::Error;
    ///
    /// let err = Error::overflow(6);
    /// assert!(err.to_string().contains("major type 6"));
    /// ```
    pub fn overflow(major: u8) -> Self {
        Error::MagnitudeOverflow { major }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` if this error came from the output sink.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
