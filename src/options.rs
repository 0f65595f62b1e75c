//! Configuration options for CBOR encoding.
//!
//! This module provides types to customize the encoder's behaviour:
//!
//! - [`EncoderOptions`]: Main configuration struct
//! - [`BignumPolicy`]: What to do with integers whose magnitude reaches 2^64
//! - [`DateTimeFormat`]: How [`chrono`] timestamps are tagged
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::{to_vec_with_options, BignumPolicy, EncoderOptions};
//!
//! // Reject integers that would need a bignum tag
//! let options = EncoderOptions::new().with_bignum(BignumPolicy::Reject);
//! assert!(to_vec_with_options(&u128::MAX, options).is_err());
//!
//! // Prefix output with the self-describe tag 55799
//! let options = EncoderOptions::new().with_self_describe(true);
//! let bytes = to_vec_with_options(&1u8, options).unwrap();
//! assert_eq!(bytes, [0xd9, 0xd9, 0xf7, 0x01]);
//! ```

/// Handling of integers too large for a plain CBOR integer header.
///
/// CBOR integers carry at most 64 bits of magnitude. Larger values can be
/// represented with tag 2 (positive) or tag 3 (negative) wrapping a byte
/// string, or refused outright.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::BignumPolicy;
///
/// assert_eq!(BignumPolicy::default(), BignumPolicy::Tag);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BignumPolicy {
    /// Emit tag 2/3 followed by the big-endian magnitude as a byte string.
    #[default]
    Tag,
    /// Fail with [`Error::MagnitudeOverflow`](crate::Error::MagnitudeOverflow).
    Reject,
}

/// Encoding used for `chrono::DateTime<Utc>` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DateTimeFormat {
    /// Tag 0 followed by an RFC 3339 text string.
    #[default]
    Rfc3339,
    /// Tag 1 followed by seconds since the Unix epoch. Whole seconds are written
    /// as an integer, anything else as a double.
    Epoch,
}

/// Configuration options for CBOR encoding.
///
/// # Examples
///
/// ```rust
/// use serde_cbor_writer::{BignumPolicy, DateTimeFormat, EncoderOptions};
///
/// let options = EncoderOptions::new()
///     .with_bignum(BignumPolicy::Reject)
///     .with_datetime(DateTimeFormat::Epoch)
///     .with_self_describe(true);
///
/// assert_eq!(options.bignum, BignumPolicy::Reject);
/// assert!(options.self_describe);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    pub bignum: BignumPolicy,
    pub datetime: DateTimeFormat,
    pub self_describe: bool,
}

impl EncoderOptions {
    /// Creates default options (bignum tags, RFC 3339 dates, no self-describe prefix).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::EncoderOptions;
    ///
    /// let options = EncoderOptions::new();
    /// assert!(!options.self_describe);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for integers with a magnitude of 2^64 or more.
    #[must_use]
    pub fn with_bignum(mut self, bignum: BignumPolicy) -> Self {
        self.bignum = bignum;
        self
    }

    /// Sets how date/time values are tagged.
    #[must_use]
    pub fn with_datetime(mut self, datetime: DateTimeFormat) -> Self {
        self.datetime = datetime;
        self
    }

    /// Prefixes top-level output produced by the crate-root functions with
    /// tag 55799 (`d9 d9 f7`).
    #[must_use]
    pub fn with_self_describe(mut self, self_describe: bool) -> Self {
        self.self_describe = self_describe;
        self
    }
}
