//! The streaming CBOR encoder.
//!
//! [`Encoder`] maps typed values to a major type and a magnitude, hands both to the
//! header writer in [`crate::header`], and then writes the payload (if any). Every
//! call is a single, independent emission straight into the underlying
//! [`std::io::Write`] sink; nothing is buffered and nothing is rewritten.
//!
//! ## Containers
//!
//! [`Encoder::write_array`], [`Encoder::write_map`] and [`Encoder::write_tag`] only
//! write headers. The caller must follow them with exactly the declared number of
//! items (one per array element, two per map pair, one per tag). The encoder does
//! not track this; wrap it in a [`CheckedEncoder`](crate::CheckedEncoder) to get
//! the count enforced.
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::Encoder;
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_map(1u32).unwrap();
//! encoder.write_str("ids").unwrap();
//! encoder.write_array(2u32).unwrap();
//! encoder.write_u64(1).unwrap();
//! encoder.write_i64(-500).unwrap();
//!
//! assert_eq!(
//!     encoder.into_inner(),
//!     [0xa1, 0x63, b'i', b'd', b's', 0x82, 0x01, 0x39, 0x01, 0xf3]
//! );
//! ```

use crate::header::{
    self, initial_byte, Magnitude, BREAK, FLOAT32, FLOAT64, INFO_INDEFINITE, MAJOR_ARRAY,
    MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT, MAJOR_UNSIGNED,
    SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_RESERVED_MAX, SIMPLE_RESERVED_MIN, SIMPLE_TRUE,
    SIMPLE_UNDEFINED, TAG_DATETIME_STRING, TAG_EPOCH_DATETIME, TAG_NEGATIVE_BIGNUM,
    TAG_POSITIVE_BIGNUM, TAG_SELF_DESCRIBE,
};
use crate::{BignumPolicy, CborValue, DateTimeFormat, EncoderOptions, Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::{BigInt, BigUint, Sign};
use std::io::Write;

/// A CBOR encoder writing into any [`std::io::Write`].
///
/// All methods take `&mut self`: one encoder is driven by one caller at a time.
/// Sharing a sink between threads requires external synchronization; the encoder
/// does no locking of its own.
///
/// The sink is owned for the encoder's lifetime and returned by
/// [`Encoder::into_inner`]. Pass `&mut W` to keep ownership with the caller.
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    options: EncoderOptions,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder with default options.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: W, options: EncoderOptions) -> Self {
        Encoder { writer, options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the minimal header for `(major, magnitude)`.
    ///
    /// `major` must be in `0..=7`.
    ///
    /// # Errors
    ///
    /// [`Error::MagnitudeOverflow`] for magnitudes of 2^64 or more, [`Error::Io`]
    /// when the sink fails.
    #[inline]
    pub fn write_header<M: Magnitude>(&mut self, major: u8, magnitude: M) -> Result<()> {
        header::write_header(&mut self.writer, major, magnitude)
    }

    #[inline]
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    // ---- Integers ----

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_header(MAJOR_UNSIGNED, value)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        header::write_header_u64(&mut self.writer, MAJOR_UNSIGNED, value)
    }

    /// Writes an unsigned integer, falling back to a bignum above `u64::MAX`.
    pub fn write_u128(&mut self, value: u128) -> Result<()> {
        match u64::try_from(value) {
            Ok(small) => self.write_u64(small),
            Err(_) => {
                let bytes = value.to_be_bytes();
                let skip = (value.leading_zeros() / 8) as usize;
                self.write_bignum(MAJOR_UNSIGNED, TAG_POSITIVE_BIGNUM, &bytes[skip..])
            }
        }
    }

    /// Writes an arbitrary-precision unsigned integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigUint;
    /// use serde_cbor_writer::Encoder;
    ///
    /// let mut encoder = Encoder::new(Vec::new());
    /// encoder.write_biguint(&(BigUint::from(u64::MAX) + 1u32)).unwrap();
    /// // tag 2, byte string of length 9: 01 00 00 00 00 00 00 00 00
    /// assert_eq!(&encoder.get_ref()[..3], &[0xc2, 0x49, 0x01]);
    /// ```
    pub fn write_biguint(&mut self, value: &BigUint) -> Result<()> {
        match value.to_u64() {
            Some(small) => self.write_u64(small),
            None => self.write_bignum(MAJOR_UNSIGNED, TAG_POSITIVE_BIGNUM, &value.to_bytes_be()),
        }
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_i64(i64::from(value))
    }

    /// Writes a signed integer. Negative values `n` are stored as `-1 - n` under
    /// major type 1.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        if value >= 0 {
            self.write_u64(value as u64)
        } else {
            header::write_header_u64(&mut self.writer, MAJOR_NEGATIVE, (-1 - value) as u64)
        }
    }

    pub fn write_i128(&mut self, value: i128) -> Result<()> {
        if value >= 0 {
            return self.write_u128(value as u128);
        }
        let magnitude = (-1 - value) as u128;
        match u64::try_from(magnitude) {
            Ok(small) => header::write_header_u64(&mut self.writer, MAJOR_NEGATIVE, small),
            Err(_) => {
                let bytes = magnitude.to_be_bytes();
                let skip = (magnitude.leading_zeros() / 8) as usize;
                self.write_bignum(MAJOR_NEGATIVE, TAG_NEGATIVE_BIGNUM, &bytes[skip..])
            }
        }
    }

    /// Writes an arbitrary-precision signed integer.
    pub fn write_bigint(&mut self, value: &BigInt) -> Result<()> {
        if value.sign() != Sign::Minus {
            return self.write_biguint(value.magnitude());
        }
        let magnitude = value.magnitude() - BigUint::from(1u32);
        match magnitude.to_u64() {
            Some(small) => header::write_header_u64(&mut self.writer, MAJOR_NEGATIVE, small),
            None => {
                self.write_bignum(MAJOR_NEGATIVE, TAG_NEGATIVE_BIGNUM, &magnitude.to_bytes_be())
            }
        }
    }

    fn write_bignum(&mut self, major: u8, tag: u64, magnitude: &[u8]) -> Result<()> {
        match self.options.bignum {
            BignumPolicy::Tag => {
                tracing::trace!(tag, len = magnitude.len(), "integer written as bignum");
                self.write_tag(tag)?;
                self.write_bytes(magnitude)
            }
            BignumPolicy::Reject => {
                tracing::debug!(major, "integer magnitude exceeds 64 bits, rejecting");
                Err(Error::overflow(major))
            }
        }
    }

    // ---- Strings ----

    /// Writes a definite-length byte string.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_header(MAJOR_BYTES, bytes.len())?;
        self.write_raw(bytes)
    }

    /// Writes a definite-length UTF-8 text string.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_header(MAJOR_TEXT, text.len())?;
        self.write_raw(text.as_bytes())
    }

    // ---- Containers and tags ----

    /// Writes an array header. Exactly `len` items must follow.
    pub fn write_array<M: Magnitude>(&mut self, len: M) -> Result<()> {
        self.write_header(MAJOR_ARRAY, len)
    }

    /// Writes a map header. Exactly `pairs` key/value pairs must follow.
    pub fn write_map<M: Magnitude>(&mut self, pairs: M) -> Result<()> {
        self.write_header(MAJOR_MAP, pairs)
    }

    /// Writes a tag header. Exactly one item must follow.
    pub fn write_tag<M: Magnitude>(&mut self, tag: M) -> Result<()> {
        self.write_header(MAJOR_TAG, tag)
    }

    pub fn write_array_indefinite(&mut self) -> Result<()> {
        self.write_raw(&[initial_byte(MAJOR_ARRAY, INFO_INDEFINITE)])
    }

    pub fn write_map_indefinite(&mut self) -> Result<()> {
        self.write_raw(&[initial_byte(MAJOR_MAP, INFO_INDEFINITE)])
    }

    /// Starts an indefinite-length byte string. Only definite byte strings
    /// (chunks) may follow until [`Encoder::write_break`].
    pub fn write_bytes_indefinite(&mut self) -> Result<()> {
        self.write_raw(&[initial_byte(MAJOR_BYTES, INFO_INDEFINITE)])
    }

    /// Starts an indefinite-length text string. Only definite text strings
    /// (chunks) may follow until [`Encoder::write_break`].
    pub fn write_str_indefinite(&mut self) -> Result<()> {
        self.write_raw(&[initial_byte(MAJOR_TEXT, INFO_INDEFINITE)])
    }

    /// Closes the innermost indefinite-length item.
    pub fn write_break(&mut self) -> Result<()> {
        self.write_raw(&[BREAK])
    }

    /// Writes tag 55799, which marks the following item as CBOR.
    pub fn write_self_describe(&mut self) -> Result<()> {
        self.write_tag(TAG_SELF_DESCRIBE)
    }

    // ---- Major type 7 ----

    /// Writes a simple value.
    ///
    /// 20..=23 are false, true, null and undefined. Codes 24..=31 have no
    /// well-formed encoding and are rejected; floats have their own methods.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSimple`] for codes 24..=31 (nothing is written).
    pub fn write_simple(&mut self, code: u8) -> Result<()> {
        if (SIMPLE_RESERVED_MIN..=SIMPLE_RESERVED_MAX).contains(&code) {
            tracing::debug!(code, "reserved simple value");
            return Err(Error::InvalidSimple { code });
        }
        header::write_header_u64(&mut self.writer, MAJOR_SIMPLE, u64::from(code))
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_simple(if value { SIMPLE_TRUE } else { SIMPLE_FALSE })
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.write_simple(SIMPLE_NULL)
    }

    pub fn write_undefined(&mut self) -> Result<()> {
        self.write_simple(SIMPLE_UNDEFINED)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        let mut buf = [FLOAT32, 0, 0, 0, 0];
        buf[1..].copy_from_slice(&value.to_bits().to_be_bytes());
        self.write_raw(&buf)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        let mut buf = [FLOAT64, 0, 0, 0, 0, 0, 0, 0, 0];
        buf[1..].copy_from_slice(&value.to_bits().to_be_bytes());
        self.write_raw(&buf)
    }

    // ---- Composite values ----

    /// Writes a UTC timestamp as tag 0 or tag 1, depending on
    /// [`EncoderOptions::datetime`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use serde_cbor_writer::{DateTimeFormat, Encoder, EncoderOptions};
    ///
    /// let when = Utc.timestamp_opt(1_363_896_240, 0).unwrap();
    /// let options = EncoderOptions::new().with_datetime(DateTimeFormat::Epoch);
    /// let mut encoder = Encoder::with_options(Vec::new(), options);
    /// encoder.write_datetime(&when).unwrap();
    /// assert_eq!(encoder.into_inner(), [0xc1, 0x1a, 0x51, 0x4b, 0x67, 0xb0]);
    /// ```
    pub fn write_datetime(&mut self, value: &DateTime<Utc>) -> Result<()> {
        match self.options.datetime {
            DateTimeFormat::Rfc3339 => {
                self.write_tag(TAG_DATETIME_STRING)?;
                self.write_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DateTimeFormat::Epoch => {
                self.write_tag(TAG_EPOCH_DATETIME)?;
                let seconds = value.timestamp();
                match value.timestamp_subsec_nanos() {
                    0 => self.write_i64(seconds),
                    nanos => self.write_f64(seconds as f64 + f64::from(nanos) / 1e9),
                }
            }
        }
    }

    /// Writes a dynamic value and everything it contains.
    pub fn write_value(&mut self, value: &CborValue) -> Result<()> {
        match value {
            CborValue::Null => self.write_null(),
            CborValue::Undefined => self.write_undefined(),
            CborValue::Bool(b) => self.write_bool(*b),
            CborValue::Integer(i) => self.write_i64(*i),
            CborValue::Unsigned(u) => self.write_u64(*u),
            CborValue::BigInt(bi) => self.write_bigint(bi),
            CborValue::Float(f) => self.write_f64(*f),
            CborValue::Bytes(bytes) => self.write_bytes(bytes),
            CborValue::Text(text) => self.write_str(text),
            CborValue::Array(items) => {
                self.write_array(items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
                Ok(())
            }
            CborValue::Map(map) => {
                self.write_map(map.len())?;
                for (key, item) in map {
                    self.write_str(key)?;
                    self.write_value(item)?;
                }
                Ok(())
            }
            CborValue::Tag(tag, inner) => {
                self.write_tag(*tag)?;
                self.write_value(inner)
            }
            CborValue::Simple(code) => self.write_simple(*code),
            CborValue::DateTime(dt) => self.write_datetime(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io;

    fn encode<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut Encoder<Vec<u8>>) -> Result<()>,
    {
        let mut encoder = Encoder::new(Vec::new());
        f(&mut encoder).unwrap();
        encoder.into_inner()
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_negative_integers() {
        assert_eq!(encode(|e| e.write_i64(-1)), [0x20]);
        assert_eq!(encode(|e| e.write_i64(-24)), [0x37]);
        assert_eq!(encode(|e| e.write_i64(-25)), [0x38, 0x18]);
        assert_eq!(encode(|e| e.write_i32(-1000)), [0x39, 0x03, 0xe7]);
        assert_eq!(
            encode(|e| e.write_i64(i64::MIN)),
            [0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_integer_domains_agree() {
        for value in [0i64, 1, 23, 24, -1, -24, -25, 1_000_000, -1_000_000, i64::MAX] {
            let expected = encode(|e| e.write_i64(value));
            assert_eq!(encode(|e| e.write_i128(value as i128)), expected);
            assert_eq!(encode(|e| e.write_bigint(&BigInt::from(value))), expected);
        }
        assert_eq!(
            encode(|e| e.write_u128(u64::MAX as u128)),
            encode(|e| e.write_u64(u64::MAX))
        );
    }

    #[test]
    fn test_most_negative_u64_magnitude() {
        // -2^64 is the smallest integer without a bignum.
        let expected = [0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(encode(|e| e.write_i128(-(1i128 << 64))), expected);
        assert_eq!(
            encode(|e| e.write_bigint(&-BigInt::from(1u128 << 64))),
            expected
        );
    }

    #[test]
    fn test_bignum_fallback() {
        let mut expected = vec![0xc2, 0x49, 0x01];
        expected.extend_from_slice(&[0; 8]);
        assert_eq!(encode(|e| e.write_u128(1u128 << 64)), expected);
        assert_eq!(
            encode(|e| e.write_biguint(&(BigUint::from(u64::MAX) + 1u32))),
            expected
        );

        // -2^64 - 1 stores 2^64 under tag 3
        let mut expected = vec![0xc3, 0x49, 0x01];
        expected.extend_from_slice(&[0; 8]);
        assert_eq!(encode(|e| e.write_i128(-(1i128 << 64) - 1)), expected);
    }

    #[test]
    fn test_bignum_reject() {
        let options = EncoderOptions::new().with_bignum(BignumPolicy::Reject);
        let mut encoder = Encoder::with_options(Vec::new(), options);

        let err = encoder.write_u128(u128::MAX).unwrap_err();
        assert!(matches!(err, Error::MagnitudeOverflow { major: 0 }));
        let err = encoder.write_i128(i128::MIN).unwrap_err();
        assert!(matches!(err, Error::MagnitudeOverflow { major: 1 }));

        encoder.write_u128(5).unwrap();
        assert_eq!(encoder.into_inner(), [0x05]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            encode(|e| e.write_bytes(&[1, 2, 3])),
            [0x43, 0x01, 0x02, 0x03]
        );
        assert_eq!(encode(|e| e.write_str("")), [0x60]);
        assert_eq!(encode(|e| e.write_str("ü")), [0x62, 0xc3, 0xbc]);

        let long = "a".repeat(300);
        let bytes = encode(|e| e.write_str(&long));
        assert_eq!(&bytes[..3], &[0x79, 0x01, 0x2c]);
        assert_eq!(bytes.len(), 303);
    }

    #[test]
    fn test_headers_only() {
        assert_eq!(encode(|e| e.write_array(2u32)), [0x82]);
        assert_eq!(encode(|e| e.write_map(1u64)), [0xa1]);
        assert_eq!(encode(|e| e.write_tag(32u8)), [0xd8, 0x20]);
    }

    #[test]
    fn test_simple_values_use_major_seven() {
        assert_eq!(encode(|e| e.write_bool(false)), [0xf4]);
        assert_eq!(encode(|e| e.write_bool(true)), [0xf5]);
        assert_eq!(encode(|e| e.write_null()), [0xf6]);
        assert_eq!(encode(|e| e.write_undefined()), [0xf7]);
        assert_eq!(encode(|e| e.write_simple(16u8)), [0xf0]);
        assert_eq!(encode(|e| e.write_simple(32u8)), [0xf8, 0x20]);
        assert_eq!(encode(|e| e.write_simple(255u8)), [0xf8, 0xff]);
    }

    #[test]
    fn test_reserved_simple_values_rejected() {
        let mut encoder = Encoder::new(Vec::new());
        for code in 24u8..=31 {
            let err = encoder.write_simple(code).unwrap_err();
            assert!(matches!(err, Error::InvalidSimple { code: c } if c == code));
        }
        let err = encoder.write_value(&CborValue::Simple(24)).unwrap_err();
        assert!(matches!(err, Error::InvalidSimple { code: 24 }));
        assert!(encoder.into_inner().is_empty());
    }

    #[test]
    fn test_floats() {
        assert_eq!(encode(|e| e.write_f32(1.5)), [0xfa, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(
            encode(|e| e.write_f64(1.1)),
            [0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]
        );
    }

    #[test]
    fn test_indefinite_framing() {
        let bytes = encode(|e| {
            e.write_array_indefinite()?;
            e.write_u32(1)?;
            e.write_map_indefinite()?;
            e.write_break()?;
            e.write_break()
        });
        assert_eq!(bytes, [0x9f, 0x01, 0xbf, 0xff, 0xff]);

        let bytes = encode(|e| {
            e.write_str_indefinite()?;
            e.write_str("ab")?;
            e.write_break()?;
            e.write_bytes_indefinite()?;
            e.write_break()
        });
        assert_eq!(bytes, [0x7f, 0x62, b'a', b'b', 0xff, 0x5f, 0xff]);
    }

    #[test]
    fn test_datetime_rfc3339() {
        let when = Utc.with_ymd_and_hms(2013, 3, 21, 20, 4, 0).unwrap();
        let bytes = encode(|e| e.write_datetime(&when));

        let text = b"2013-03-21T20:04:00Z";
        assert_eq!(bytes[0], 0xc0);
        assert_eq!(bytes[1], 0x60 | text.len() as u8);
        assert_eq!(&bytes[2..], text);
    }

    #[test]
    fn test_datetime_epoch_fraction() {
        let when = Utc.timestamp_opt(1_363_896_240, 500_000_000).unwrap();
        let options = EncoderOptions::new().with_datetime(DateTimeFormat::Epoch);
        let mut encoder = Encoder::with_options(Vec::new(), options);
        encoder.write_datetime(&when).unwrap();

        let bytes = encoder.into_inner();
        assert_eq!(bytes[0], 0xc1);
        assert_eq!(bytes[1], 0xfb);
        assert_eq!(&bytes[2..], &1_363_896_240.5f64.to_bits().to_be_bytes());
    }

    #[test]
    fn test_sink_error_propagates() {
        let mut encoder = Encoder::new(FailingWriter);
        let err = encoder.write_str("hello").unwrap_err();
        match err {
            Error::Io(inner) => assert_eq!(inner.to_string(), "sink closed"),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_borrowed_sink() {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out);
            encoder.write_u32(7).unwrap();
        }
        out.push(0);
        assert_eq!(out, [0x07, 0x00]);
    }
}
