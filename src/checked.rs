//! Structure-checking wrapper around [`Encoder`].
//!
//! [`Encoder`] trusts its caller to follow an array header with exactly `len` items,
//! a map header with `2 * pairs` items and a tag with one item. [`CheckedEncoder`]
//! keeps a stack of open items and their remaining counts, so these contracts are
//! enforced instead:
//!
//! - a definite container closes by itself once its last item is written;
//! - [`CheckedEncoder::write_break`] is only accepted when the innermost open item
//!   is indefinite-length (and, for maps, not waiting on a value);
//! - indefinite-length strings only accept definite chunks of the same kind;
//! - [`CheckedEncoder::finish`] fails while anything is still open.
//!
//! Several top-level items in a row are allowed; the result is a CBOR sequence.
//!
//! After an I/O error the tracked state no longer matches what reached the sink,
//! and the encoder should be discarded.
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::{CheckedEncoder, Error};
//!
//! let mut encoder = CheckedEncoder::new(Vec::new());
//! encoder.write_array(2u32).unwrap();
//! encoder.write_u64(1).unwrap();
//! assert_eq!(encoder.depth(), 1);
//!
//! // One element is still missing.
//! assert!(matches!(encoder.finish(), Err(Error::Incomplete { depth: 1 })));
//! ```

use crate::header::{Magnitude, MAJOR_ARRAY, MAJOR_MAP, MAJOR_TAG};
use crate::{CborValue, Encoder, EncoderOptions, Error, Result};
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chunk {
    Bytes,
    Text,
}

impl Chunk {
    const fn name(self) -> &'static str {
        match self {
            Chunk::Bytes => "byte",
            Chunk::Text => "text",
        }
    }
}

#[derive(Debug)]
enum Frame {
    /// Array, map or tag: items still owed. Maps count keys and values separately.
    Definite { remaining: u128 },
    Indefinite { map: bool, items: u64 },
    Chunks(Chunk),
}

/// An [`Encoder`] that tracks open containers and rejects malformed structure.
#[derive(Debug)]
pub struct CheckedEncoder<W> {
    inner: Encoder<W>,
    stack: Vec<Frame>,
}

impl<W: Write> CheckedEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: W, options: EncoderOptions) -> Self {
        CheckedEncoder {
            inner: Encoder::with_options(writer, options),
            stack: Vec::new(),
        }
    }

    /// Number of items currently open (containers, tags and chunked strings).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Returns the sink if every opened item has been completed.
    ///
    /// # Errors
    ///
    /// [`Error::Incomplete`] when items are still open.
    pub fn finish(self) -> Result<W> {
        if self.stack.is_empty() {
            Ok(self.inner.into_inner())
        } else {
            tracing::debug!(depth = self.stack.len(), "finished with open items");
            Err(Error::Incomplete {
                depth: self.stack.len(),
            })
        }
    }

    /// Fails if the innermost open frame cannot take an item of this kind.
    fn check_item(&self, chunk: Option<Chunk>) -> Result<()> {
        if let Some(Frame::Chunks(expected)) = self.stack.last() {
            if chunk != Some(*expected) {
                let expected = expected.name();
                tracing::debug!(expected, "invalid chunk in indefinite-length string");
                return Err(Error::InvalidChunk { expected });
            }
        }
        Ok(())
    }

    /// Charges one written item to the innermost open frame.
    fn take_slot(&mut self) {
        match self.stack.last_mut() {
            Some(Frame::Definite { remaining }) => *remaining -= 1,
            Some(Frame::Indefinite { items, .. }) => *items += 1,
            Some(Frame::Chunks(_)) | None => {}
        }
    }

    fn close_finished(&mut self) {
        while let Some(Frame::Definite { remaining: 0 }) = self.stack.last() {
            self.stack.pop();
        }
    }

    // Slots are only taken once the write succeeded.
    fn complete<F>(&mut self, chunk: Option<Chunk>, write: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<W>) -> Result<()>,
    {
        self.check_item(chunk)?;
        write(&mut self.inner)?;
        self.take_slot();
        self.close_finished();
        Ok(())
    }

    fn open<F>(&mut self, frame: Frame, write: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<W>) -> Result<()>,
    {
        self.check_item(None)?;
        write(&mut self.inner)?;
        self.take_slot();
        self.stack.push(frame);
        self.close_finished();
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.complete(None, |e| e.write_u32(value))
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.complete(None, |e| e.write_u64(value))
    }

    pub fn write_u128(&mut self, value: u128) -> Result<()> {
        self.complete(None, |e| e.write_u128(value))
    }

    pub fn write_biguint(&mut self, value: &BigUint) -> Result<()> {
        self.complete(None, |e| e.write_biguint(value))
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.complete(None, |e| e.write_i32(value))
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.complete(None, |e| e.write_i64(value))
    }

    pub fn write_i128(&mut self, value: i128) -> Result<()> {
        self.complete(None, |e| e.write_i128(value))
    }

    pub fn write_bigint(&mut self, value: &BigInt) -> Result<()> {
        self.complete(None, |e| e.write_bigint(value))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.complete(Some(Chunk::Bytes), |e| e.write_bytes(bytes))
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.complete(Some(Chunk::Text), |e| e.write_str(text))
    }

    pub fn write_simple(&mut self, code: u8) -> Result<()> {
        self.complete(None, |e| e.write_simple(code))
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.complete(None, |e| e.write_bool(value))
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.complete(None, Encoder::write_null)
    }

    pub fn write_undefined(&mut self) -> Result<()> {
        self.complete(None, Encoder::write_undefined)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.complete(None, |e| e.write_f32(value))
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.complete(None, |e| e.write_f64(value))
    }

    pub fn write_datetime(&mut self, value: &DateTime<Utc>) -> Result<()> {
        self.complete(None, |e| e.write_datetime(value))
    }

    /// Writes a complete dynamic value; its own structure is always well-formed.
    pub fn write_value(&mut self, value: &CborValue) -> Result<()> {
        self.complete(None, |e| e.write_value(value))
    }

    pub fn write_array<M: Magnitude>(&mut self, len: M) -> Result<()> {
        let len = len.to_u64().ok_or_else(|| Error::overflow(MAJOR_ARRAY))?;
        let remaining = u128::from(len);
        self.open(Frame::Definite { remaining }, |e| e.write_array(len))
    }

    pub fn write_map<M: Magnitude>(&mut self, pairs: M) -> Result<()> {
        let pairs = pairs.to_u64().ok_or_else(|| Error::overflow(MAJOR_MAP))?;
        let remaining = u128::from(pairs) * 2;
        self.open(Frame::Definite { remaining }, |e| e.write_map(pairs))
    }

    pub fn write_tag<M: Magnitude>(&mut self, tag: M) -> Result<()> {
        let tag = tag.to_u64().ok_or_else(|| Error::overflow(MAJOR_TAG))?;
        self.open(Frame::Definite { remaining: 1 }, |e| e.write_tag(tag))
    }

    pub fn write_self_describe(&mut self) -> Result<()> {
        self.open(Frame::Definite { remaining: 1 }, Encoder::write_self_describe)
    }

    pub fn write_array_indefinite(&mut self) -> Result<()> {
        let frame = Frame::Indefinite {
            map: false,
            items: 0,
        };
        self.open(frame, Encoder::write_array_indefinite)
    }

    pub fn write_map_indefinite(&mut self) -> Result<()> {
        let frame = Frame::Indefinite {
            map: true,
            items: 0,
        };
        self.open(frame, Encoder::write_map_indefinite)
    }

    pub fn write_bytes_indefinite(&mut self) -> Result<()> {
        self.open(Frame::Chunks(Chunk::Bytes), Encoder::write_bytes_indefinite)
    }

    pub fn write_str_indefinite(&mut self) -> Result<()> {
        self.open(Frame::Chunks(Chunk::Text), Encoder::write_str_indefinite)
    }

    /// Closes the innermost indefinite-length item.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedBreak`] if the innermost open item is definite, nothing
    /// is open, or an indefinite map holds a key without a value.
    pub fn write_break(&mut self) -> Result<()> {
        match self.stack.last() {
            Some(Frame::Indefinite { map: true, items }) if items % 2 == 1 => {
                tracing::debug!(items, "break inside indefinite map with dangling key");
                Err(Error::UnexpectedBreak)
            }
            Some(Frame::Indefinite { .. }) | Some(Frame::Chunks(_)) => {
                self.inner.write_break()?;
                self.stack.pop();
                self.close_finished();
                Ok(())
            }
            _ => {
                tracing::debug!(depth = self.stack.len(), "break without indefinite item");
                Err(Error::UnexpectedBreak)
            }
        }
    }
}
