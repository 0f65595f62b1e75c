//! Serde serialization into CBOR.
//!
//! This module provides the [`Serializer`] implementation that streams any
//! `T: Serialize` through an [`Encoder`].
//!
//! ## Data model mapping
//!
//! | Serde                          | CBOR                                          |
//! |--------------------------------|-----------------------------------------------|
//! | integers                       | major 0/1, bignum tag beyond 64 bits          |
//! | `f32` / `f64`                  | single / double precision float               |
//! | `str`, `char`                  | text string                                   |
//! | bytes                          | byte string                                   |
//! | `()`, unit struct, `None`      | `null`                                        |
//! | seq, tuple, tuple struct       | array (indefinite if the length is unknown)   |
//! | map, struct                    | map (indefinite if the length is unknown)     |
//! | unit variant                   | variant name as text                          |
//! | newtype/tuple/struct variant   | `{ variant: payload }`                        |
//!
//! Nothing is buffered: headers are written as soon as serde announces a length.
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_cbor_writer::Serializer;
//!
//! let mut serializer = Serializer::new(Vec::new());
//! vec![1, 2, 3].serialize(&mut serializer).unwrap();
//!
//! assert_eq!(serializer.into_inner(), [0x83, 0x01, 0x02, 0x03]);
//! ```

use crate::{Encoder, EncoderOptions, Error, Result};
use serde::{ser, Serialize};
use std::io::Write;

/// The CBOR serializer.
pub struct Serializer<W> {
    encoder: Encoder<W>,
}

impl<W: Write> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: W, options: EncoderOptions) -> Self {
        Serializer {
            encoder: Encoder::with_options(writer, options),
        }
    }

    /// Gives direct access to the underlying encoder, e.g. to write a tag before
    /// serializing the tagged value.
    pub fn encoder_mut(&mut self) -> &mut Encoder<W> {
        &mut self.encoder
    }

    pub fn into_inner(self) -> W {
        self.encoder.into_inner()
    }

    fn write_variant_key(&mut self, variant: &str) -> Result<()> {
        self.encoder.write_map(1u8)?;
        self.encoder.write_str(variant)
    }
}

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, W>;
    type SerializeTuple = SeqSerializer<'a, W>;
    type SerializeTupleStruct = SeqSerializer<'a, W>;
    type SerializeTupleVariant = SeqSerializer<'a, W>;
    type SerializeMap = MapSerializer<'a, W>;
    type SerializeStruct = MapSerializer<'a, W>;
    type SerializeStructVariant = MapSerializer<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.encoder.write_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        self.encoder.write_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        self.encoder.write_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        self.encoder.write_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.encoder.write_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        self.encoder.write_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        self.encoder.write_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        self.encoder.write_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        self.encoder.write_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut buf = [0u8; 4];
        self.encoder.write_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.encoder.write_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        self.encoder.write_bytes(v)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        self.encoder.write_null()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        self.write_variant_key(variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(len) => self.encoder.write_array(len)?,
            None => self.encoder.write_array_indefinite()?,
        }
        Ok(SeqSerializer {
            ser: self,
            indefinite: len.is_none(),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.write_variant_key(variant)?;
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            Some(len) => self.encoder.write_map(len)?,
            None => self.encoder.write_map_indefinite()?,
        }
        Ok(MapSerializer {
            ser: self,
            indefinite: len.is_none(),
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.write_variant_key(variant)?;
        self.serialize_map(Some(len))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Streams array elements; closes indefinite arrays on `end`.
pub struct SeqSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
    indefinite: bool,
}

impl<'a, W: Write> SeqSerializer<'a, W> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        if self.indefinite {
            self.ser.encoder.write_break()?;
        }
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeSeq for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTuple for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTupleStruct for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeTupleVariant for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

/// Streams map entries and struct fields; closes indefinite maps on `end`.
pub struct MapSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
    indefinite: bool,
}

impl<'a, W: Write> MapSerializer<'a, W> {
    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.encoder.write_str(key)?;
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        if self.indefinite {
            self.ser.encoder.write_break()?;
        }
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeMap for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        key.serialize(&mut *self.ser)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeStruct for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeStructVariant for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}
