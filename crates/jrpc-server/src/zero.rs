//! Zero-value detection for decoded params.
//!
//! [`is_zero`] walks a value through serde and reports whether it is the
//! zero value of its type: `false`, numeric zero, `'\0'`, the empty string,
//! unit, `None`, or a struct or tuple whose members are all zero. Maps,
//! sequences, byte buffers, `Some(_)` and enum variants are never zero, as
//! decoding always materialises them.

use serde::de::value::Error;
use serde::ser::{self, Serialize};

/// Whether `value` is the zero value of its type.
///
/// A value that fails to serialize counts as non-zero.
pub fn is_zero<T: Serialize + ?Sized>(value: &T) -> bool {
    value.serialize(ZeroCheck).unwrap_or(false)
}

struct ZeroCheck;

/// Accumulates the members of a struct or tuple.
struct Members {
    all_zero: bool,
}

impl Members {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) {
        self.all_zero = self.all_zero && is_zero(value);
    }
}

/// Consumes a map, sequence or variant, which is never zero.
struct NonZero;

impl ser::Serializer for ZeroCheck {
    type Ok = bool;
    type Error = Error;

    type SerializeSeq = NonZero;
    type SerializeTuple = Members;
    type SerializeTupleStruct = Members;
    type SerializeTupleVariant = NonZero;
    type SerializeMap = NonZero;
    type SerializeStruct = Members;
    type SerializeStructVariant = NonZero;

    fn serialize_bool(self, v: bool) -> Result<bool, Error> {
        Ok(!v)
    }

    fn serialize_i8(self, v: i8) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_i16(self, v: i16) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_i32(self, v: i32) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_i64(self, v: i64) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_i128(self, v: i128) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_u8(self, v: u8) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_u16(self, v: u16) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_u32(self, v: u32) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_u64(self, v: u64) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_u128(self, v: u128) -> Result<bool, Error> {
        Ok(v == 0)
    }

    fn serialize_f32(self, v: f32) -> Result<bool, Error> {
        Ok(v == 0.0)
    }

    fn serialize_f64(self, v: f64) -> Result<bool, Error> {
        Ok(v == 0.0)
    }

    fn serialize_char(self, v: char) -> Result<bool, Error> {
        Ok(v == '\0')
    }

    fn serialize_str(self, v: &str) -> Result<bool, Error> {
        Ok(v.is_empty())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<bool, Error> {
        Ok(false)
    }

    fn serialize_none(self) -> Result<bool, Error> {
        Ok(true)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<bool, Error> {
        Ok(false)
    }

    fn serialize_unit(self) -> Result<bool, Error> {
        Ok(true)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<bool, Error> {
        Ok(true)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<bool, Error> {
        Ok(false)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<bool, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<bool, Error> {
        Ok(false)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<NonZero, Error> {
        Ok(NonZero)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Members, Error> {
        Ok(Members { all_zero: true })
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Members, Error> {
        Ok(Members { all_zero: true })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NonZero, Error> {
        Ok(NonZero)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<NonZero, Error> {
        Ok(NonZero)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Members, Error> {
        Ok(Members { all_zero: true })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<NonZero, Error> {
        Ok(NonZero)
    }
}

impl ser::SerializeTuple for Members {
    type Ok = bool;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(self.all_zero)
    }
}

impl ser::SerializeTupleStruct for Members {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(self.all_zero)
    }
}

impl ser::SerializeStruct for Members {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<(), Error> {
        self.push(value);
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(self.all_zero)
    }
}

impl ser::SerializeSeq for NonZero {
    type Ok = bool;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Error> {
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(false)
    }
}

impl ser::SerializeTupleVariant for NonZero {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Error> {
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(false)
    }
}

impl ser::SerializeMap for NonZero {
    type Ok = bool;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Error> {
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(false)
    }
}

impl ser::SerializeStructVariant for NonZero {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, _value: &T) -> Result<(), Error> {
        Ok(())
    }

    fn end(self) -> Result<bool, Error> {
        Ok(false)
    }
}
