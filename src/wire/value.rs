//! Typed wire values dan konversi native ⇄ wire

use super::{Array, Table, Unspec, WireType};
use crate::error::DecodeError;

/// Satu value seperti yang muncul di wire. String dan opaque payload
/// di-borrow dari buffer asli.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireValue<'a> {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Double(f64),
    String(&'a str),
    Array(Array<'a>),
    Table(Table<'a>),
    Unspec(Unspec<'a>),
}

impl<'a> WireValue<'a> {
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Int8(_) => WireType::Int8,
            Self::Int16(_) => WireType::Int16,
            Self::Int32(_) => WireType::Int32,
            Self::Int64(_) => WireType::Int64,
            Self::Bool(_) => WireType::Bool,
            Self::Double(_) => WireType::Double,
            Self::String(_) => WireType::String,
            Self::Array(_) => WireType::Array,
            Self::Table(_) => WireType::Table,
            Self::Unspec(_) => WireType::Unspec,
        }
    }

    /// Zero value untuk field yang tidak dikirim
    pub const fn zero(ty: WireType) -> WireValue<'static> {
        match ty {
            WireType::Int8 => WireValue::Int8(0),
            WireType::Int16 => WireValue::Int16(0),
            WireType::Int32 => WireValue::Int32(0),
            WireType::Int64 => WireValue::Int64(0),
            WireType::Bool => WireValue::Bool(false),
            WireType::Double => WireValue::Double(0.0),
            WireType::String => WireValue::String(""),
            WireType::Array => WireValue::Array(Array::new(&[])),
            WireType::Table => WireValue::Table(Table::new(&[])),
            WireType::Unspec => WireValue::Unspec(Unspec::new(&[])),
        }
    }

    /// Interpretasi payload sebagai `ty`. Tidak ada narrowing: ukuran
    /// payload fixed-width harus tepat.
    pub(crate) fn read(ty: WireType, payload: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        Ok(match ty {
            WireType::Int8 => Self::Int8(i8::from_be_bytes(fixed(payload, offset)?)),
            WireType::Bool => Self::Bool(fixed::<1>(payload, offset)?[0] != 0),
            WireType::Int16 => Self::Int16(i16::from_be_bytes(fixed(payload, offset)?)),
            WireType::Int32 => Self::Int32(i32::from_be_bytes(fixed(payload, offset)?)),
            WireType::Int64 => Self::Int64(i64::from_be_bytes(fixed(payload, offset)?)),
            WireType::Double => Self::Double(f64::from_bits(u64::from_be_bytes(fixed(payload, offset)?))),
            WireType::String => Self::String(
                std::str::from_utf8(payload)
                    .map_err(|_| DecodeError::malformed(offset, "string payload is not valid UTF-8"))?,
            ),
            WireType::Array => Self::Array(Array::new(payload)),
            WireType::Table => Self::Table(Table::new(payload)),
            WireType::Unspec => Self::Unspec(Unspec::new(payload)),
        })
    }

    /// Panjang payload tanpa header dan padding
    pub(crate) fn payload_len(&self) -> usize {
        match self {
            Self::String(s) => s.len(),
            Self::Array(v) => v.len(),
            Self::Table(v) => v.len(),
            Self::Unspec(v) => v.len(),
            // Fixed-width types selalu punya ukuran
            fixed => fixed.wire_type().fixed_size().unwrap_or(0),
        }
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) {
        match self {
            Self::Int8(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Int16(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Int64(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Bool(v) => out.push(u8::from(*v)),
            Self::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            Self::String(s) => out.extend_from_slice(s.as_bytes()),
            Self::Array(v) => out.extend_from_slice(v.as_bytes()),
            Self::Table(v) => out.extend_from_slice(v.as_bytes()),
            Self::Unspec(v) => out.extend_from_slice(v.as_bytes()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int8(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes untuk array/table/unspec
    pub fn as_opaque(&self) -> Option<&'a [u8]> {
        match *self {
            Self::Array(v) => Some(v.as_bytes()),
            Self::Table(v) => Some(v.as_bytes()),
            Self::Unspec(v) => Some(v.as_bytes()),
            _ => None,
        }
    }
}

#[inline(always)]
fn fixed<const N: usize>(payload: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    payload
        .try_into()
        .map_err(|_| DecodeError::malformed(offset, "fixed-width payload has the wrong size"))
}

/// Native Rust type yang bisa menjadi field sebuah message
///
/// Dipakai oleh kode hasil `message!` untuk memetakan field ke `WireType`.
pub trait FieldValue<'a>: Sized {
    const WIRE_TYPE: WireType;

    /// `None` jika variant tidak cocok dengan `WIRE_TYPE`
    fn from_wire(value: WireValue<'a>) -> Option<Self>;

    fn to_wire(&self) -> WireValue<'_>;
}

macro_rules! impl_scalar_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> FieldValue<'a> for $ty {
                const WIRE_TYPE: WireType = WireType::$variant;

                #[inline(always)]
                fn from_wire(value: WireValue<'a>) -> Option<Self> {
                    match value {
                        WireValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                #[inline(always)]
                fn to_wire(&self) -> WireValue<'_> {
                    WireValue::$variant(*self)
                }
            }

            impl From<$ty> for WireValue<'_> {
                #[inline(always)]
                fn from(value: $ty) -> Self {
                    WireValue::$variant(value)
                }
            }
        )*
    };
}

impl_scalar_field! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    bool => Bool,
    f64 => Double,
}

macro_rules! impl_opaque_field {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<'a> FieldValue<'a> for $ty<'a> {
                const WIRE_TYPE: WireType = WireType::$ty;

                #[inline(always)]
                fn from_wire(value: WireValue<'a>) -> Option<Self> {
                    match value {
                        WireValue::$ty(v) => Some(v),
                        _ => None,
                    }
                }

                #[inline(always)]
                fn to_wire(&self) -> WireValue<'_> {
                    WireValue::$ty(*self)
                }
            }

            impl<'a> From<$ty<'a>> for WireValue<'a> {
                #[inline(always)]
                fn from(value: $ty<'a>) -> Self {
                    WireValue::$ty(value)
                }
            }
        )*
    };
}

impl_opaque_field!(Array, Table, Unspec);

impl<'a> FieldValue<'a> for &'a str {
    const WIRE_TYPE: WireType = WireType::String;

    #[inline(always)]
    fn from_wire(value: WireValue<'a>) -> Option<Self> {
        value.as_str()
    }

    #[inline(always)]
    fn to_wire(&self) -> WireValue<'_> {
        WireValue::String(*self)
    }
}

/// Owned string; decode menyalin dari buffer
impl<'a> FieldValue<'a> for String {
    const WIRE_TYPE: WireType = WireType::String;

    fn from_wire(value: WireValue<'a>) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    #[inline(always)]
    fn to_wire(&self) -> WireValue<'_> {
        WireValue::String(self.as_str())
    }
}

impl<'a> From<&'a str> for WireValue<'a> {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        WireValue::String(value)
    }
}

impl<'a> From<&'a String> for WireValue<'a> {
    #[inline(always)]
    fn from(value: &'a String) -> Self {
        WireValue::String(value.as_str())
    }
}
