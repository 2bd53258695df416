//! Wire Layer: blob attribute encoding
//!
//! Format per attribute:
//! ┌────────┬────────┬─────────────┬────────────────┬──────┬─────────┬─────────┐
//! │ tag u8 │ flg u8 │ name_len u16│ payload_len u32│ name │ payload │ pad → 4 │
//! └────────┴────────┴─────────────┴────────────────┴──────┴─────────┴─────────┘
//!
//! Prinsip desain:
//! - Zero-copy read: string dan opaque payload di-borrow dari buffer asli
//! - Bounded write: `BlobBuf` menolak tulis melewati limit, tanpa truncation
//! - Name adalah satu-satunya identifier di wire, ordinal tidak pernah dikirim

mod attr;
mod blob_buf;
mod opaque;
mod value;

use std::fmt;

pub use attr::{Attr, AttrHeader, AttrReader, ATTR_ALIGN, ATTR_HEADER_SIZE};
pub use blob_buf::{BlobBuf, Nest, WireBuffer};
pub use opaque::{Array, Table, Unspec};
pub use value::{FieldValue, WireValue};

/// Tipe field di schema dan di wire (penomoran tag mengikuti blobmsg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Unspec,
    Array,
    Table,
    String,
    Int64,
    Int32,
    Int16,
    Int8,
    /// Shares the int8 tag; any nonzero byte decodes as `true`
    Bool,
    Double,
}

impl WireType {
    /// Tag byte di attribute header
    #[inline(always)]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Unspec => 0,
            Self::Array => 1,
            Self::Table => 2,
            Self::String => 3,
            Self::Int64 => 4,
            Self::Int32 => 5,
            Self::Int16 => 6,
            Self::Int8 | Self::Bool => 7,
            Self::Double => 8,
        }
    }

    /// Canonical type untuk sebuah tag. Tag 7 selalu dibaca sebagai `Int8`.
    #[inline(always)]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Unspec),
            1 => Some(Self::Array),
            2 => Some(Self::Table),
            3 => Some(Self::String),
            4 => Some(Self::Int64),
            5 => Some(Self::Int32),
            6 => Some(Self::Int16),
            7 => Some(Self::Int8),
            8 => Some(Self::Double),
            _ => None,
        }
    }

    /// Ukuran payload untuk tipe fixed-width
    #[inline(always)]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::Bool => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 => Some(4),
            Self::Int64 | Self::Double => Some(8),
            Self::Unspec | Self::Array | Self::Table | Self::String => None,
        }
    }

    /// Array, table dan unspec tidak diinterpretasi oleh layer ini
    #[inline(always)]
    pub const fn is_opaque(self) -> bool {
        matches!(self, Self::Unspec | Self::Array | Self::Table)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unspec => "unspec",
            Self::Array => "array",
            Self::Table => "table",
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Int16 => "int16",
            Self::Int8 => "int8",
            Self::Bool => "bool",
            Self::Double => "double",
        }
    }

    /// Apakah attribute dengan `tag` boleh mengisi field bertipe ini
    #[inline(always)]
    pub fn accepts(self, tag: u8) -> bool {
        self.tag() == tag
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
