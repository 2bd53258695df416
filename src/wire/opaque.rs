//! Opaque field views (array / table / unspec)
//!
//! Payload tidak pernah diinterpretasi oleh codec; view hanya menyimpan
//! slice ke buffer asli (offset + length), bukan copy. Nested schema bisa
//! di-apply eksplisit lewat `Table::decode_with`.

use super::AttrReader;
use crate::codec::{self, Record};
use crate::error::DecodeError;
use crate::message::Message;
use crate::schema::Schema;

macro_rules! opaque_view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name<'a> {
            bytes: &'a [u8],
        }

        impl<'a> $name<'a> {
            #[inline(always)]
            pub const fn new(bytes: &'a [u8]) -> Self {
                Self { bytes }
            }

            #[inline(always)]
            pub const fn as_bytes(&self) -> &'a [u8] {
                self.bytes
            }

            #[inline(always)]
            pub const fn len(&self) -> usize {
                self.bytes.len()
            }

            #[inline(always)]
            pub const fn is_empty(&self) -> bool {
                self.bytes.is_empty()
            }
        }
    };
}

opaque_view! {
    /// Array payload: sequence of unnamed attributes
    Array
}

opaque_view! {
    /// Table payload: sequence of named attributes
    Table
}

opaque_view! {
    /// Raw bytes tanpa struktur
    Unspec
}

impl<'a> Array<'a> {
    /// Element-element array, tanpa decode
    pub fn iter(&self) -> AttrReader<'a> {
        AttrReader::new(self.bytes)
    }
}

impl<'a> Table<'a> {
    /// Attribute-attribute table, tanpa decode
    pub fn iter(&self) -> AttrReader<'a> {
        AttrReader::new(self.bytes)
    }

    /// Decode isi table dengan nested schema yang diberikan caller
    pub fn decode_with<'r>(&self, schema: &'r Schema) -> Result<Record<'r>, DecodeError>
    where
        'a: 'r,
    {
        codec::decode(self.bytes, schema)
    }

    /// Decode isi table sebagai generated message
    pub fn decode_as<M: Message<'a>>(&self) -> Result<M, DecodeError> {
        M::decode(self.bytes)
    }
}
