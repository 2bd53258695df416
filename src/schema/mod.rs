//! Schema Layer: ordered field tables per message
//!
//! Schema immutable setelah dibangun dan di-share oleh decoder dan encoder.
//! Dua cara membangun:
//! - `SchemaBuilder` (schema loader, error dikembalikan sebagai `SchemaBuildError`)
//! - `message!` macro (generated code, dicek saat compile)

mod field;
mod presence;
#[doc(hidden)]
pub mod validate;

use std::borrow::Cow;

pub use field::{FieldDescriptor, Presence};
pub use presence::PresenceSet;

use crate::config::PRESENCE_BITS;
use crate::error::SchemaBuildError;
use crate::wire::WireType;

/// Schema untuk method tanpa argumen
pub static EMPTY_SCHEMA: Schema = Schema::empty();

/// Ordered field table untuk satu message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: Cow<'static, str>,
    fields: Vec<FieldDescriptor>,
    /// Ordinal, di-sort berdasarkan nama field
    by_name: Vec<usize>,
    optional_count: usize,
}

impl Schema {
    pub const fn empty() -> Self {
        Self {
            name: Cow::Borrowed(""),
            fields: Vec::new(),
            by_name: Vec::new(),
            optional_count: 0,
        }
    }

    pub fn builder(name: impl Into<Cow<'static, str>>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field dalam urutan ordinal
    #[inline(always)]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline(always)]
    pub fn field(&self, ordinal: usize) -> Option<&FieldDescriptor> {
        self.fields.get(ordinal)
    }

    /// Lookup by wire name (binary search)
    pub fn lookup(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name
            .binary_search_by(|ordinal| self.fields[*ordinal].name().cmp(name))
            .ok()
            .map(|idx| &self.fields[self.by_name[idx]])
    }

    #[inline(always)]
    pub fn optional_count(&self) -> usize {
        self.optional_count
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_required())
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_required())
    }
}

/// Builder untuk schema yang dimuat saat runtime
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: Cow<'static, str>,
    fields: Vec<(Cow<'static, str>, WireType, bool)>,
}

impl SchemaBuilder {
    pub fn required(self, name: impl Into<Cow<'static, str>>, ty: WireType) -> Self {
        self.field(name, ty, true)
    }

    pub fn optional(self, name: impl Into<Cow<'static, str>>, ty: WireType) -> Self {
        self.field(name, ty, false)
    }

    pub fn field(mut self, name: impl Into<Cow<'static, str>>, ty: WireType, required: bool) -> Self {
        self.fields.push((name.into(), ty, required));
        self
    }

    /// Assign ordinal dan presence slot, lalu validasi
    pub fn build(self) -> Result<Schema, SchemaBuildError> {
        let schema_name = self.name;
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut next_slot = 0usize;

        for (ordinal, (name, ty, required)) in self.fields.into_iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaBuildError::EmptyFieldName {
                    schema: schema_name.into_owned(),
                    ordinal,
                });
            }
            let presence = if required {
                Presence::Required
            } else {
                let slot = next_slot;
                next_slot += 1;
                // Cek total di bawah; slot sementara dibatasi ke u8
                Presence::Optional {
                    slot: slot.min(u8::MAX as usize) as u8,
                }
            };
            fields.push(FieldDescriptor::new(name, ty, ordinal, presence));
        }

        if next_slot > PRESENCE_BITS {
            return Err(SchemaBuildError::TooManyOptional {
                schema: schema_name.into_owned(),
                count: next_slot,
            });
        }

        let mut by_name: Vec<usize> = (0..fields.len()).collect();
        by_name.sort_by(|a, b| fields[*a].name().cmp(fields[*b].name()));
        if let Some(pair) = by_name
            .windows(2)
            .find(|pair| fields[pair[0]].name() == fields[pair[1]].name())
        {
            return Err(SchemaBuildError::DuplicateField {
                schema: schema_name.into_owned(),
                field: fields[pair[0]].name().to_string(),
            });
        }

        Ok(Schema {
            name: schema_name,
            fields,
            by_name,
            optional_count: next_slot,
        })
    }
}
