//! Decoder: wire buffer → `Record`
//!
//! Dua tahap:
//! 1. Scan semua attribute, pilih satu attribute per field (unknown name
//!    dan field tersembunyi di-skip, duplicate mengikuti `DuplicatePolicy`)
//! 2. Validasi per field dalam urutan ordinal, lalu isi record
//!
//! Semua error dikembalikan sebelum record diserahkan ke caller.

use tracing::trace;

use super::Record;
use crate::config::{CodecConfig, DuplicatePolicy};
use crate::error::DecodeError;
use crate::schema::Schema;
use crate::wire::{Attr, AttrReader};

/// Decoder untuk satu schema
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    schema: &'s Schema,
    config: CodecConfig,
    /// Optional field dengan presence slot >= nilai ini tidak terlihat di wire
    visible_optional: usize,
}

impl<'s> Decoder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            config: CodecConfig::default(),
            visible_optional: schema.optional_count(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Hanya optional field `0..limit` yang dibaca dari wire
    pub fn with_bitmask_limit(mut self, limit: usize) -> Self {
        self.visible_optional = limit.min(self.schema.optional_count());
        self
    }

    pub fn decode<'a>(&self, buf: &'a [u8]) -> Result<Record<'a>, DecodeError>
    where
        's: 'a,
    {
        if buf.len() > self.config.max_message_size {
            return Err(DecodeError::malformed(
                self.config.max_message_size,
                "message exceeds the configured maximum size",
            ));
        }

        let mut picked: Vec<Option<Attr<'a>>> = vec![None; self.schema.len()];
        for attr in AttrReader::new(buf) {
            let attr = attr?;
            let Some(field) = self.schema.lookup(attr.name()) else {
                trace!(schema = self.schema.name(), name = attr.name(), "ignoring unknown attribute");
                continue;
            };
            if field
                .presence_slot()
                .is_some_and(|slot| slot as usize >= self.visible_optional)
            {
                trace!(schema = self.schema.name(), name = attr.name(), "ignoring attribute hidden by bitmask limit");
                continue;
            }

            let slot = &mut picked[field.ordinal()];
            if slot.is_some() {
                trace!(
                    schema = self.schema.name(),
                    name = attr.name(),
                    offset = attr.offset(),
                    policy = ?self.config.duplicates,
                    "duplicate attribute"
                );
                if self.config.duplicates == DuplicatePolicy::FirstWins {
                    continue;
                }
            }
            *slot = Some(attr);
        }

        let mut record = Record::new(self.schema);
        for (field, attr) in self.schema.fields().iter().zip(picked) {
            match attr {
                Some(attr) => {
                    let value = attr.value_as(field.wire_type())?;
                    record.store(field.ordinal(), value);
                }
                None if field.is_required() => {
                    return Err(DecodeError::MissingRequiredField(field.name().to_string()));
                }
                None => {}
            }
        }
        Ok(record)
    }
}

/// Decode dengan config default
pub fn decode<'a>(buf: &'a [u8], schema: &'a Schema) -> Result<Record<'a>, DecodeError> {
    Decoder::new(schema).decode(buf)
}
