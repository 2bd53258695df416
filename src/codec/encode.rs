//! Encoder: struct + presence → wire buffer

use crate::config::CodecConfig;
use crate::error::EncodeError;
use crate::schema::{PresenceSet, Schema};
use crate::wire::{BlobBuf, WireBuffer, WireValue};

/// Sumber value untuk encoder
///
/// Diimplementasikan oleh `Record` dan oleh struct hasil `message!`.
pub trait FieldSource {
    /// Value field `ordinal`, `None` jika belum pernah diberi value
    fn field(&self, ordinal: usize) -> Option<WireValue<'_>>;

    /// Satu-satunya penentu optional field mana yang di-serialize
    fn presence(&self) -> PresenceSet;
}

/// Encoder untuk satu schema
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'s> {
    schema: &'s Schema,
    config: CodecConfig,
}

impl<'s> Encoder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Encode ke buffer baru dengan limit `max_message_size`
    pub fn encode<S: FieldSource + ?Sized>(&self, source: &S) -> Result<WireBuffer, EncodeError> {
        let mut buf = BlobBuf::with_limit(self.config.max_message_size);
        self.encode_into(source, &mut buf)?;
        Ok(buf.finish())
    }

    /// Append ke `buf`. Gagal → `buf` kembali ke isi sebelum pemanggilan.
    pub fn encode_into<S: FieldSource + ?Sized>(&self, source: &S, buf: &mut BlobBuf) -> Result<(), EncodeError> {
        let mark = buf.mark();
        let result = self.write_fields(source, buf);
        if result.is_err() {
            buf.rollback(mark);
        }
        result
    }

    fn write_fields<S: FieldSource + ?Sized>(&self, source: &S, buf: &mut BlobBuf) -> Result<(), EncodeError> {
        let presence = source.presence();
        for field in self.schema.fields() {
            let value = match field.presence_slot() {
                None => source
                    .field(field.ordinal())
                    .ok_or_else(|| EncodeError::MissingRequiredValue(field.name().to_string()))?,
                Some(slot) if presence.is_set(slot) => match source.field(field.ordinal()) {
                    Some(value) => value,
                    None => continue,
                },
                Some(_) => continue,
            };

            if value.wire_type() != field.wire_type() {
                return Err(EncodeError::TypeMismatch {
                    field: field.name().to_string(),
                    expected: field.wire_type(),
                    actual: value.wire_type(),
                });
            }
            buf.put(field.name(), value)?;
        }
        Ok(())
    }
}

/// Encode dengan config default
pub fn encode<S: FieldSource + ?Sized>(source: &S, schema: &Schema) -> Result<WireBuffer, EncodeError> {
    Encoder::new(schema).encode(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, Record};
    use crate::wire::{Table, WireType};

    fn schema() -> Schema {
        Schema::builder("hello")
            .required("id", WireType::Int32)
            .optional("msg", WireType::String)
            .optional("data", WireType::Table)
            .build()
            .unwrap()
    }

    fn names(buf: &WireBuffer) -> Vec<String> {
        buf.attrs().map(|a| a.unwrap().name().to_string()).collect()
    }

    #[test]
    fn test_absent_optional_is_omitted() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("id", 7i32).unwrap();
        let out = encode(&record, &schema).unwrap();
        assert_eq!(names(&out), ["id"]);
    }

    #[test]
    fn test_required_without_value() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("msg", "orphan").unwrap();
        assert_eq!(
            encode(&record, &schema).unwrap_err(),
            EncodeError::MissingRequiredValue("id".into())
        );
    }

    #[test]
    fn test_fields_follow_ordinal_order() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("msg", "second").unwrap();
        record.set("id", 1i32).unwrap();
        let out = encode(&record, &schema).unwrap();
        assert_eq!(names(&out), ["id", "msg"]);
    }

    #[test]
    fn test_opaque_bytes_copied_verbatim() {
        let schema = schema();
        let inner = [0xde, 0xad, 0xbe, 0xef, 0x01];
        let mut record = Record::new(&schema);
        record.set("id", 1i32).unwrap();
        record.set("data", Table::new(&inner)).unwrap();

        let out = encode(&record, &schema).unwrap();
        let decoded = decode(out.as_bytes(), &schema).unwrap();
        assert_eq!(decoded.get_as::<Table<'_>>("data").unwrap().as_bytes(), &inner);
    }

    #[test]
    fn test_buffer_exceeded_discards_partial_output() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("id", 1i32).unwrap();
        record.set("msg", "this string does not fit").unwrap();

        let mut buf = BlobBuf::with_limit(24);
        buf.put("keep", 1i8).unwrap();
        let before = buf.as_bytes().to_vec();

        let err = Encoder::new(&schema).encode_into(&record, &mut buf).unwrap_err();
        assert!(matches!(err, EncodeError::BufferExceeded { .. }));
        assert_eq!(buf.as_bytes(), before.as_slice());
    }

    #[test]
    fn test_limit_from_config() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("id", 1i32).unwrap();
        let encoder = Encoder::new(&schema).with_config(CodecConfig::default().with_max_message_size(4));
        assert_eq!(
            encoder.encode(&record).unwrap_err(),
            EncodeError::BufferExceeded { needed: 16, limit: 4 }
        );
    }

    struct Mistyped;

    impl FieldSource for Mistyped {
        fn field(&self, _ordinal: usize) -> Option<WireValue<'_>> {
            Some(WireValue::String("seven"))
        }

        fn presence(&self) -> PresenceSet {
            PresenceSet::new()
        }
    }

    #[test]
    fn test_type_mismatch_from_source() {
        let schema = schema();
        assert_eq!(
            encode(&Mistyped, &schema).unwrap_err(),
            EncodeError::TypeMismatch {
                field: "id".into(),
                expected: WireType::Int32,
                actual: WireType::String,
            }
        );
    }
}
