//! Dynamic message struct
//!
//! Satu value per field descriptor plus presence set. Dipakai untuk schema
//! yang dimuat saat runtime, dan sebagai hasil antara decode sebelum
//! dikonversi ke generated struct.

use fixedbitset::FixedBitSet;

use super::FieldSource;
use crate::error::FieldError;
use crate::schema::{FieldDescriptor, PresenceSet, Schema};
use crate::wire::{FieldValue, WireValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    schema: &'a Schema,
    /// Index = ordinal. Field yang tidak di-set berisi zero value.
    values: Vec<WireValue<'a>>,
    presence: PresenceSet,
    /// Required field yang sudah punya value
    assigned: FixedBitSet,
}

impl<'a> Record<'a> {
    /// Record kosong: semua field zero, tidak ada yang present
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            values: schema
                .fields()
                .iter()
                .map(|f| WireValue::zero(f.wire_type()))
                .collect(),
            presence: PresenceSet::new(),
            assigned: FixedBitSet::with_capacity(schema.len()),
        }
    }

    #[inline(always)]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[inline(always)]
    pub fn presence(&self) -> PresenceSet {
        self.presence
    }

    pub fn get(&self, name: &str) -> Option<&WireValue<'a>> {
        let field = self.schema.lookup(name)?;
        self.values.get(field.ordinal())
    }

    #[inline(always)]
    pub fn get_at(&self, ordinal: usize) -> Option<&WireValue<'a>> {
        self.values.get(ordinal)
    }

    /// Value sebagai native type; `None` jika field tidak ada atau tipe beda
    pub fn get_as<T: FieldValue<'a>>(&self, name: &str) -> Option<T> {
        self.get(name).copied().and_then(T::from_wire)
    }

    /// Required: sudah di-assign. Optional: presence bit di-set.
    pub fn is_present(&self, ordinal: usize) -> bool {
        match self.schema.field(ordinal) {
            Some(field) => self.is_field_present(field),
            None => false,
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.schema
            .lookup(name)
            .is_some_and(|field| self.is_field_present(field))
    }

    /// Tulis value dan tandai present dalam satu langkah
    pub fn set(&mut self, name: &str, value: impl Into<WireValue<'a>>) -> Result<(), FieldError> {
        let value = value.into();
        let field = self
            .schema
            .lookup(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        if value.wire_type() != field.wire_type() {
            return Err(FieldError::TypeMismatch {
                field: name.to_string(),
                expected: field.wire_type(),
                actual: value.wire_type(),
            });
        }
        let ordinal = field.ordinal();
        self.store(ordinal, value);
        Ok(())
    }

    /// Reset optional field ke zero dan clear presence bit-nya
    pub fn clear(&mut self, name: &str) -> Result<(), FieldError> {
        let field = self
            .schema
            .lookup(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        let slot = field
            .presence_slot()
            .ok_or_else(|| FieldError::RequiredField(name.to_string()))?;
        self.values[field.ordinal()] = WireValue::zero(field.wire_type());
        self.presence.clear(slot);
        Ok(())
    }

    /// Field yang present beserta value-nya, urut ordinal
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &WireValue<'a>)> + '_ {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(field, _)| self.is_field_present(field))
    }

    /// Caller sudah memastikan tipe cocok
    pub(crate) fn store(&mut self, ordinal: usize, value: WireValue<'a>) {
        let Some(field) = self.schema.field(ordinal) else {
            return;
        };
        match field.presence_slot() {
            Some(slot) => self.presence.mark_set(slot),
            None => self.assigned.insert(ordinal),
        }
        self.values[ordinal] = value;
    }

    fn is_field_present(&self, field: &FieldDescriptor) -> bool {
        match field.presence_slot() {
            Some(slot) => self.presence.is_set(slot),
            None => self.assigned.contains(field.ordinal()),
        }
    }
}

impl FieldSource for Record<'_> {
    fn field(&self, ordinal: usize) -> Option<WireValue<'_>> {
        self.is_present(ordinal).then(|| self.values[ordinal])
    }

    fn presence(&self) -> PresenceSet {
        self.presence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireType;

    fn schema() -> Schema {
        Schema::builder("hello")
            .required("id", WireType::Int32)
            .optional("msg", WireType::String)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let schema = schema();
        let record = Record::new(&schema);
        assert_eq!(record.get("id"), Some(&WireValue::Int32(0)));
        assert_eq!(record.get("msg"), Some(&WireValue::String("")));
        assert!(!record.is_present(0));
        assert!(!record.is_set("msg"));
        assert!(record.presence().is_empty());
    }

    #[test]
    fn test_set_marks_presence() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("id", 7i32).unwrap();
        record.set("msg", "hi").unwrap();

        assert!(record.is_present(0));
        assert!(record.is_set("msg"));
        assert_eq!(record.presence().bits(), 0b1);
        assert_eq!(record.get_as::<&str>("msg"), Some("hi"));
        assert_eq!(record.get_as::<i32>("id"), Some(7));
    }

    #[test]
    fn test_rejected_set_changes_nothing() {
        let schema = schema();
        let mut record = Record::new(&schema);
        let err = record.set("msg", 3i32).unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                field: "msg".into(),
                expected: WireType::String,
                actual: WireType::Int32,
            }
        );
        assert!(!record.is_set("msg"));
        assert_eq!(record.get("msg"), Some(&WireValue::String("")));

        assert_eq!(
            record.set("nope", 1i8).unwrap_err(),
            FieldError::UnknownField("nope".into())
        );
    }

    #[test]
    fn test_clear_optional_only() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("msg", "bye").unwrap();
        record.clear("msg").unwrap();
        assert!(!record.is_set("msg"));
        assert_eq!(record.get("msg"), Some(&WireValue::String("")));

        assert_eq!(record.clear("id").unwrap_err(), FieldError::RequiredField("id".into()));
    }

    #[test]
    fn test_iter_yields_present_fields() {
        let schema = schema();
        let mut record = Record::new(&schema);
        record.set("msg", "only").unwrap();
        let names: Vec<_> = record.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(names, ["msg"]);
        assert_eq!(FieldSource::field(&record, 0), None);
        assert_eq!(FieldSource::field(&record, 1), Some(WireValue::String("only")));
    }
}
