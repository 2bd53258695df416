//! Generated message structs
//!
//! `message!` menghasilkan satu struct per message: native field private,
//! satu `PresenceSet`, getter per field, dan setter yang menulis value dan
//! presence bit sekaligus. Schema-nya dibangun sekali (lazy) dan di-share.
//!
//! ```ignore
//! message! {
//!     /// hello request
//!     pub struct HelloRequest as "hello" {
//!         required id: i32 = 0, set_id;
//!         optional msg: String = 1, set_msg, clear_msg;
//!     }
//! }
//! ```
//!
//! Ordinal harus urut dari 0, nama unik, dan optional field maksimal 32.
//! Pelanggaran terdeteksi saat compile.

use crate::codec::{self, FieldSource, Record};
use crate::error::{DecodeError, EncodeError};
use crate::schema::Schema;
use crate::wire::{FieldValue, WireBuffer};

/// Message type dengan schema statis
pub trait Message<'a>: FieldSource + Sized {
    fn schema() -> &'static Schema;

    /// Konversi record yang sudah tervalidasi
    fn from_record(record: Record<'a>) -> Result<Self, DecodeError>;

    fn decode(buf: &'a [u8]) -> Result<Self, DecodeError> {
        Self::from_record(codec::decode(buf, Self::schema())?)
    }

    fn encode(&self) -> Result<WireBuffer, EncodeError> {
        codec::encode(self, Self::schema())
    }
}

#[doc(hidden)]
pub fn field_from_record<'a, T: FieldValue<'a>>(record: &Record<'a>, ordinal: usize) -> Result<T, DecodeError> {
    let field = record
        .schema()
        .field(ordinal)
        .ok_or_else(|| DecodeError::MissingRequiredField(format!("#{ordinal}")))?;
    let value = record
        .get_at(ordinal)
        .copied()
        .ok_or_else(|| DecodeError::MissingRequiredField(field.name().to_string()))?;
    let actual = value.wire_type();
    T::from_wire(value).ok_or_else(|| DecodeError::TypeMismatch {
        field: field.name().to_string(),
        expected: T::WIRE_TYPE,
        actual,
    })
}

#[macro_export]
macro_rules! message {
    (@optional required) => { false };
    (@optional optional) => { true };

    (@accessors required $field:ident : $ty:ty = $ord:literal, $setter:ident) => {
        #[inline(always)]
        pub fn $field(&self) -> &$ty {
            &self.$field
        }

        #[inline(always)]
        pub fn $setter(&mut self, value: impl Into<$ty>) {
            self.$field = value.into();
        }
    };

    (@accessors optional $field:ident : $ty:ty = $ord:literal, $setter:ident, $clear:ident) => {
        /// `None` jika field tidak dikirim
        #[inline(always)]
        pub fn $field(&self) -> Option<&$ty> {
            let slot = $crate::schema::validate::presence_slot(Self::OPTIONAL_FLAGS, $ord);
            self.presence.is_set(slot).then_some(&self.$field)
        }

        #[inline(always)]
        pub fn $setter(&mut self, value: impl Into<$ty>) {
            let slot = $crate::schema::validate::presence_slot(Self::OPTIONAL_FLAGS, $ord);
            self.$field = value.into();
            self.presence.mark_set(slot);
        }

        #[inline(always)]
        pub fn $clear(&mut self) {
            let slot = $crate::schema::validate::presence_slot(Self::OPTIONAL_FLAGS, $ord);
            self.$field = ::std::default::Default::default();
            self.presence.clear(slot);
        }
    };

    (@message_impl [$lt:lifetime] $name:ident { $( $field:ident = $ord:literal ),* }) => {
        impl<$lt> $crate::message::Message<$lt> for $name<$lt> {
            $crate::message!(@message_body $lt { $( $field = $ord ),* });
        }
    };

    (@message_impl [] $name:ident { $( $field:ident = $ord:literal ),* }) => {
        impl<'de> $crate::message::Message<'de> for $name {
            $crate::message!(@message_body 'de { $( $field = $ord ),* });
        }
    };

    (@message_body $lt:lifetime { $( $field:ident = $ord:literal ),* }) => {
        fn schema() -> &'static $crate::schema::Schema {
            &SCHEMA
        }

        fn from_record(record: $crate::codec::Record<$lt>) -> Result<Self, $crate::error::DecodeError> {
            Ok(Self {
                $( $field: $crate::message::field_from_record(&record, $ord)?, )*
                presence: record.presence(),
            })
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(<$lt:lifetime>)? as $wire:literal {
            $(
                $kind:ident $field:ident : $ty:ty = $ord:literal, $setter:ident $(, $clear:ident)?
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        $vis struct $name $(<$lt>)? {
            $( $field: $ty, )*
            presence: $crate::schema::PresenceSet,
        }

        // Tidak semua accessor dipakai oleh setiap message
        #[allow(dead_code)]
        impl $(<$lt>)? $name $(<$lt>)? {
            const OPTIONAL_FLAGS: &'static [bool] = &[$( $crate::message!(@optional $kind) ),*];

            /// Nama message di wire
            pub const WIRE_NAME: &'static str = $wire;

            pub fn new() -> Self {
                Self::default()
            }

            #[inline(always)]
            pub fn presence(&self) -> $crate::schema::PresenceSet {
                self.presence
            }

            $(
                $crate::message!(@accessors $kind $field : $ty = $ord, $setter $(, $clear)?);
            )*
        }

        const _: () = {
            use $crate::schema::validate;

            assert!(
                validate::names_unique(&[$( stringify!($field) ),*]),
                "message field names must be unique"
            );
            assert!(
                validate::ordinals_contiguous(&[$( $ord ),*]),
                "message field ordinals must count up from 0 in declaration order"
            );
            assert!(
                validate::optional_fits(&[$( $crate::message!(@optional $kind) ),*]),
                "a message may declare at most 32 optional fields"
            );
        };

        const _: () = {
            static SCHEMA: ::std::sync::LazyLock<$crate::schema::Schema> = ::std::sync::LazyLock::new(build_schema);

            #[allow(clippy::extra_unused_lifetimes)]
            fn build_schema $(<$lt>)? () -> $crate::schema::Schema {
                let builder = $crate::schema::Schema::builder($wire);
                $(
                    let builder = builder.field(
                        stringify!($field),
                        <$ty as $crate::wire::FieldValue<'_>>::WIRE_TYPE,
                        !$crate::message!(@optional $kind),
                    );
                )*
                match builder.build() {
                    Ok(schema) => schema,
                    Err(err) => panic!("message `{}`: {err}", $wire),
                }
            }

            $crate::message!(@message_impl [$($lt)?] $name { $( $field = $ord ),* });

            impl $(<$lt>)? $crate::codec::FieldSource for $name $(<$lt>)? {
                fn field(&self, ordinal: usize) -> Option<$crate::wire::WireValue<'_>> {
                    match ordinal {
                        $( $ord => Some($crate::wire::FieldValue::to_wire(&self.$field)), )*
                        _ => None,
                    }
                }

                fn presence(&self) -> $crate::schema::PresenceSet {
                    self.presence
                }
            }
        };
    };
}
