//! uidl-runtime - Runtime untuk IDL-generated ubus-style RPC
//!
//! Arsitektur (dari bawah ke atas):
//! - Wire: blob attribute format, zero-copy reader, bounded writer
//! - Schema: ordered field table + presence set per message
//! - Codec: decoder dan encoder yang digerakkan oleh schema
//! - Message: `message!` untuk generated struct
//! - Object: method table dengan empat shorthand dan dispatch

pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod object;
pub mod schema;
pub mod wire;

pub use codec::{decode, encode, Decoder, Encoder, FieldSource, Record};
pub use config::{CodecConfig, DuplicatePolicy};
pub use error::{DecodeError, DispatchError, EncodeError, FieldError, SchemaBuildError, Status};
pub use message::Message;
pub use object::{Call, HandlerResult, MethodDescriptor, MethodOptions, Object, ObjectBuilder, ObjectType, RequestHandle};
pub use schema::{FieldDescriptor, PresenceSet, Schema, SchemaBuilder, EMPTY_SCHEMA};
pub use wire::{Array, BlobBuf, Table, Unspec, WireBuffer, WireType, WireValue};
