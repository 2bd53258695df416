//! Codec Layer: Decoder, Encoder dan dynamic `Record`
//!
//! Decoder dan encoder tidak punya shared mutable state. Setiap pemanggilan
//! memakai buffer milik caller, jadi aman dipanggil paralel.

mod decode;
mod encode;
mod record;

pub use decode::{decode, Decoder};
pub use encode::{encode, Encoder, FieldSource};
pub use record::Record;
