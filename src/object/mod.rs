//! Object Layer: method table dan dispatch
//!
//! Object dibangun sekali lewat `ObjectBuilder`, lalu read-only. Dispatch
//! hanya membaca table, jadi `Object` bisa di-share antar thread via `Arc`
//! tanpa lock; setiap request membawa context `C` miliknya sendiri.

mod builder;
mod method;

use std::collections::HashMap;

use tracing::debug;

pub use builder::ObjectBuilder;
pub use method::{Call, HandlerFn, HandlerResult, MethodDescriptor, MethodOptions, SchemaRef};

use crate::codec::{Decoder, Record};
use crate::config::CodecConfig;
use crate::error::DispatchError;
use crate::schema::EMPTY_SCHEMA;
use crate::wire::WireBuffer;

/// Handle request dari transport, diteruskan ke handler apa adanya
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestHandle(pub u32);

/// Type identifier: sama untuk semua object dengan nama type dan
/// signature method yang sama
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectType {
    name: String,
    id: u32,
}

impl ObjectType {
    pub(crate) fn new<C>(name: String, methods: &[MethodDescriptor<C>]) -> Self {
        let mut sum = SignatureChecksum::new();
        sum.update(name.as_bytes());
        for method in methods {
            sum.update(&[0]);
            sum.update(method.name().as_bytes());
            for field in method.signature() {
                sum.update(&[0, field.wire_type().tag(), u8::from(field.is_required())]);
                sum.update(field.name().as_bytes());
            }
        }
        Self { name, id: sum.finish() }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Adler-style running checksum
struct SignatureChecksum {
    a: u32,
    b: u32,
}

impl SignatureChecksum {
    fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    #[inline(always)]
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.a = self.a.wrapping_add(byte as u32);
            self.b = self.b.wrapping_add(self.a);
        }
    }

    fn finish(&self) -> u32 {
        (self.b << 16) | (self.a & 0xffff)
    }
}

/// Remote-callable object
pub struct Object<C> {
    name: String,
    object_type: ObjectType,
    methods: Vec<MethodDescriptor<C>>,
    /// Nama method → posisi di `methods`
    index: HashMap<String, usize>,
    config: CodecConfig,
}

impl<C> Object<C> {
    pub fn builder(name: impl Into<String>) -> ObjectBuilder<C> {
        ObjectBuilder::new(name)
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    /// Method dalam urutan registrasi
    #[inline(always)]
    pub fn methods(&self) -> &[MethodDescriptor<C>] {
        &self.methods
    }

    #[inline(always)]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Exact name match
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor<C>> {
        self.index.get(name).map(|position| &self.methods[*position])
    }

    /// Lookup → decode (kecuali no-arg) → handler
    pub fn dispatch(
        &self,
        ctx: &mut C,
        request: RequestHandle,
        method: &str,
        raw: &[u8],
    ) -> Result<Option<WireBuffer>, DispatchError> {
        let Some(descriptor) = self.method(method) else {
            debug!(object = %self.name, method, "method not found");
            return Err(DispatchError::MethodNotFound(method.to_string()));
        };

        let args = if descriptor.is_no_arg() {
            Record::new(&EMPTY_SCHEMA)
        } else {
            Decoder::new(descriptor.schema())
                .with_config(self.config)
                .with_bitmask_limit(descriptor.bitmask_limit())
                .decode(raw)
                .inspect_err(|err| debug!(object = %self.name, method, %err, "rejecting request"))?
        };

        let call = Call {
            object: self,
            method: descriptor,
            request,
            raw,
            args,
        };
        descriptor.invoke(ctx, &call).map_err(|status| {
            debug!(object = %self.name, method, %status, "handler failed");
            DispatchError::Handler(status)
        })
    }
}

impl<C> std::fmt::Debug for Object<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("object_type", &self.object_type)
            .field("methods", &self.methods)
            .field("config", &self.config)
            .finish()
    }
}
