//! Method descriptor dan calling convention
//!
//! Keempat shorthand (plain, masked, tagged, no-arg) berakhir di satu
//! constructor: `MethodDescriptor::new` dengan `MethodOptions`.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::{Object, RequestHandle};
use crate::codec::{Decoder, Encoder, Record};
use crate::error::{DecodeError, SchemaBuildError, Status};
use crate::message::Message;
use crate::schema::{FieldDescriptor, Schema};
use crate::wire::WireBuffer;

/// Hasil handler: reply opsional, atau status error untuk caller
pub type HandlerResult = Result<Option<WireBuffer>, Status>;

/// Handler signature. `C` adalah context milik aplikasi.
pub type HandlerFn<C> = dyn Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync;

/// Calling-convention flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodOptions {
    /// `None` = semua optional field terlihat
    pub bitmask_limit: Option<usize>,
    /// Diteruskan ke tooling/ACL, tidak diinterpretasi di sini
    pub tag: u32,
    /// Handler dipanggil tanpa decode
    pub no_arg: bool,
}

impl MethodOptions {
    pub fn masked(limit: usize) -> Self {
        Self {
            bitmask_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn tagged(tag: u32) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn no_arg() -> Self {
        Self {
            no_arg: true,
            ..Self::default()
        }
    }
}

/// Schema milik generated code (`'static`) atau hasil loader (shared)
#[derive(Debug, Clone)]
pub enum SchemaRef {
    Static(&'static Schema),
    Shared(Arc<Schema>),
}

impl Deref for SchemaRef {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        match self {
            Self::Static(schema) => schema,
            Self::Shared(schema) => schema,
        }
    }
}

impl From<&'static Schema> for SchemaRef {
    fn from(schema: &'static Schema) -> Self {
        Self::Static(schema)
    }
}

impl From<Arc<Schema>> for SchemaRef {
    fn from(schema: Arc<Schema>) -> Self {
        Self::Shared(schema)
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        Self::Shared(Arc::new(schema))
    }
}

/// Satu entry di method table. Immutable setelah registrasi.
pub struct MethodDescriptor<C> {
    name: Cow<'static, str>,
    handler: Arc<HandlerFn<C>>,
    schema: SchemaRef,
    bitmask_limit: usize,
    tag: u32,
    no_arg: bool,
}

impl<C> MethodDescriptor<C> {
    pub fn new<F>(
        name: impl Into<Cow<'static, str>>,
        handler: F,
        schema: impl Into<SchemaRef>,
        options: MethodOptions,
    ) -> Result<Self, SchemaBuildError>
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        let name = name.into();
        let schema = schema.into();

        if options.no_arg && !schema.is_empty() {
            return Err(SchemaBuildError::NoArgWithSchema {
                method: name.into_owned(),
                schema: schema.name().to_string(),
            });
        }

        let optional = schema.optional_count();
        let bitmask_limit = options.bitmask_limit.unwrap_or(optional);
        if bitmask_limit > optional {
            return Err(SchemaBuildError::BitmaskLimitExceeded {
                method: name.into_owned(),
                limit: bitmask_limit,
                optional,
            });
        }

        Ok(Self {
            name,
            handler: Arc::new(handler),
            schema,
            bitmask_limit,
            tag: options.tag,
            no_arg: options.no_arg,
        })
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline(always)]
    pub fn bitmask_limit(&self) -> usize {
        self.bitmask_limit
    }

    #[inline(always)]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    #[inline(always)]
    pub fn is_no_arg(&self) -> bool {
        self.no_arg
    }

    /// Field yang terlihat di wire untuk method ini, urut ordinal
    pub fn signature(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.schema
            .fields()
            .iter()
            .filter(|field| field.presence_slot().map_or(true, |slot| (slot as usize) < self.bitmask_limit))
    }

    #[inline(always)]
    pub(crate) fn invoke(&self, ctx: &mut C, call: &Call<'_, C>) -> HandlerResult {
        (self.handler)(ctx, call)
    }
}

impl<C> Clone for MethodDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
            schema: self.schema.clone(),
            bitmask_limit: self.bitmask_limit,
            tag: self.tag,
            no_arg: self.no_arg,
        }
    }
}

impl<C> fmt::Debug for MethodDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema.name())
            .field("bitmask_limit", &self.bitmask_limit)
            .field("tag", &self.tag)
            .field("no_arg", &self.no_arg)
            .finish_non_exhaustive()
    }
}

/// Satu pemanggilan method, seperti yang dilihat handler
pub struct Call<'a, C> {
    pub(super) object: &'a Object<C>,
    pub(super) method: &'a MethodDescriptor<C>,
    pub(super) request: RequestHandle,
    pub(super) raw: &'a [u8],
    pub(super) args: Record<'a>,
}

impl<'a, C> Call<'a, C> {
    #[inline(always)]
    pub fn object(&self) -> &'a Object<C> {
        self.object
    }

    #[inline(always)]
    pub fn method(&self) -> &'a MethodDescriptor<C> {
        self.method
    }

    #[inline(always)]
    pub fn method_name(&self) -> &'a str {
        self.method.name()
    }

    #[inline(always)]
    pub fn request(&self) -> RequestHandle {
        self.request
    }

    /// Buffer request apa adanya
    #[inline(always)]
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Argumen hasil decode (kosong untuk method tanpa argumen)
    #[inline(always)]
    pub fn args(&self) -> &Record<'a> {
        &self.args
    }

    /// Argumen sebagai generated message
    pub fn args_as<M: Message<'a>>(&self) -> Result<M, DecodeError> {
        if std::ptr::eq(self.args.schema(), M::schema()) {
            return M::from_record(self.args.clone());
        }
        Decoder::new(M::schema())
            .with_config(*self.object.config())
            .with_bitmask_limit(self.method.bitmask_limit())
            .decode(self.raw)
            .and_then(M::from_record)
    }

    /// Encode reply dengan limit milik object
    pub fn reply<'m, M: Message<'m>>(&self, message: &M) -> HandlerResult {
        Encoder::new(M::schema())
            .with_config(*self.object.config())
            .encode(message)
            .map(Some)
            .map_err(Status::from)
    }
}
