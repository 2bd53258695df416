//! Object registration
//!
//! Error shorthand ditunda sampai `build()`, jadi registrasi bisa ditulis
//! sebagai satu chain deklaratif.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use super::method::HandlerResult;
use super::{Call, MethodDescriptor, MethodOptions, Object, ObjectType, SchemaRef};
use crate::config::CodecConfig;
use crate::error::SchemaBuildError;
use crate::schema::EMPTY_SCHEMA;

pub struct ObjectBuilder<C> {
    name: String,
    type_name: Option<String>,
    config: CodecConfig,
    methods: Vec<MethodDescriptor<C>>,
    error: Option<SchemaBuildError>,
}

impl<C> ObjectBuilder<C> {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            config: CodecConfig::default(),
            methods: Vec::new(),
            error: None,
        }
    }

    /// Nama type (default: nama object)
    pub fn object_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Semua optional field terlihat, tag 0
    pub fn plain<F>(self, name: impl Into<Cow<'static, str>>, handler: F, schema: impl Into<SchemaRef>) -> Self
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.method(name, handler, schema, MethodOptions::default())
    }

    /// Hanya optional field `0..limit` yang terlihat
    pub fn masked<F>(
        self,
        name: impl Into<Cow<'static, str>>,
        handler: F,
        schema: impl Into<SchemaRef>,
        limit: usize,
    ) -> Self
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.method(name, handler, schema, MethodOptions::masked(limit))
    }

    pub fn tagged<F>(self, name: impl Into<Cow<'static, str>>, handler: F, schema: impl Into<SchemaRef>, tag: u32) -> Self
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.method(name, handler, schema, MethodOptions::tagged(tag))
    }

    pub fn no_arg<F>(self, name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.method(name, handler, &EMPTY_SCHEMA, MethodOptions::no_arg())
    }

    pub fn method<F>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        handler: F,
        schema: impl Into<SchemaRef>,
        options: MethodOptions,
    ) -> Self
    where
        F: Fn(&mut C, &Call<'_, C>) -> HandlerResult + Send + Sync + 'static,
    {
        match MethodDescriptor::new(name, handler, schema, options) {
            Ok(method) => self.methods.push(method),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Validasi method table dan bekukan object
    pub fn build(self) -> Result<Object<C>, SchemaBuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut index = HashMap::with_capacity(self.methods.len());
        for (position, method) in self.methods.iter().enumerate() {
            if index.insert(method.name().to_string(), position).is_some() {
                return Err(SchemaBuildError::DuplicateMethod {
                    object: self.name,
                    method: method.name().to_string(),
                });
            }
        }

        let type_name = self.type_name.unwrap_or_else(|| self.name.clone());
        let object_type = ObjectType::new(type_name, &self.methods);

        debug!(
            object = %self.name,
            object_type = %object_type.name(),
            type_id = object_type.id(),
            methods = self.methods.len(),
            "object registered"
        );

        Ok(Object {
            name: self.name,
            object_type,
            methods: self.methods,
            index,
            config: self.config,
        })
    }
}
