//! Error taxonomy
//!
//! - Build-time: `SchemaBuildError` (fatal, registrasi object dibatalkan)
//! - Per-request: `DecodeError` → client-facing "invalid argument"
//! - Per-response: `EncodeError` → server-facing failure
//!
//! Tidak ada retry di layer ini; transport yang memutuskan.

use std::fmt;

use thiserror::Error;

use crate::wire::WireType;

/// Schema atau method table yang tidak valid. Terdeteksi sekali saat startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    #[error("schema `{schema}`: duplicate field name `{field}`")]
    DuplicateField { schema: String, field: String },

    #[error("schema `{schema}`: field #{ordinal} has an empty name")]
    EmptyFieldName { schema: String, ordinal: usize },

    #[error("schema `{schema}`: {count} optional fields do not fit the 32-bit presence mask")]
    TooManyOptional { schema: String, count: usize },

    #[error("method `{method}`: bitmask limit {limit} exceeds the schema's {optional} optional fields")]
    BitmaskLimitExceeded {
        method: String,
        limit: usize,
        optional: usize,
    },

    #[error("object `{object}`: method `{method}` registered twice")]
    DuplicateMethod { object: String, method: String },

    #[error("method `{method}` is declared without arguments but carries schema `{schema}`")]
    NoArgWithSchema { method: String, schema: String },
}

/// Request buffer ditolak. Struct hasil decode tidak pernah dikembalikan
/// sebagian.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),

    #[error("field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: WireType,
        actual: WireType,
    },

    #[error("malformed buffer at offset {offset}: {reason}")]
    BufferMalformed { offset: usize, reason: &'static str },
}

impl DecodeError {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::BufferMalformed { offset, reason }
    }
}

/// Response gagal di-serialize. Buffer parsial selalu dibuang.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("buffer limit exceeded: need {needed} bytes, limit is {limit}")]
    BufferExceeded { needed: usize, limit: usize },

    #[error("required field `{0}` was never given a value")]
    MissingRequiredValue(String),

    #[error("field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: WireType,
        actual: WireType,
    },

    #[error("nested attribute handle no longer matches the buffer")]
    StaleNest,
}

/// Setter `Record` ditolak; value dan presence tetap tidak berubah.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: WireType,
        actual: WireType,
    },

    #[error("field `{0}` is required and cannot be cleared")]
    RequiredField(String),
}

/// Kegagalan satu dispatch. Request lain tidak terpengaruh.
///
/// Reply yang gagal di-encode dilaporkan handler sebagai
/// `Handler(Status::UnknownError)` lewat `Call::reply`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("method `{0}` not found")]
    MethodNotFound(String),

    #[error("invalid request: {0}")]
    Decode(#[from] DecodeError),

    #[error("handler returned {0}")]
    Handler(Status),
}

impl DispatchError {
    /// Status code yang dilaporkan transport ke caller
    pub fn status(&self) -> Status {
        match self {
            Self::MethodNotFound(_) => Status::MethodNotFound,
            Self::Decode(_) => Status::InvalidArgument,
            Self::Handler(status) => *status,
        }
    }
}

/// ubus status codes
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok = 0,
    InvalidCommand = 1,
    InvalidArgument = 2,
    MethodNotFound = 3,
    NotFound = 4,
    NoData = 5,
    PermissionDenied = 6,
    Timeout = 7,
    NotSupported = 8,
    UnknownError = 9,
    ConnectionFailed = 10,
    NoMemory = 11,
    ParseError = 12,
    SystemError = 13,
}

impl Status {
    #[inline(always)]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::InvalidCommand),
            2 => Some(Self::InvalidArgument),
            3 => Some(Self::MethodNotFound),
            4 => Some(Self::NotFound),
            5 => Some(Self::NoData),
            6 => Some(Self::PermissionDenied),
            7 => Some(Self::Timeout),
            8 => Some(Self::NotSupported),
            9 => Some(Self::UnknownError),
            10 => Some(Self::ConnectionFailed),
            11 => Some(Self::NoMemory),
            12 => Some(Self::ParseError),
            13 => Some(Self::SystemError),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "success",
            Self::InvalidCommand => "invalid command",
            Self::InvalidArgument => "invalid argument",
            Self::MethodNotFound => "method not found",
            Self::NotFound => "not found",
            Self::NoData => "no response",
            Self::PermissionDenied => "permission denied",
            Self::Timeout => "request timed out",
            Self::NotSupported => "operation not supported",
            Self::UnknownError => "unknown error",
            Self::ConnectionFailed => "connection failed",
            Self::NoMemory => "out of memory",
            Self::ParseError => "parsing message data failed",
            Self::SystemError => "system error",
        };
        write!(f, "{text} ({})", self.code())
    }
}

impl From<DecodeError> for Status {
    fn from(_: DecodeError) -> Self {
        Status::InvalidArgument
    }
}

impl From<EncodeError> for Status {
    fn from(_: EncodeError) -> Self {
        Status::UnknownError
    }
}
