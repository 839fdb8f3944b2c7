use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки кодирования и декодирования записей.
///
/// Делятся на три группы: неподдерживаемые формы значений
/// (`UnsupportedType`, `UnsupportedValue`, несовпадение тегов),
/// некорректный вход (varint, длины, счётчики, глубина) и внутренние
/// ошибки диспетчеризации полей.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("msglib: unsupported type {type_name}: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    #[error("msglib: unsupported value ({type_name}): {message}")]
    UnsupportedValue { type_name: String, message: String },

    #[error(
        "msglib: type mismatch: {record}, field: {field} (id {field_id}), expected {expected}, found {found}"
    )]
    TagMismatch {
        record: &'static str,
        field: &'static str,
        field_id: u32,
        expected: &'static str,
        found: &'static str,
    },

    #[error("msglib: {container} element type mismatch: expected {expected}, found {found}")]
    ElementTagMismatch {
        container: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("msglib: unknown type tag {tag}")]
    UnknownTag { tag: u8 },

    #[error("msglib: invalid {marker} marker: {reason}")]
    InvalidMarker {
        marker: &'static str,
        reason: String,
    },

    #[error("msglib: varint overflows 64 bits")]
    VarintOverflow,

    #[error("msglib: negative length {length}")]
    NegativeLength { length: i64 },

    #[error("msglib: invalid UTF-8 in string: {reason}")]
    InvalidUtf8 { reason: String },

    #[error("msglib: {what} size {size} exceeds limit {limit}")]
    SizeLimit {
        what: &'static str,
        size: u64,
        limit: u64,
    },

    #[error("msglib: declared count {count} cannot fit in {remaining} remaining bytes")]
    CountExceedsInput { count: u64, remaining: u64 },

    #[error("msglib: nesting depth {depth} exceeds limit {max}")]
    DepthLimit { depth: usize, max: usize },

    #[error("msglib: record {record} has no field with id {field_id}")]
    UnknownField { record: &'static str, field_id: u32 },
}

impl CodecError {
    /// Ошибка вызвана содержимым входного потока, а не формой значения.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownTag { .. }
                | Self::InvalidMarker { .. }
                | Self::VarintOverflow
                | Self::NegativeLength { .. }
                | Self::InvalidUtf8 { .. }
                | Self::SizeLimit { .. }
                | Self::CountExceedsInput { .. }
                | Self::DepthLimit { .. }
        )
    }
}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedType { .. } => StatusCode::Unsupported,
            Self::UnsupportedValue { .. } => StatusCode::InvalidValue,
            Self::TagMismatch { .. } | Self::ElementTagMismatch { .. } => StatusCode::TypeError,
            Self::UnknownTag { .. } => StatusCode::InvalidTag,
            Self::InvalidMarker { .. } => StatusCode::InvalidMarker,
            Self::VarintOverflow => StatusCode::InvalidInteger,
            Self::NegativeLength { .. } | Self::CountExceedsInput { .. } => {
                StatusCode::InvalidLength
            }
            Self::InvalidUtf8 { .. } => StatusCode::InvalidUtf8,
            Self::SizeLimit { .. } => StatusCode::SizeLimit,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
            Self::UnknownField { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
