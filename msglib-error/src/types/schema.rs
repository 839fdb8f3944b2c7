use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки построения схемы записи.
///
/// Возникают один раз, при первом обращении к типу, и означают, что
/// описание полей нельзя отобразить на протокол.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("msglib: {record}.{field}: field id must be positive")]
    InvalidFieldId {
        record: &'static str,
        field: &'static str,
    },

    #[error("msglib: {record}: field id {field_id} used by both {first} and {second}")]
    DuplicateFieldId {
        record: &'static str,
        field_id: u32,
        first: &'static str,
        second: &'static str,
    },

    #[error("msglib: {record}.{field}: `set` requires a map, list or set shape, found {found}")]
    InvalidSetOverride {
        record: &'static str,
        field: &'static str,
        found: &'static str,
    },

    #[error("msglib: {record}.{field}: shape has no wire representation")]
    NullFieldTag {
        record: &'static str,
        field: &'static str,
    },
}

impl ErrorExt for SchemaError {
    fn status_code(&self) -> StatusCode {
        StatusCode::Unsupported
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
