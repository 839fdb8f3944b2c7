pub mod codec;
pub mod schema;

// Публичный экспорт всех типов ошибок из вложенных модулей.
pub use codec::*;
pub use schema::*;

use std::io;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Сбой приёмника или источника байтов.
///
/// Исходная `io::Error` хранится целиком: вызывающий может выполнить
/// downcast к `IoError` и прочитать её `kind()`.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct IoError {
    inner: io::Error,
}

impl IoError {
    pub fn kind(&self) -> io::ErrorKind {
        self.inner.kind()
    }

    /// Исходная ошибка ввода-вывода.
    pub fn io_error(&self) -> &io::Error {
        &self.inner
    }
}

impl ErrorExt for IoError {
    fn status_code(&self) -> StatusCode {
        match self.inner.kind() {
            io::ErrorKind::UnexpectedEof => StatusCode::UnexpectedEof,
            io::ErrorKind::InvalidData => StatusCode::InvalidData,
            _ => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Конвертация из std::io::Error: сбой приёмника/источника байтов
/// передаётся без изменений, по его виду выбирается только статус-код.
impl From<io::Error> for crate::StackError {
    #[track_caller]
    fn from(inner: io::Error) -> Self {
        crate::StackError::new(IoError { inner })
    }
}

/// Конвертация из std::str::Utf8Error
impl From<std::str::Utf8Error> for crate::StackError {
    fn from(err: std::str::Utf8Error) -> Self {
        crate::StackError::new(CodecError::InvalidUtf8 {
            reason: err.to_string(),
        })
    }
}

/// Конвертация из std::string::FromUtf8Error
impl From<std::string::FromUtf8Error> for crate::StackError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        crate::StackError::new(CodecError::InvalidUtf8 {
            reason: err.to_string(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
