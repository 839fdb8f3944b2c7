use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок кодека (object-safe).
///
/// Даёт статус-код для категоризации и доступ к конкретному типу через
/// [`Any`], чтобы [`StackError`](crate::StackError) мог выполнить downcast.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки.
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`](std::any::Any),
    /// чтобы можно было выполнить downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;
}
