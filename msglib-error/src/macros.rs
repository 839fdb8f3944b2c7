/// Немедленно возвращает ошибку, обёрнутую в `StackError`.
///
/// ```ignore
/// use msglib_error::{bail, CodecError};
///
/// fn check_len(len: i64) -> msglib_error::MsgResult<usize> {
///     if len < 0 {
///         bail!(CodecError::NegativeLength { length: len });
///     }
///     Ok(len as usize)
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::StackError::from($err))
    };
}

/// Проверяет условие и вызывает `bail!`, если условие ложно.
///
/// Ошибка вычисляется только при ложном условии.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            $crate::bail!($err);
        }
    };
}

/// Трейт-расширение для `Result`, добавляющее методы контекстирования.
pub trait ResultExt<T> {
    /// Если `self` — `Err`, оборачивает ошибку в `StackError` и добавляет
    /// контекст.
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>;

    /// Ленивый контекст: строка формируется только в случае ошибки.
    fn with_context<C, F>(
        self,
        f: F,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<crate::StackError>,
{
    #[track_caller]
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
    {
        self.map_err(|e| e.into().context(ctx))
    }

    #[track_caller]
    fn with_context<C, F>(
        self,
        f: F,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().context(f()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
