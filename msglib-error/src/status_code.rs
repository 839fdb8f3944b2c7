use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок кодека.
///
/// # Диапазоны:
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных и схемы
/// - 6xxx: IO
/// - 8xxx: Ошибки разбора входного потока
///
/// `num_enum::TryFromPrimitive` даёт `TryFrom<u32>`; `strum` подключается
/// опционально (feature = "strum").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Общие ошибки ===
    Unsupported = 1001,
    Internal = 1003,

    // === 2xxx: Ошибки данных ===
    TypeError = 2002,
    InvalidValue = 2004,
    InvalidData = 2009,

    // === 6xxx: IO ===
    Io = 6000,
    UnexpectedEof = 6007,

    // === 8xxx: Разбор входа ===
    InvalidMarker = 8000,
    InvalidTag = 8001,
    InvalidUtf8 = 8004,
    InvalidInteger = 8005,
    SizeLimit = 8007,
    DepthLimit = 8008,
    InvalidLength = 8012,
}

/// Уровень, на котором вызывающему стоит записать ошибку в лог.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Ошибка разбора входного потока (диапазон 8xxx) или обрыв данных.
    pub fn is_protocol_error(&self) -> bool {
        (8000..=8999).contains(&self.code()) || matches!(self, Self::UnexpectedEof)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    ///
    /// Несовпадение формы значения и схемы ожидаемо при эволюции схем,
    /// повреждённый вход заслуживает предупреждения, остальное ошибка.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::TypeError | Self::InvalidValue | Self::Unsupported => LogLevel::Info,
            _ if self.is_protocol_error() => LogLevel::Warn,
            Self::InvalidData => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
