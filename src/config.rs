//! Лимиты кодека и загрузка настроек.
//!
//! Значения по умолчанию достаточно велики для любого реального сообщения,
//! но не позволяют некорректному входу заставить декодер выделить память
//! под заявленный, а не фактический размер.

use ::config::{Config, ConfigError, Environment};
use msglib_error::{CodecError, MsgResult};
use serde::{Deserialize, Serialize};

/// Префикс переменных окружения (`MSGLIB_MAX_DEPTH=32` и т.п.).
pub const ENV_PREFIX: &str = "MSGLIB";

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_COLLECTION_LEN: u64 = 16 * 1024 * 1024;
pub const DEFAULT_MAX_BINARY_LEN: u64 = 64 * 1024 * 1024;
pub const DEFAULT_PREALLOCATE_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Максимальная вложенность структур и контейнеров при чтении.
    pub max_depth: usize,
    /// Максимальное заявленное кол-во элементов словаря/списка/множества.
    pub max_collection_len: u64,
    /// Максимальная длина Binary/String.
    pub max_binary_len: u64,
    /// Заявленные счётчики больше этого значения не используются для
    /// предварительного выделения памяти.
    pub preallocate_limit: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_binary_len: DEFAULT_MAX_BINARY_LEN,
            preallocate_limit: DEFAULT_PREALLOCATE_LIMIT,
        }
    }
}

impl CodecConfig {
    /// Загружает конфигурацию: значения по умолчанию, поверх них
    /// переменные окружения с префиксом `MSGLIB_`.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("max_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default("max_collection_len", DEFAULT_MAX_COLLECTION_LEN)?
            .set_default("max_binary_len", DEFAULT_MAX_BINARY_LEN)?
            .set_default("preallocate_limit", DEFAULT_PREALLOCATE_LIMIT as u64)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    /// Проверяет, что ни один лимит не равен нулю.
    ///
    /// `preallocate_limit = 0` допустим: предварительное выделение
    /// просто отключается.
    pub fn validate(&self) -> MsgResult<()> {
        let checks: [(&str, u64); 3] = [
            ("max_depth", self.max_depth as u64),
            ("max_collection_len", self.max_collection_len),
            ("max_binary_len", self.max_binary_len),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(CodecError::UnsupportedValue {
                    type_name: "CodecConfig".to_string(),
                    message: format!("{name} must be greater than zero"),
                }
                .into());
            }
        }
        Ok(())
    }
}
