use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Формат вывода логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный, для разработки
    Pretty,
    /// Однострочный
    #[default]
    Compact,
    /// Структурированный JSON
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Конфигурация логирования для бинарника.
///
/// Библиотека сама subscriber не устанавливает.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            with_target: false,
            with_ansi: true,
        }
    }
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl LoggingConfig {
    /// Применяет `MSGLIB_LOG_LEVEL` и `MSGLIB_LOG_FORMAT`, если они заданы.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("MSGLIB_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("MSGLIB_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("Ignoring MSGLIB_LOG_FORMAT: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let level = self.level.to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "invalid log level '{}', expected one of: {}",
                self.level,
                LEVELS.join(", ")
            ));
        }
        Ok(())
    }

    /// Директива для `EnvFilter`: уровень применяется к нашим крейтам,
    /// остальное ограничено `warn`.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        format!("warn,msglib={level},msglib_cli={level}")
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = LoggingConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.format, LogFormat::Compact);
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let cfg = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().contains("loud"));
    }

    #[test]
    fn test_filter_directive_targets_our_crates() {
        let cfg = LoggingConfig {
            level: "DEBUG".to_string(),
            ..Default::default()
        };
        assert_eq!(
            cfg.build_filter_directive(),
            "warn,msglib=debug,msglib_cli=debug"
        );
    }

    /// Тест проверяет разбор формата из строки без учёта регистра.
    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("MSGLIB_LOG_LEVEL", "trace");
        env::set_var("MSGLIB_LOG_FORMAT", "json");

        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.level, "trace");
        assert_eq!(cfg.format, LogFormat::Json);

        env::remove_var("MSGLIB_LOG_LEVEL");
        env::remove_var("MSGLIB_LOG_FORMAT");
    }
}
