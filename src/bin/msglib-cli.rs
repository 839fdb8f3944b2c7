//! CLI msglib
//!
//! Инструмент командной строки для просмотра закодированных сообщений
//! без знания их схемы: каждое значение разбирается по тегу с провода.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use msglib::{
    dynamic::decode_dynamic_with_config,
    logging::{init_logging, LogFormat, LoggingConfig},
    CodecConfig, DynValue, StackError,
};
use msglib_error::LogLevel;
use tracing::{debug, error, info, warn};

/// Основная структура CLI аргументов
#[derive(Parser)]
#[command(name = "msglib-cli")]
#[command(author = "msglib contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "msglib CLI - inspect encoded messages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Включить подробный вывод (debug)
    #[arg(short, long, global = true, help = "Включить подробный вывод для отладки")]
    verbose: bool,
    /// Подавить логирование полностью
    #[arg(short = 'q', long, global = true, help = "Подавить логирование")]
    quiet: bool,
    /// Формат логов
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        help = "Формат вывода логов"
    )]
    log_format: LogFormatArg,
    /// Подкоманда для выполнения
    #[command(subcommand)]
    command: Commands,
}

/// Формат вывода значения
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Дерево с отступами
    Pretty,
    /// Одна строка
    Line,
    /// JSON формат
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Подкоманды CLI
#[derive(Subcommand)]
enum Commands {
    /// Разобрать сообщение и напечатать его структуру
    #[command(alias = "i")]
    Inspect {
        /// Файл с сообщением или `-` для stdin
        #[arg(help = "Путь к файлу с сообщением ('-' для чтения из stdin)")]
        input: PathBuf,
        /// Формат вывода
        #[arg(
            short,
            long,
            value_enum,
            default_value = "pretty",
            help = "Формат вывода разобранного сообщения"
        )]
        format: OutputFormat,
        /// Лимит глубины вложенности
        #[arg(long, help = "Переопределить максимальную глубину вложенности")]
        max_depth: Option<usize>,
    },
}

/// Точка входа в CLI
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LoggingConfig {
        level: log_level(cli.verbose, cli.quiet).to_string(),
        format: cli.log_format.into(),
        ..LoggingConfig::default()
    };
    if !cli.quiet {
        init_logging(log_config).map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    match handle_command(&cli) {
        Ok(()) => {
            debug!("Команда выполнена успешно");
            Ok(())
        }
        Err(e) => {
            if let Some(err) = codec_error(&e) {
                log_failure(err);
            }
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn log_level(
    verbose: bool,
    quiet: bool,
) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Ошибка кодека в цепочке причин, если она там есть.
fn codec_error(err: &anyhow::Error) -> Option<&StackError> {
    err.chain().find_map(|cause| cause.downcast_ref::<StackError>())
}

/// Пишет ошибку кодека в лог на уровне, который подсказывает её статус.
fn log_failure(err: &StackError) {
    let code = err.status_code();
    match err.log_level() {
        LogLevel::Info => info!(%code, contexts = err.contexts().len(), "{err}"),
        LogLevel::Warn => warn!(%code, contexts = err.contexts().len(), "{err}"),
        LogLevel::Error => error!(%code, contexts = err.contexts().len(), "{err}"),
    }
}

/// Обработчик подкоманд
fn handle_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Inspect {
            input,
            format,
            max_depth,
        } => {
            let mut config = CodecConfig::load().context("Не удалось загрузить настройки кодека")?;
            if let Some(depth) = max_depth {
                config.max_depth = *depth;
            }
            config.validate()?;
            debug!(?config, "Настройки кодека");

            let bytes = read_input(input)?;
            debug!(len = bytes.len(), "Прочитано байт");

            let value = decode_dynamic_with_config(&bytes, &config)
                .with_context(|| format!("Не удалось разобрать {}", input.display()))?;
            println!("{}", render(&value, *format)?);
            Ok(())
        }
    }
}

/// Читает вход целиком из файла или stdin.
fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Не удалось прочитать stdin")?;
        Ok(buf)
    } else {
        fs::read(input).with_context(|| format!("Не удалось прочитать {}", input.display()))
    }
}

fn render(
    value: &DynValue,
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Pretty => value.to_pretty_string(),
        OutputFormat::Line => value.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    })
}
