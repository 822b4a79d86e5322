//! # daylog
//!
//! Логгер уровней INFO/WARN/EROR/PANC с ежедневными файлами:
//!
//! ```text
//! <base>/app/YYYYMMDD.log     все уровни
//! <base>/info/YYYYMMDD.log
//! <base>/warn/YYYYMMDD.log
//! <base>/error/YYYYMMDD.log
//! <base>/panic/YYYYMMDD.log
//! ```
//!
//! Каждая запись содержит цепочку мест вызова (`[LINE] file:line`). В режиме
//! отладки записи дублируются в stdout.

mod caller;
mod clock;
mod error;
mod format;
mod level;
mod logger;
mod sink;
mod system;

pub use error::{Error, Result};
pub use level::LogLevel;
pub use logger::{
    Config, Logger, DEFAULT_APP_NAME, DEFAULT_BASE_PATH, DEFAULT_TICK_INTERVAL, PANIC_WRITE_GRACE,
};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::path::PathBuf;

// ===== Макросы =====

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.info(&format!($($arg)*));
    }};
}
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.warn(&format!($($arg)*));
    }};
}
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.error(&format!($($arg)*));
    }};
}
/// Уровень PANC: пишет запись и паникует.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)*) => {{
        $logger.panic(&format!($($arg)*))
    }};
}

// ===== Глобальные макросы =====

#[macro_export]
macro_rules! ginfo {
    ($($arg:tt)*) => {{
        $crate::info(&format!($($arg)*));
    }};
}
#[macro_export]
macro_rules! gwarn {
    ($($arg:tt)*) => {{
        $crate::warn(&format!($($arg)*));
    }};
}
#[macro_export]
macro_rules! gerror {
    ($($arg:tt)*) => {{
        $crate::error(&format!($($arg)*));
    }};
}
#[macro_export]
macro_rules! gfatal {
    ($($arg:tt)*) => {{
        $crate::panic(&format!($($arg)*))
    }};
}

// ===== Глобальный логгер =====

static BASE_PATH: Lazy<Mutex<PathBuf>> =
    Lazy::new(|| Mutex::new(PathBuf::from(DEFAULT_BASE_PATH)));

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Задаёт корень для логов. Действует только до `start_quiet`/`start_debug`.
pub fn set_base_path<P: Into<PathBuf>>(path: P) {
    *BASE_PATH.lock() = path.into();
}

/// Запуск без вывода в stdout.
pub fn start_quiet() -> Result<()> {
    start_global(false)
}

/// Запуск с дублированием записей в stdout.
pub fn start_debug() -> Result<()> {
    start_global(true)
}

fn start_global(debug: bool) -> Result<()> {
    if GLOBAL_LOGGER.get().is_some() {
        return Err(Error::AlreadyStarted);
    }
    let config = Config {
        base_path: BASE_PATH.lock().clone(),
        debug,
        ..Config::default()
    };
    let logger = Logger::start(config)?;
    GLOBAL_LOGGER.set(logger).map_err(|_| Error::AlreadyStarted)
}

/// Глобальный логгер, если он запущен.
pub fn logger() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

// До запуска вызовы молча игнорируются, кроме `panic`.

pub fn info(message: &str) {
    if let Some(logger) = logger() {
        logger.info(message);
    }
}

pub fn warn(message: &str) {
    if let Some(logger) = logger() {
        logger.warn(message);
    }
}

pub fn error(message: &str) {
    if let Some(logger) = logger() {
        logger.error(message);
    }
}

/// Пишет запись PANC и паникует. Как и [`Logger::panic`], вне главного потока
/// роняет только текущий поток или задачу, а не процесс.
pub fn panic(message: &str) -> ! {
    match logger() {
        Some(logger) => logger.panic(message),
        None => panic!("{}", message),
    }
}

/// Дожидается записи всего, что уже поставлено в очередь.
pub fn flush() {
    if let Some(logger) = logger() {
        logger.flush();
    }
}
