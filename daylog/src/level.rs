use std::fmt;

// ===== Уровни логгирования =====

/// Уровень записи. Фильтрации по уровню нет: каждый вызов попадает в свой файл
/// и в общий `app`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Panic,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Panic,
    ];

    /// Четырёхсимвольная метка в начале записи.
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "EROR",
            LogLevel::Panic => "PANC",
        }
    }

    /// Подкаталог уровня относительно базового пути.
    pub fn dir_name(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Panic => "panic",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            LogLevel::Info => 0,
            LogLevel::Warn => 1,
            LogLevel::Error => 2,
            LogLevel::Panic => 3,
        }
    }

    #[cfg(target_os = "linux")]
    pub(crate) fn to_syslog_level(self) -> syslog::Severity {
        use syslog::Severity::*;
        match self {
            LogLevel::Info => LOG_INFO,
            LogLevel::Warn => LOG_WARNING,
            LogLevel::Error => LOG_ERR,
            LogLevel::Panic => LOG_CRIT,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_four_characters() {
        for level in LogLevel::ALL {
            assert_eq!(level.tag().len(), 4, "{:?}", level);
        }
        assert_eq!(LogLevel::Error.tag(), "EROR");
        assert_eq!(LogLevel::Panic.tag(), "PANC");
    }

    #[test]
    fn dir_names_match_levels() {
        let dirs: Vec<_> = LogLevel::ALL.iter().map(|l| l.dir_name()).collect();
        assert_eq!(dirs, ["info", "warn", "error", "panic"]);
    }

    #[test]
    fn index_follows_all_order() {
        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }

    #[test]
    fn display_renders_tag() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }
}
