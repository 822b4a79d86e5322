// ===== Системный журнал (платформозависимо) =====
//
// Сюда уходят сбои самого логгера: ошибки записи и фатальные ошибки ротации.
// Если системный журнал недоступен, пишем в stderr.

use crate::level::LogLevel;

#[cfg(target_os = "linux")]
type SystemLogger = syslog::Logger<syslog::LoggerBackend, syslog::Formatter3164>;

pub(crate) struct SystemReporter {
    #[cfg(target_os = "linux")]
    logger: Option<parking_lot::Mutex<SystemLogger>>,
}

impl SystemReporter {
    #[cfg(target_os = "linux")]
    pub(crate) fn connect(app_name: &str) -> Self {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_USER,
            hostname: None,
            process: app_name.to_owned(),
            pid: std::process::id(),
        };
        SystemReporter {
            logger: syslog::unix(formatter).ok().map(parking_lot::Mutex::new),
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub(crate) fn connect(_app_name: &str) -> Self {
        SystemReporter {}
    }

    pub(crate) fn report(&self, level: LogLevel, msg: &str) {
        if !self.report_to_system(level, msg) {
            eprintln!("[{}] daylog: {}", level.tag(), msg);
        }
    }

    #[cfg(target_os = "linux")]
    fn report_to_system(&self, level: LogLevel, msg: &str) -> bool {
        use syslog::Severity::*;

        let Some(ref logger) = self.logger else {
            return false;
        };
        let mut logger = logger.lock();
        let res = match level.to_syslog_level() {
            LOG_CRIT => logger.crit(msg),
            LOG_ERR => logger.err(msg),
            LOG_WARNING => logger.warning(msg),
            _ => logger.info(msg),
        };
        res.is_ok()
    }

    #[cfg(not(target_os = "linux"))]
    fn report_to_system(&self, _level: LogLevel, _msg: &str) -> bool {
        false
    }
}
