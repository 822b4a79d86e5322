use crate::caller::CallerTrace;
use crate::clock::{ClockReading, ClockState};
use crate::error::{Error, Result};
use crate::format::format_record;
use crate::level::LogLevel;
use crate::sink::{FanOut, LogLayout};
use crate::system::SystemReporter;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_BASE_PATH: &str = "./log";
pub const DEFAULT_APP_NAME: &str = "daylog";
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Сколько `panic` ждёт, пока запись уровня PANC дойдёт до файлов.
pub const PANIC_WRITE_GRACE: Duration = Duration::from_secs(1);

// ===== Настройки =====

#[derive(Debug, Clone)]
pub struct Config {
    pub base_path: PathBuf,
    /// Дублировать каждую запись в stdout.
    pub debug: bool,
    /// Имя процесса в системном журнале.
    pub app_name: String,
    /// Период фонового тика часов. `None` — без фонового потока, часы
    /// двигаются вручную через [`Logger::tick_at`].
    pub tick_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            debug: false,
            app_name: DEFAULT_APP_NAME.to_owned(),
            tick_interval: Some(DEFAULT_TICK_INTERVAL),
        }
    }
}

impl Config {
    pub fn quiet<P: Into<PathBuf>>(base_path: P) -> Self {
        Config {
            base_path: base_path.into(),
            ..Config::default()
        }
    }

    pub fn debug<P: Into<PathBuf>>(base_path: P) -> Self {
        Config {
            base_path: base_path.into(),
            debug: true,
            ..Config::default()
        }
    }
}

// ===== Общее состояние =====

struct LoggerContext {
    layout: LogLayout,
    debug: bool,
    state: RwLock<ClockState>,
    reporter: SystemReporter,
}

impl LoggerContext {
    fn snapshot(&self, level: LogLevel) -> (String, Arc<FanOut>) {
        let state = self.state.read();
        (state.timestamp().to_owned(), state.sink(level))
    }

    fn tick_at(&self, now: DateTime<Local>) -> Result<bool> {
        let reading = ClockReading::at(&now);
        let mut state = self.state.write();
        state.advance(&self.layout, reading, self.debug)
    }

    /// Без файлов логгер бесполезен: сообщаем в системный журнал и валим процесс.
    fn fatal(&self, err: &Error) -> ! {
        let msg = format!("log rotation failed, aborting: {}", err);
        self.reporter.report(LogLevel::Panic, &msg);
        eprintln!("[FATAL] {}", msg);
        process::abort();
    }
}

// ===== Фоновый писатель =====

enum Job {
    Record(PendingRecord),
    Flush(Sender<()>),
    Shutdown,
}

/// Всё, что снято синхронно в момент вызова. Время и приёмник не
/// перечитываются при записи.
struct PendingRecord {
    level: LogLevel,
    timestamp: String,
    message: String,
    trace: CallerTrace,
    sink: Arc<FanOut>,
    written: Option<Sender<()>>,
}

impl PendingRecord {
    fn write(self, reporter: &SystemReporter) {
        let frames = self.trace.resolve();
        let bytes = format_record(self.level, &self.timestamp, &self.message, &frames);
        if let Err(e) = self.sink.write_record(&bytes) {
            reporter.report(LogLevel::Error, &e.to_string());
        }
        if let Some(written) = self.written {
            let _ = written.send(());
        }
    }
}

fn run_writer(context: Arc<LoggerContext>, jobs: Receiver<Job>) {
    for job in jobs {
        match job {
            Job::Record(record) => record.write(&context.reporter),
            Job::Flush(done) => {
                let _ = done.send(());
            }
            Job::Shutdown => break,
        }
    }
}

fn run_ticker(context: Weak<LoggerContext>, interval: Duration) {
    loop {
        thread::sleep(interval);
        let Some(context) = context.upgrade() else {
            break;
        };
        if let Err(e) = context.tick_at(Local::now()) {
            context.fatal(&e);
        }
    }
}

// ===== Основной логгер =====

/// Логгер с ежедневной ротацией. Вызовы не блокируются на записи: запись
/// форматируется и пишется фоновым потоком в порядке поступления.
pub struct Logger {
    context: Arc<LoggerContext>,
    config: Config,
    jobs: Sender<Job>,
    worker: Option<JoinHandle<()>>,
}

impl Logger {
    pub fn start(config: Config) -> Result<Self> {
        Self::start_at(config, Local::now())
    }

    /// Как [`Logger::start`], но с заданным начальным временем.
    pub fn start_at(config: Config, now: DateTime<Local>) -> Result<Self> {
        let layout = LogLayout::new(&config.base_path);
        layout.create_dirs()?;
        let state = ClockState::open(&layout, ClockReading::at(&now), config.debug)?;

        let context = Arc::new(LoggerContext {
            layout,
            debug: config.debug,
            state: RwLock::new(state),
            reporter: SystemReporter::connect(&config.app_name),
        });

        let (jobs, rx) = mpsc::channel();
        let worker = {
            let context = Arc::clone(&context);
            thread::Builder::new()
                .name("daylog-writer".to_owned())
                .spawn(move || run_writer(context, rx))
                .map_err(|source| Error::Spawn {
                    name: "writer",
                    source,
                })?
        };

        if let Some(interval) = config.tick_interval {
            let context = Arc::downgrade(&context);
            let spawned = thread::Builder::new()
                .name("daylog-clock".to_owned())
                .spawn(move || run_ticker(context, interval));
            if let Err(source) = spawned {
                let _ = jobs.send(Job::Shutdown);
                let _ = worker.join();
                return Err(Error::Spawn {
                    name: "clock",
                    source,
                });
            }
        }

        Ok(Logger {
            context,
            config,
            jobs,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_path(&self) -> &Path {
        self.context.layout.base()
    }

    /// Текущее время в формате записей.
    pub fn timestamp(&self) -> String {
        self.context.state.read().timestamp().to_owned()
    }

    pub fn day_key(&self) -> String {
        self.context.state.read().day_key().to_owned()
    }

    /// Один тик часов. Возвращает `true`, если файлы сменились на новый день.
    /// Фоновый поток вызывает его сам; вручную нужен при `tick_interval: None`.
    pub fn tick_at(&self, now: DateTime<Local>) -> Result<bool> {
        self.context.tick_at(now)
    }

    pub fn info(&self, message: &str) {
        self.dispatch(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: &str) {
        self.dispatch(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: &str) {
        self.dispatch(LogLevel::Error, message, None);
    }

    /// Пишет запись PANC и паникует с `message`. Ждёт записи не дольше
    /// [`PANIC_WRITE_GRACE`].
    ///
    /// Это обычная паника вызывающего потока. Процесс завершается, только если
    /// она дошла до главного потока: вызов из `thread::spawn` или из задачи
    /// tokio роняет лишь этот поток (задачу), логгер и процесс продолжают
    /// работать.
    pub fn panic(&self, message: &str) -> ! {
        let (written, done) = mpsc::channel();
        self.dispatch(LogLevel::Panic, message, Some(written));
        let _ = done.recv_timeout(PANIC_WRITE_GRACE);
        panic!("{}", message);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Panic => self.panic(message),
            _ => self.dispatch(level, message, None),
        }
    }

    /// Ждёт, пока все поставленные до этого записи будут записаны.
    pub fn flush(&self) {
        let (done, wait) = mpsc::channel();
        if self.jobs.send(Job::Flush(done)).is_ok() {
            let _ = wait.recv();
        }
    }

    fn dispatch(&self, level: LogLevel, message: &str, written: Option<Sender<()>>) {
        let (timestamp, sink) = self.context.snapshot(level);
        let trace = CallerTrace::capture();

        let job = Job::Record(PendingRecord {
            level,
            timestamp,
            message: message.to_owned(),
            trace,
            sink,
            written,
        });
        if self.jobs.send(job).is_err() {
            self.context
                .reporter
                .report(LogLevel::Error, "writer thread is gone, record dropped");
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
