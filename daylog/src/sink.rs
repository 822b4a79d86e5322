use crate::error::{Error, Result};
use crate::level::LogLevel;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Каталог общего файла, в который дублируются все уровни.
pub(crate) const APP_DIR: &str = "app";

// ===== Раскладка на диске =====

/// `<base>/{app,info,warn,error,panic}/YYYYMMDD.log`
#[derive(Debug, Clone)]
pub(crate) struct LogLayout {
    base: PathBuf,
}

impl LogLayout {
    pub(crate) fn new<P: Into<PathBuf>>(base: P) -> Self {
        LogLayout { base: base.into() }
    }

    pub(crate) fn base(&self) -> &Path {
        &self.base
    }

    pub(crate) fn dir_names() -> [&'static str; 5] {
        [
            APP_DIR,
            LogLevel::Info.dir_name(),
            LogLevel::Warn.dir_name(),
            LogLevel::Error.dir_name(),
            LogLevel::Panic.dir_name(),
        ]
    }

    /// Создаёт все пять каталогов. Существующие файлы не трогаются.
    pub(crate) fn create_dirs(&self) -> Result<()> {
        for name in Self::dir_names() {
            let path = self.base.join(name);
            fs::create_dir_all(&path).map_err(|source| Error::CreateDir { path, source })?;
        }
        Ok(())
    }

    pub(crate) fn file_path(&self, dir: &str, day_key: &str) -> PathBuf {
        self.base.join(dir).join(format!("{}.log", day_key))
    }
}

// ===== Приёмники =====

struct LogFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFile {
    fn open(path: PathBuf) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o666);
        }

        match options.open(&path) {
            Ok(file) => Ok(LogFile {
                path,
                file: Mutex::new(file),
            }),
            Err(source) => Err(Error::OpenFile { path, source }),
        }
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.file.lock().write_all(bytes)
    }
}

enum Target {
    File(Arc<LogFile>),
    Stdout,
}

impl Target {
    fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let res = match self {
            Target::File(file) => file.write_all(bytes),
            Target::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes).and_then(|_| out.flush())
            }
        };
        res.map_err(|source| Error::Write {
            target: self.describe(),
            source,
        })
    }

    fn describe(&self) -> String {
        match self {
            Target::File(file) => file.path.display().to_string(),
            Target::Stdout => "<stdout>".to_owned(),
        }
    }
}

/// Пишет одну запись сразу в несколько приёмников. Каждый приёмник
/// сериализован своим мьютексом, поэтому строки не перемешиваются.
pub(crate) struct FanOut {
    targets: Vec<Target>,
}

impl FanOut {
    /// Пишет во все приёмники, даже если какой-то из них упал; возвращает
    /// первую ошибку.
    pub(crate) fn write_record(&self, bytes: &[u8]) -> Result<()> {
        let mut first_err = None;
        for target in &self.targets {
            if let Err(e) = target.write_all(bytes) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn to_files(paths: &[PathBuf]) -> Result<Self> {
        let targets = paths
            .iter()
            .map(|path| LogFile::open(path.clone()).map(|f| Target::File(Arc::new(f))))
            .collect::<Result<Vec<_>>>()?;
        Ok(FanOut { targets })
    }

    #[cfg(test)]
    fn mirrors_stdout(&self) -> bool {
        self.targets.iter().any(|t| matches!(t, Target::Stdout))
    }
}

// ===== Набор приёмников на один день =====

/// Приёмники всех уровней за один день. Не меняется после создания: при смене
/// дня заменяется целиком.
pub(crate) struct DestinationSet {
    day_key: String,
    sinks: [Arc<FanOut>; 4],
}

impl DestinationSet {
    pub(crate) fn open(layout: &LogLayout, day_key: &str, debug: bool) -> Result<Self> {
        let app = Arc::new(LogFile::open(layout.file_path(APP_DIR, day_key))?);

        let open_sink = |level: LogLevel| -> Result<Arc<FanOut>> {
            let own = LogFile::open(layout.file_path(level.dir_name(), day_key))?;
            let mut targets = vec![Target::File(Arc::clone(&app)), Target::File(Arc::new(own))];
            if debug {
                targets.push(Target::Stdout);
            }
            Ok(Arc::new(FanOut { targets }))
        };

        Ok(DestinationSet {
            day_key: day_key.to_owned(),
            sinks: [
                open_sink(LogLevel::Info)?,
                open_sink(LogLevel::Warn)?,
                open_sink(LogLevel::Error)?,
                open_sink(LogLevel::Panic)?,
            ],
        })
    }

    pub(crate) fn day_key(&self) -> &str {
        &self.day_key
    }

    pub(crate) fn sink(&self, level: LogLevel) -> &Arc<FanOut> {
        &self.sinks[level.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(layout: &LogLayout, dir: &str, day: &str) -> String {
        fs::read_to_string(layout.file_path(dir, day)).unwrap()
    }

    #[test]
    fn create_dirs_builds_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path());
        layout.create_dirs().unwrap();
        for name in LogLayout::dir_names() {
            assert!(tmp.path().join(name).is_dir(), "{}", name);
        }
    }

    #[test]
    fn create_dirs_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path());
        layout.create_dirs().unwrap();
        fs::write(layout.file_path("info", "20240101"), "old\n").unwrap();

        layout.create_dirs().unwrap();
        let set = DestinationSet::open(&layout, "20240101", false).unwrap();
        set.sink(LogLevel::Info).write_record(b"new\n").unwrap();

        assert_eq!(read(&layout, "info", "20240101"), "old\nnew\n");
    }

    #[test]
    fn create_dirs_fails_on_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("base");
        fs::write(&base, "not a dir").unwrap();
        let err = LogLayout::new(&base).create_dirs().unwrap_err();
        assert!(matches!(err, Error::CreateDir { .. }));
    }

    #[test]
    fn file_path_uses_day_key() {
        let layout = LogLayout::new("/var/log/app");
        assert_eq!(
            layout.file_path("warn", "20240229"),
            PathBuf::from("/var/log/app/warn/20240229.log")
        );
    }

    #[test]
    fn level_sink_writes_level_and_app_files() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path());
        layout.create_dirs().unwrap();
        let set = DestinationSet::open(&layout, "20240101", false).unwrap();

        set.sink(LogLevel::Warn).write_record(b"w\n").unwrap();
        set.sink(LogLevel::Error).write_record(b"e\n").unwrap();

        assert_eq!(set.day_key(), "20240101");
        assert_eq!(read(&layout, "warn", "20240101"), "w\n");
        assert_eq!(read(&layout, "error", "20240101"), "e\n");
        assert_eq!(read(&layout, "info", "20240101"), "");
        assert_eq!(read(&layout, APP_DIR, "20240101"), "w\ne\n");
    }

    #[test]
    fn stdout_mirror_only_in_debug() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path());
        layout.create_dirs().unwrap();

        let quiet = DestinationSet::open(&layout, "20240101", false).unwrap();
        let debug = DestinationSet::open(&layout, "20240101", true).unwrap();
        for level in LogLevel::ALL {
            assert!(!quiet.sink(level).mirrors_stdout());
            assert!(debug.sink(level).mirrors_stdout());
        }
    }

    #[test]
    fn open_fails_without_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path().join("missing"));
        let err = DestinationSet::open(&layout, "20240101", false).err().unwrap();
        assert!(matches!(err, Error::OpenFile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn files_are_not_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let layout = LogLayout::new(tmp.path());
        layout.create_dirs().unwrap();
        DestinationSet::open(&layout, "20240101", false).unwrap();

        let mode = fs::metadata(layout.file_path("info", "20240101"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0);
        assert_ne!(mode & 0o600, 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_target_does_not_stop_the_others() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.log");
        let fan = FanOut::to_files(&[PathBuf::from("/dev/full"), good.clone()]).unwrap();

        let err = fan.write_record(b"x\n").unwrap_err();
        match err {
            Error::Write { ref target, ref source } => {
                assert_eq!(target, "/dev/full");
                assert_eq!(source.raw_os_error(), Some(28), "{}", err);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(fs::read_to_string(&good).unwrap(), "x\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn first_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.log");
        let fan = FanOut::to_files(&[good.clone(), PathBuf::from("/dev/full")]).unwrap();

        assert!(matches!(fan.write_record(b"y\n"), Err(Error::Write { .. })));
        assert_eq!(fs::read_to_string(&good).unwrap(), "y\n");
    }
}
