use std::io;
use std::path::PathBuf;

/// Ошибки логгера. Ошибки каталогов и открытия файлов при старте возвращаются
/// вызывающему; при ротации в фоне они фатальны.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("logger already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, Error>;
