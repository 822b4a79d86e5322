use crate::caller::CallerFrame;
use crate::level::LogLevel;
use std::io::Write;

/// Собирает одну запись:
///
/// ```text
/// [INFO] 2024/01/01 12:00:00 message
/// [LINE] src/main.rs:10
/// ```
///
/// По строке `[LINE]` на каждый кадр, ближайший вызывающий первым.
pub(crate) fn format_record(
    level: LogLevel,
    timestamp: &str,
    message: &str,
    frames: &[CallerFrame],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 + timestamp.len() + message.len() + frames.len() * 64);
    // Запись в Vec не падает.
    let _ = writeln!(buf, "[{}] {} {}", level.tag(), timestamp, message);
    for frame in frames {
        let _ = writeln!(buf, "[LINE] {}:{}", frame.file, frame.line);
    }
    buf
}
