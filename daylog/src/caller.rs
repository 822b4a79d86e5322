//! Сбор цепочки вызовов для строк `[LINE]`.
//!
//! Стек снимается синхронно в потоке вызывающего (только адреса), а символы
//! разрешаются уже в фоновом писателе: адреса остаются валидными, а сам стек
//! из другого потока обходить нельзя.

use backtrace::Backtrace;
use std::path::Path;

const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
const BACKTRACE_PREFIX: &str = "backtrace::";

/// Место вызова: файл и строка.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallerFrame {
    pub(crate) file: String,
    pub(crate) line: u32,
}

/// Неразрешённый снимок стека, сделанный в момент вызова логгера.
pub(crate) struct CallerTrace(Backtrace);

impl CallerTrace {
    #[inline(never)]
    pub(crate) fn capture() -> Self {
        CallerTrace(Backtrace::new_unresolved())
    }

    /// Разрешает символы и возвращает кадры от непосредственного вызывающего
    /// наружу, к корню стека.
    pub(crate) fn resolve(mut self) -> Vec<CallerFrame> {
        self.0.resolve();
        let symbols: Vec<RawSymbol<'_>> = self
            .0
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .map(|symbol| RawSymbol {
                name: symbol.name().map(|name| format!("{:#}", name)),
                file: symbol.filename(),
                line: symbol.lineno(),
            })
            .collect();
        collect_frames(&symbols)
    }
}

struct RawSymbol<'a> {
    name: Option<String>,
    file: Option<&'a Path>,
    line: Option<u32>,
}

impl RawSymbol<'_> {
    fn starts_with(&self, prefix: &str) -> bool {
        self.name
            .as_deref()
            .map(|name| name.trim_start_matches('<').starts_with(prefix))
            .unwrap_or(false)
    }

    fn is_own(&self) -> bool {
        self.starts_with(CRATE_PREFIX)
    }

    fn is_capture_machinery(&self) -> bool {
        self.name.is_none() || self.starts_with(BACKTRACE_PREFIX)
    }
}

fn collect_frames(symbols: &[RawSymbol<'_>]) -> Vec<CallerFrame> {
    // Пропускаем машинерию снимка и собственные кадры логгера: первым должен
    // идти тот, кто вызвал точку входа.
    let start = match symbols.iter().position(RawSymbol::is_own) {
        Some(first) => symbols[first..]
            .iter()
            .position(|s| !s.is_own())
            .map_or(symbols.len(), |n| first + n),
        None => symbols
            .iter()
            .position(|s| !s.is_capture_machinery())
            .unwrap_or(symbols.len()),
    };

    symbols[start..]
        .iter()
        .filter_map(|symbol| match (symbol.file, symbol.line) {
            (Some(file), Some(line)) => Some(CallerFrame {
                file: file.display().to_string(),
                line,
            }),
            _ => None,
        })
        .collect()
}
