// Зеркало в stdout: запускаем этот же бинарник дочерним процессом и сравниваем
// его stdout с общим файлом дня. Без libtest, чтобы в stdout не было ничего,
// кроме записей логгера.

use chrono::{Local, TimeZone};
use daylog::{Config, Logger};
use std::env;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const MODE_VAR: &str = "DAYLOG_MIRROR_MODE";
const BASE_VAR: &str = "DAYLOG_MIRROR_BASE";
const DAY: &str = "20240101";

fn main() {
    match (env::var(MODE_VAR), env::var(BASE_VAR)) {
        (Ok(mode), Ok(base)) => run_child(&mode, Path::new(&base)),
        _ => {
            debug_mirrors_every_record();
            quiet_writes_nothing_to_stdout();
            println!("stdout_mirror: ok");
        }
    }
}

fn run_child(mode: &str, base: &Path) {
    let config = match mode {
        "debug" => Config::debug(base),
        _ => Config::quiet(base),
    };
    let config = Config {
        tick_interval: None,
        ..config
    };
    let now = Local.with_ymd_and_hms(2024, 1, 1, 7, 30, 0).single().unwrap();
    let logger = Logger::start_at(config, now).unwrap();

    logger.info("service up");
    logger.warn("cache cold");
    logger.error("upstream timeout");
    logger.info("service down");
    logger.flush();
}

fn spawn_child(mode: &str, base: &Path) -> Output {
    let output = Command::new(env::current_exe().unwrap())
        .env(MODE_VAR, mode)
        .env(BASE_VAR, base)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "child failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn read(base: &Path, dir: &str) -> Vec<u8> {
    fs::read(base.join(dir).join(format!("{}.log", DAY))).unwrap()
}

fn debug_mirrors_every_record() {
    let tmp = tempfile::tempdir().unwrap();
    let output = spawn_child("debug", tmp.path());

    let app = read(tmp.path(), "app");
    assert!(!app.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&app),
        "stdout differs from app file"
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    for dir in ["info", "warn", "error"] {
        let level = String::from_utf8(read(tmp.path(), dir)).unwrap();
        assert!(!level.is_empty(), "{}", dir);
        assert!(level.lines().all(|l| stdout.contains(l)), "{}", dir);
    }
    assert!(stdout.starts_with("[INFO] 2024/01/01 07:30:00 service up\n"), "{}", stdout);
}

fn quiet_writes_nothing_to_stdout() {
    let tmp = tempfile::tempdir().unwrap();
    let output = spawn_child("quiet", tmp.path());

    assert!(output.stdout.is_empty(), "{}", String::from_utf8_lossy(&output.stdout));
    let app = String::from_utf8(read(tmp.path(), "app")).unwrap();
    assert_eq!(app.lines().filter(|l| !l.starts_with("[LINE] ")).count(), 4);
}
