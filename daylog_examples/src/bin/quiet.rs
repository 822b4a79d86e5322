// example_quiet — глобальный логгер без вывода в stdout

use daylog::{gerror, ginfo, gwarn};

const APP_NAME: &str = "example_quiet";
const APP_VERSION: &str = "1.0.0";

fn main() {
    // 1. Инициализация: каталоги и файлы текущего дня
    daylog::set_base_path("logs/quiet");
    if let Err(e) = daylog::start_quiet() {
        eprintln!("[FATAL] Cannot initialize logger: {}. Exiting.", e);
        std::process::exit(1);
    }

    ginfo!("Starting {} v{}", APP_NAME, APP_VERSION);

    // 2. Основной код — только в файлы
    ginfo!("Processing data block #1");
    gwarn!("Non-critical issue detected");
    gerror!("An error occurred, but we continue");
    ginfo!("Processing data block #2");

    // 3. Финальная часть: записи пишутся фоном, дожидаемся их
    ginfo!("Application finished successfully");
    daylog::flush();
}
