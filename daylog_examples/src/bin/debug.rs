// example_debug — каждая запись дублируется в stdout, в конце PANC роняет процесс

use daylog::{gfatal, ginfo, gwarn};

fn load_config(path: &str) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn main() {
    daylog::set_base_path("logs/debug");
    if let Err(e) = daylog::start_debug() {
        eprintln!("[FATAL] Cannot initialize logger: {}. Exiting.", e);
        std::process::exit(1);
    }

    ginfo!("Debug mode: lines below are also in logs/debug/*/");

    let path = "does-not-exist.toml";
    match load_config(path) {
        Some(cfg) => ginfo!("Loaded {} bytes of config", cfg.len()),
        None => {
            gwarn!("Config {} not found", path);
            // Запись PANC попадёт в panic/ и app/, затем процесс упадёт
            gfatal!("Cannot continue without {}", path);
        }
    }
}
