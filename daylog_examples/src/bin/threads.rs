// example_threads — потоки пишут через смену суток
// Часы двигаются вручную: половина пачек уходит во "вчера", затем tick_at
// переключает файлы, и вторая половина ложится в файлы сегодняшнего дня.

use chrono::{Duration, Local};
use daylog::{error, info, warn, Config, Logger};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

const SHARDS: u32 = 3;
const BATCHES: u32 = 4;

// Поток-загрузчик одного шарда
struct Ingestor {
    shard: u32,
    log: Arc<Logger>,
    midnight: Arc<Barrier>,
}

impl Ingestor {
    fn run(&self) {
        for batch in 0..BATCHES {
            // Все потоки ждут, пока main переведёт часы
            if batch == BATCHES / 2 {
                self.midnight.wait();
                self.midnight.wait();
            }
            let day = self.log.day_key();
            info!(self.log, "shard {} batch {} stored on day {}", self.shard, batch, day);
            if batch == 1 && self.shard == 0 {
                warn!(self.log, "shard {} lagging before midnight", self.shard);
            }
        }
        if self.shard == SHARDS - 1 {
            error!(self.log, "shard {} lost its replica after rollover", self.shard);
        }
    }
}

fn count_records(path: &std::path::Path) -> usize {
    fs::read_to_string(path)
        .map(|text| text.lines().filter(|l| !l.starts_with("[LINE] ")).count())
        .unwrap_or(0)
}

fn main() {
    let yesterday = Local::now() - Duration::days(1);
    let config = Config {
        tick_interval: None,
        ..Config::quiet("logs/threads")
    };
    let logger = match Logger::start_at(config, yesterday) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}. Exiting.", e);
            std::process::exit(1);
        }
    };
    let old_day = logger.day_key();

    let midnight = Arc::new(Barrier::new(SHARDS as usize + 1));
    let handles: Vec<_> = (0..SHARDS)
        .map(|shard| {
            let ingestor = Ingestor {
                shard,
                log: Arc::clone(&logger),
                midnight: Arc::clone(&midnight),
            };
            thread::spawn(move || ingestor.run())
        })
        .collect();

    // Первая половина пачек записана — переводим часы на сегодня
    midnight.wait();
    match logger.tick_at(Local::now()) {
        Ok(rotated) => info!(logger, "clock advanced, rotated={}", rotated),
        Err(e) => {
            eprintln!("[FATAL] Rotation failed: {}", e);
            std::process::exit(1);
        }
    }
    midnight.wait();

    for h in handles {
        let _ = h.join();
    }
    logger.flush();

    let new_day = logger.day_key();
    for day in [&old_day, &new_day] {
        let path = logger.base_path().join("app").join(format!("{}.log", day));
        println!("{}: {} records", path.display(), count_records(&path));
    }
}
