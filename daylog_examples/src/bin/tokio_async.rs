// example_tokio — логгер из задач tokio
// Вызовы не ждут диска; flush блокирующий, поэтому уходит в spawn_blocking.
// PANC внутри задачи роняет только эту задачу, рантайм продолжает работу.

use daylog::{fatal, info, warn, Config, Logger};
use std::sync::Arc;
use tokio::task;
use tokio::time::{interval, sleep, Duration};

async fn handle_request(id: u32, log: Arc<Logger>) -> u32 {
    let latency = 40 + id * 30;
    sleep(Duration::from_millis(latency as u64)).await;
    if latency > 120 {
        warn!(log, "request {} slow: {} ms", id, latency);
    } else {
        info!(log, "request {} served in {} ms", id, latency);
    }
    latency
}

// Фоновое сердцебиение: видно, как фоновый тик двигает время записей
async fn heartbeat(log: Arc<Logger>) {
    let mut every = interval(Duration::from_millis(400));
    for beat in 0..4 {
        every.tick().await;
        info!(log, "heartbeat {} at {}", beat, log.timestamp());
    }
}

#[tokio::main]
async fn main() {
    let logger = match Logger::start(Config::debug("logs/tokio")) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let beat = task::spawn(heartbeat(Arc::clone(&logger)));
    let requests: Vec<_> = (0..5)
        .map(|id| task::spawn(handle_request(id, Arc::clone(&logger))))
        .collect();

    let doomed = {
        let log = Arc::clone(&logger);
        task::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            fatal!(log, "payment backend unreachable");
        })
    };

    let mut total = 0;
    for r in requests {
        total += r.await.unwrap_or(0);
    }
    if let Err(e) = doomed.await {
        info!(logger, "payment task ended, panicked={}", e.is_panic());
    }
    let _ = beat.await;
    info!(logger, "served 5 requests, {} ms total", total);

    let log = Arc::clone(&logger);
    let _ = task::spawn_blocking(move || log.flush()).await;
}
