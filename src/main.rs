use log::{error, info};
use std::env;
use std::process;
use std::thread;
use std::time::Duration;

use snake_engine::autopilot;
use snake_engine::config::Config;
use snake_engine::debug_logger::{SessionRecord, TickLogger, TickRecord};
use snake_engine::engine::{Engine, StepOutcome};
use snake_engine::types::Status;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting headless snake session...");

    // An explicit path is the only argument; otherwise Snake.toml or defaults
    let config = match env::args().nth(1) {
        Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
            error!("Could not load config from '{}': {}", path, e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };

    let mut engine = match Engine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to create engine: {}", e);
            process::exit(1);
        }
    };

    let mut logger = TickLogger::new(config.debug.enabled, &config.debug.log_file_path);
    logger.log_session(SessionRecord::from_engine(&engine, config.board.obstacles.clone()));

    let poll_interval = Duration::from_millis(config.timing.polling_interval_ms);
    let max_ticks = config.session.max_ticks;

    engine.start();
    while engine.status() == Status::Running {
        engine.set_pending_direction(autopilot::choose_direction(&engine));

        if let StepOutcome::Ticked(report) = engine.step() {
            logger.log_tick(TickRecord::from_report(&engine, &report));
            if max_ticks > 0 && report.tick >= max_ticks {
                info!("Reached tick limit of {}", max_ticks);
                break;
            }
        }

        thread::sleep(poll_interval);
    }

    info!(
        "Session finished after {} ticks: score {}, length {}",
        engine.tick_count(),
        engine.score(),
        engine.length()
    );
}
