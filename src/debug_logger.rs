// Debug logging module for per-tick session logging
//
// Each session is written as JSONL: one `session` record describing how the
// engine was built, followed by one `tick` record per completed tick. The
// replay tool reads these files back.

use log::error;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use crate::engine::{Engine, TickEvent, TickReport};
use crate::types::{Coord, Direction, Status};

/// A single line of the tick log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Session(SessionRecord),
    Tick(TickRecord),
}

/// Everything needed to rebuild the engine for a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub tick_interval_ms: u64,
    pub wrap_enabled: bool,
    pub obstacles: Vec<Coord>,
    pub timestamp: String,
}

/// State of the engine right after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub direction: Direction,
    pub head: Coord,
    pub length: usize,
    pub score: u32,
    pub status: Status,
    pub food: Option<Coord>,
    pub event: TickEvent,
    pub timestamp: String,
}

impl SessionRecord {
    pub fn from_engine(engine: &Engine, obstacles: Vec<Coord>) -> Self {
        SessionRecord {
            seed: engine.seed(),
            width: engine.width() as u32,
            height: engine.height() as u32,
            tick_interval_ms: engine.tick_interval().as_millis() as u64,
            wrap_enabled: engine.wrap_enabled(),
            obstacles,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl TickRecord {
    pub fn from_report(engine: &Engine, report: &TickReport) -> Self {
        TickRecord {
            tick: report.tick,
            direction: report.direction,
            head: report.head,
            length: engine.length(),
            score: engine.score(),
            status: engine.status(),
            food: engine.food(),
            event: report.event,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Writes tick records to a JSONL file; a disabled logger drops everything
pub struct TickLogger {
    writer: Option<BufWriter<File>>,
}

impl TickLogger {
    /// Creates a new tick logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return TickLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Tick logging enabled: {}", log_file_path);
                TickLogger {
                    writer: Some(BufWriter::new(file)),
                }
            }
            Err(e) => {
                error!("Failed to create tick log file '{}': {}", log_file_path, e);
                TickLogger::disabled()
            }
        }
    }

    /// Creates a disabled tick logger (no-op)
    pub fn disabled() -> Self {
        TickLogger { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn log_session(&mut self, record: SessionRecord) {
        self.write_record(&LogRecord::Session(record));
    }

    pub fn log_tick(&mut self, record: TickRecord) {
        self.write_record(&LogRecord::Tick(record));
    }

    fn write_record(&mut self, record: &LogRecord) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        match serde_json::to_string(record) {
            Ok(json_line) => {
                if let Err(e) = writeln!(writer, "{}", json_line) {
                    error!("Failed to write tick log entry: {}", e);
                } else if let Err(e) = writer.flush() {
                    // Flush so a crashed session still leaves a usable log
                    error!("Failed to flush tick log: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize tick log entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CollisionKind;

    #[test]
    fn test_tick_record_json_shape() {
        let record = LogRecord::Tick(TickRecord {
            tick: 3,
            direction: Direction::North,
            head: Coord::new(1, 2),
            length: 2,
            score: 1,
            status: Status::Over,
            food: None,
            event: TickEvent::Collided { kind: CollisionKind::Wall },
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        });

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "tick");
        assert_eq!(value["direction"], "north");
        assert_eq!(value["status"], "over");
        assert_eq!(value["event"]["type"], "collided");
        assert_eq!(value["event"]["kind"], "wall");
        assert!(value["food"].is_null());

        let parsed: LogRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_disabled_logger_is_noop() {
        let mut logger = TickLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log_session(SessionRecord {
            seed: 1,
            width: 5,
            height: 5,
            tick_interval_ms: 100,
            wrap_enabled: true,
            obstacles: vec![],
            timestamp: String::new(),
        });
    }

    #[test]
    fn test_unwritable_path_degrades_to_disabled() {
        let logger = TickLogger::new(true, "/nonexistent-dir/for/sure/ticks.jsonl");
        assert!(!logger.is_enabled());
    }
}
