// Replay module for verifying recorded sessions
//
// This module provides functionality to:
// 1. Parse JSONL tick logs
// 2. Rebuild the engine from the recorded seed and settings
// 3. Re-feed the recorded directions tick by tick
// 4. Compare recorded vs replayed state and report mismatches

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::{LogRecord, SessionRecord, TickRecord};
use crate::engine::{Engine, StepOutcome};
use crate::types::{Coord, Status};

/// The observable state compared after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSnapshot {
    pub head: Coord,
    pub length: usize,
    pub score: u32,
    pub status: Status,
}

impl TickSnapshot {
    fn from_record(record: &TickRecord) -> Self {
        TickSnapshot {
            head: record.head,
            length: record.length,
            score: record.score,
            status: record.status,
        }
    }

    fn from_engine(engine: &Engine) -> Self {
        TickSnapshot {
            head: engine.head(),
            length: engine.length(),
            score: engine.score(),
            status: engine.status(),
        }
    }
}

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub tick: u64,
    pub recorded: TickSnapshot,
    /// None when the replayed engine refused to tick (e.g. already over)
    pub replayed: Option<TickSnapshot>,
    pub matches: bool,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for verifying tick logs
pub struct ReplayEngine {
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(verbose: bool) -> Self {
        ReplayEngine { verbose }
    }

    /// Loads all records from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogRecord>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: LogRecord = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to parse JSON on line {}: {}", line_num + 1, e)
            })?;

            records.push(record);
        }

        info!("Loaded {} log records", records.len());
        Ok(records)
    }

    /// Builds a fresh, not yet started engine matching a session record
    pub fn engine_for_session(session: &SessionRecord) -> Result<Engine, String> {
        let mut config = Config::default_hardcoded();
        config.board.width = session.width;
        config.board.height = session.height;
        config.board.obstacles = session.obstacles.clone();
        config.timing.tick_interval_ms = session.tick_interval_ms;
        config.rules.wrap_enabled = session.wrap_enabled;

        Engine::with_seed(&config, session.seed)
            .map_err(|e| format!("Failed to rebuild engine: {}", e))
    }

    /// Replays every tick record against a rebuilt engine
    ///
    /// The first record must be the session record. Ticks are driven with
    /// synthetic timestamps exactly one interval apart.
    pub fn replay(&self, records: &[LogRecord]) -> Result<Vec<ReplayResult>, String> {
        let (session, ticks) = match records.split_first() {
            Some((LogRecord::Session(session), rest)) => (session, rest),
            Some(_) => return Err("Log does not start with a session record".to_string()),
            None => return Err("Log is empty".to_string()),
        };

        let mut engine = Self::engine_for_session(session)?;
        let interval = engine.tick_interval();
        let mut now = Instant::now();
        engine.start_at(now);

        let mut results = Vec::new();
        for record in ticks {
            let LogRecord::Tick(tick) = record else {
                warn!("Ignoring extra session record in the middle of the log");
                continue;
            };

            if tick.tick != engine.tick_count() + 1 {
                warn!(
                    "Tick {} recorded out of order (expected {})",
                    tick.tick,
                    engine.tick_count() + 1
                );
            }

            now += interval;
            engine.set_pending_direction(tick.direction);
            let replayed = match engine.step_at(now) {
                StepOutcome::Ticked(_) => Some(TickSnapshot::from_engine(&engine)),
                StepOutcome::Inactive | StepOutcome::NotDue => None,
            };

            let recorded = TickSnapshot::from_record(tick);
            let matches = replayed == Some(recorded);

            if self.verbose {
                if matches {
                    info!(
                        "Tick {}: ✓ MATCH - head ({}, {}), length {}, score {}",
                        tick.tick, recorded.head.x, recorded.head.y, recorded.length, recorded.score
                    );
                } else {
                    warn!(
                        "Tick {}: ✗ MISMATCH - recorded {:?}, replayed {:?}",
                        tick.tick, recorded, replayed
                    );
                }
            }

            results.push(ReplayResult {
                tick: tick.tick,
                recorded,
                replayed,
                matches,
            });
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_ticks,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Tick {}: recorded {:?} → replayed {:?}",
                    result.tick, result.recorded, result.replayed
                );
            }
            println!();
        }
    }
}
