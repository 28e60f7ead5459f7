// Standalone replay tool for verifying snake engine tick logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --verbose              Show detailed output for each tick
//   --allow-mismatch       Exit successfully even if ticks diverge

use std::env;
use std::process;

use snake_engine::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Snake Engine Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --verbose               Show detailed output for each tick");
    eprintln!("  --allow-mismatch        Exit with status 0 even if ticks diverge");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Verify a recorded session");
    eprintln!("  replay snake_ticks.jsonl");
    eprintln!();
    eprintln!("  # Verbose replay of every tick");
    eprintln!("  replay snake_ticks.jsonl --verbose");
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut verbose = false;
    let mut allow_mismatch = false;

    for arg in &args[2..] {
        match arg.as_str() {
            "--verbose" => verbose = true,
            "--allow-mismatch" => allow_mismatch = true,
            _ => {
                eprintln!("Error: Unknown option '{}'", arg);
                print_usage();
                process::exit(1);
            }
        }
    }

    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(verbose);

    let records = match engine.load_log_file(log_file) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if records.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    let results = match engine.replay(&records) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error during replay: {}", e);
            process::exit(1);
        }
    };

    engine.print_report(&results);

    let stats = engine.generate_stats(&results);
    if stats.mismatches > 0 && !allow_mismatch {
        eprintln!("✗ {} tick(s) diverged from the recording", stats.mismatches);
        process::exit(1);
    }
    println!("✓ Replay finished");
}
