// Standalone replay tool for analyzing gold grid debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                    Replay all rounds
//   --rounds <r1,r2>         Replay specific rounds (comma-separated)
//   --verbose                Show detailed output for each round
//   --config <path>          Path to Bot.toml (default: Bot.toml)
//   --name <name>            Identity the log was recorded under

use std::env;
use std::process;

use gold_grid_bot::config::Config;
use gold_grid_bot::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Gold Grid Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all rounds in the log");
    eprintln!("  --rounds <R1,R2,...>    Replay specific rounds (comma-separated)");
    eprintln!("  --verbose               Show detailed output for each round");
    eprintln!("  --config <path>         Path to Bot.toml (default: Bot.toml)");
    eprintln!("  --name <name>           Identity the log was recorded under");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all rounds");
    eprintln!("  replay gold_grid_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific rounds with a different identity");
    eprintln!("  replay gold_grid_debug.jsonl --rounds 5,10,15 --name knight");
}

fn parse_rounds(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|r| {
            r.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid round number '{}': {}", r, e))
        })
        .collect()
}

fn option_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn main() {
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
    let mut config_path = "Bot.toml".to_string();
    let mut verbose = false;
    let mut name = None;
    let mut rounds = None;
    let mut replay_all = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                replay_all = true;
            }
            "--rounds" => {
                rounds = Some(option_value(&args, i, "--rounds"));
                i += 1;
            }
            "--config" => {
                config_path = option_value(&args, i, "--config");
                i += 1;
            }
            "--name" => {
                name = Some(option_value(&args, i, "--name"));
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !replay_all && rounds.is_none() {
        eprintln!("Error: Must specify --all or --rounds");
        print_usage();
        process::exit(1);
    }

    let mut config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    config.apply_env_overrides(|key| env::var(key).ok());
    if let Some(name) = name {
        config.identity.name = name;
    }

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    let results = match rounds {
        Some(arg) => {
            let round_ids = parse_rounds(&arg).unwrap_or_else(|e| {
                eprintln!("Error parsing rounds: {}", e);
                process::exit(1);
            });
            println!("Replaying {} specific round(s)...\n", round_ids.len());
            engine.replay_rounds(&entries, &round_ids).unwrap_or_else(|e| {
                eprintln!("Error during replay: {}", e);
                process::exit(1);
            })
        }
        None => {
            println!("Replaying all {} rounds...\n", entries.len());
            engine.replay_all(&entries)
        }
    };

    engine.print_report(&results);
}
