// Post-game report over one or more round ledger dumps
//
// Usage:
//   cargo run --bin ledger_report -- <ledger.jsonl>... [--name <name>]

use std::env;
use std::process;

use gold_grid_bot::config::Config;
use gold_grid_bot::ledger::RoundLedger;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.contains(&"--help".to_string()) {
        eprintln!("USAGE:");
        eprintln!("  ledger_report <ledger.jsonl>... [--name <name>]");
        process::exit(if args.is_empty() { 1 } else { 0 });
    }

    let mut config = Config::load_or_default();
    let mut paths = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--name" {
            match args.get(i + 1) {
                Some(name) => config.identity.name = name.clone(),
                None => {
                    eprintln!("Error: --name requires an argument");
                    process::exit(1);
                }
            }
            i += 2;
            continue;
        }
        paths.push(args[i].clone());
        i += 1;
    }

    println!(
        "{:>10} {:>7} {:>7} {:>7} {:>9} {:>8} {:>8} {:>6}",
        "game", "rounds", "start", "end", "mean_ev", "defense", "crowded", "place"
    );

    let mut failures = 0;
    for path in &paths {
        let dump = match RoundLedger::load_dump(path) {
            Ok(dump) => dump,
            Err(e) => {
                eprintln!("Skipping {}: {}", path, e);
                failures += 1;
                continue;
            }
        };

        let s = dump.summary(&config.identity.name);
        let fmt_gold = |g: Option<i32>| g.map_or("-".to_string(), |g| g.to_string());
        println!(
            "{:>10} {:>7} {:>7} {:>7} {:>9.3} {:>8} {:>8} {:>6}",
            s.game_id,
            s.rounds,
            fmt_gold(s.first_gold),
            fmt_gold(s.last_gold),
            s.mean_expected,
            s.defense_rounds,
            s.crowded_rounds,
            s.placement.map_or("-".to_string(), |p| p.to_string())
        );
    }

    if failures == paths.len() {
        process::exit(1);
    }
}
