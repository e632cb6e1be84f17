// Replay module for analyzing logged rounds and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs written by DebugLogger
// 2. Re-score every logged frame with the current configuration
// 3. Check whether the logged target is still among the best cells
// 4. Generate summary reports
//
// Targets are picked at random among tied cells, so a replay matches when
// the logged target is any of the re-computed best cells.

use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::{Config, IdentityConfig};
use crate::debug_logger::RoundLogEntry;
use crate::engine::{DecisionEngine, ScoredBoard};
use crate::opponents::extract_actors;
use crate::snapshot::Board;
use crate::types::{Coord, ServerMessage};

/// Result of replaying a single round
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub round_id: u32,
    pub original_target: Option<Coord>,
    pub best_targets: Vec<Coord>,
    pub best_score: Option<f64>,
    pub matches: bool,
    pub leader_defense: bool,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_rounds: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    engine: DecisionEngine,
    identity: IdentityConfig,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            engine: DecisionEngine::new(&config),
            identity: config.identity,
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<RoundLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: RoundLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Scores a logged frame exactly as the live bot would
    pub fn replay_frame(&self, frame: &ServerMessage) -> Result<ScoredBoard, String> {
        let board = Board::from_frame(frame).map_err(|e| e.to_string())?;
        let actors = extract_actors(&board, &self.identity).map_err(|e| e.to_string())?;
        self.engine
            .score_board(&board, &actors)
            .map_err(|e| e.to_string())
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &RoundLogEntry) -> Result<ReplayResult, String> {
        let start_time = Instant::now();
        let scored = self.replay_frame(&entry.frame)?;
        let computation_time_us = start_time.elapsed().as_micros();

        let best_targets: Vec<Coord> = scored.best().iter().map(|c| c.pos).collect();
        let best_score = scored.best().first().map(|c| c.score);
        let matches = match entry.target {
            Some(target) => best_targets.contains(&target),
            None => best_targets.is_empty(),
        };

        if self.verbose {
            if matches {
                info!(
                    "Round {}: MATCH - {:?} (score: {:?}, ties: {})",
                    entry.round_id,
                    entry.target,
                    best_score,
                    best_targets.len()
                );
            } else {
                warn!(
                    "Round {}: MISMATCH - Original: {:?}, Best now: {:?} (score: {:?})",
                    entry.round_id, entry.target, best_targets, best_score
                );
            }
        }

        Ok(ReplayResult {
            round_id: entry.round_id,
            original_target: entry.target,
            best_targets,
            best_score,
            matches,
            leader_defense: scored.leader_defense,
            computation_time_us,
        })
    }

    /// Replays all entries in parallel, keeping log order in the results
    pub fn replay_all(&self, entries: &[RoundLogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", entry.round_id, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific rounds from a log file
    pub fn replay_rounds(
        &self,
        entries: &[RoundLogEntry],
        round_ids: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for round_id in round_ids {
            let entry = entries
                .iter()
                .find(|e| e.round_id == *round_id)
                .ok_or_else(|| format!("Round {} not found in log file", round_id))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", round_id, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_rounds = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_rounds - matches;
        let match_rate = if total_rounds > 0 {
            (matches as f64 / total_rounds as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_rounds,
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
        println!("Total Rounds:   {}", stats.total_rounds);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let defense_rounds = results.iter().filter(|r| r.leader_defense).count();
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_us as f64)
                .sum::<f64>()
                / results.len() as f64;

            println!("Leader Defense Rounds:      {}", defense_rounds);
            println!("Average Scoring Time:       {:.1}us\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Round {}: {} → {} (score: {})",
                    result.round_id,
                    format_target(result.original_target),
                    result
                        .best_targets
                        .iter()
                        .map(|c| format!("({}, {})", c.x, c.y))
                        .collect::<Vec<_>>()
                        .join(" | "),
                    result
                        .best_score
                        .map_or("-".to_string(), |s| format!("{:.3}", s))
                );
            }
            println!();
        }
    }
}

fn format_target(target: Option<Coord>) -> String {
    match target {
        Some(c) => format!("({}, {})", c.x, c.y),
        None => "skip".to_string(),
    }
}
