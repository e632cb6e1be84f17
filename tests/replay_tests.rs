// Unit tests for replay module
//
// Tests the core functionality of the replay engine including:
// - Loading JSONL log files
// - Re-scoring logged frames
// - Matching logged targets against tied best cells
// - Generating statistics

use gold_grid_bot::config::Config;
use gold_grid_bot::replay::ReplayEngine;
use gold_grid_bot::types::Coord;
use std::path::PathBuf;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

fn knight_engine() -> ReplayEngine {
    let mut config = Config::default_hardcoded();
    config.identity.name = "knight".to_string();
    ReplayEngine::new(config, false)
}

#[test]
fn test_load_log_file() {
    let engine = knight_engine();
    let entries = engine
        .load_log_file(fixture_path("rounds.jsonl"))
        .expect("Failed to load rounds.jsonl");

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].round_id, 1);
    assert_eq!(entries[0].target, Some(Coord::new(1, 0)));
    assert_eq!(entries[0].frame.width, 3);
    assert_eq!(entries[0].frame.tilemap[0][1].as_ref().map(|t| t.gold), Some(8));
    assert_eq!(entries[3].target, None);
}

#[test]
fn test_load_missing_file_fails() {
    let engine = knight_engine();
    assert!(engine.load_log_file(fixture_path("nope.jsonl")).is_err());
}

#[test]
fn test_replay_frame_scores_every_affordable_cell() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();
    let scored = engine.replay_frame(&entries[0].frame).unwrap();

    assert!(!scored.leader_defense);
    assert_eq!(scored.ranked.len(), 6);

    let expected = [
        (Coord::new(1, 0), 5.25),
        (Coord::new(0, 1), 2.25),
        (Coord::new(2, 0), 0.75),
        (Coord::new(1, 1), 0.5),
        (Coord::new(0, 0), 0.0),
        (Coord::new(2, 1), -1.75),
    ];
    for (cell, (pos, score)) in scored.ranked.iter().zip(expected.iter()) {
        assert_eq!(cell.pos, *pos);
        assert!((cell.score - score).abs() < 1e-9, "{:?}: {}", cell.pos, cell.score);
    }
}

#[test]
fn test_replay_entry_match_and_mismatch() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();

    let hit = engine.replay_entry(&entries[0]).unwrap();
    assert!(hit.matches);
    assert_eq!(hit.best_targets, vec![Coord::new(1, 0)]);
    assert_eq!(hit.best_score, Some(5.25));

    let miss = engine.replay_entry(&entries[1]).unwrap();
    assert!(!miss.matches);
    assert_eq!(miss.original_target, Some(Coord::new(0, 0)));
}

#[test]
fn test_replay_entry_without_self_is_an_error() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();
    assert!(engine.replay_entry(&entries[2]).is_err());
}

#[test]
fn test_skipped_round_matches_when_nothing_is_affordable() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();
    let result = engine.replay_entry(&entries[3]).unwrap();
    assert!(result.best_targets.is_empty());
    assert!(result.matches);
}

#[test]
fn test_replay_all_and_stats() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();
    let results = engine.replay_all(&entries);

    let rounds: Vec<u32> = results.iter().map(|r| r.round_id).collect();
    assert_eq!(rounds, vec![1, 2, 4]);

    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_rounds, 3);
    assert_eq!(stats.matches, 2);
    assert_eq!(stats.mismatches, 1);
    assert!((stats.match_rate - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_replay_rounds_selects_and_reports_missing() {
    let engine = knight_engine();
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();

    let results = engine.replay_rounds(&entries, &[2, 3]).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].round_id, 2);

    assert!(engine.replay_rounds(&entries, &[99]).is_err());
}

#[test]
fn test_other_identity_sees_different_board() {
    let mut config = Config::default_hardcoded();
    config.identity.name = "rival".to_string();
    let engine = ReplayEngine::new(config, false);
    let entries = engine.load_log_file(fixture_path("rounds.jsonl")).unwrap();

    // rival is the richer player, so leader defense takes over
    let scored = engine.replay_frame(&entries[0].frame).unwrap();
    assert!(scored.leader_defense);
}
