// Round ledger: one record per decided round, dumped at game end
//
// Records are append-only. A round that already has a record cannot be
// recorded again, and nothing edits a record once it is in the ledger.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::LedgerError;
use crate::types::{Coord, GameScore};

/// What we did in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: u32,
    /// Our position and gold before moving
    pub position: Coord,
    pub gold: i32,
    pub target: Coord,
    pub expected: f64,
    /// Occupants sharing our cell in the snapshot, ourselves included
    pub crowded: usize,
    /// Opponents able to reach the target this round
    pub target_contenders: u32,
    pub leader_defense: bool,
}

/// First line of a ledger dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub game_id: u64,
    pub rounds: usize,
    pub standings: Vec<GameScore>,
    pub dumped_at: String,
}

/// A ledger dump read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDump {
    pub header: LedgerHeader,
    pub records: Vec<RoundRecord>,
}

/// Post-game figures derived from a ledger dump
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub game_id: u64,
    pub rounds: usize,
    pub first_gold: Option<i32>,
    pub last_gold: Option<i32>,
    pub mean_expected: f64,
    pub defense_rounds: usize,
    pub crowded_rounds: usize,
    /// 1-based place of `name` in the final standings
    pub placement: Option<usize>,
}

impl LedgerDump {
    /// Summarises the game from the point of view of player `name`
    pub fn summary(&self, name: &str) -> LedgerSummary {
        let rounds = self.records.len();
        let mean_expected = if rounds > 0 {
            self.records.iter().map(|r| r.expected).sum::<f64>() / rounds as f64
        } else {
            0.0
        };

        LedgerSummary {
            game_id: self.header.game_id,
            rounds,
            first_gold: self.records.first().map(|r| r.gold),
            last_gold: self.records.last().map(|r| r.gold),
            mean_expected,
            defense_rounds: self.records.iter().filter(|r| r.leader_defense).count(),
            crowded_rounds: self.records.iter().filter(|r| r.crowded > 1).count(),
            placement: self
                .header
                .standings
                .iter()
                .position(|s| s.name == name)
                .map(|i| i + 1),
        }
    }
}

#[derive(Debug, Default)]
pub struct RoundLedger {
    records: BTreeMap<u32, RoundRecord>,
}

impl RoundLedger {
    pub fn new() -> Self {
        RoundLedger::default()
    }

    /// Appends a record, refusing a second one for the same round
    pub fn append(&mut self, record: RoundRecord) -> Result<(), LedgerError> {
        if self.records.contains_key(&record.round_id) {
            return Err(LedgerError::DuplicateRound(record.round_id));
        }
        self.records.insert(record.round_id, record);
        Ok(())
    }

    pub fn contains(&self, round_id: u32) -> bool {
        self.records.contains_key(&round_id)
    }

    pub fn get(&self, round_id: u32) -> Option<&RoundRecord> {
        self.records.get(&round_id)
    }

    /// Records ordered by round id
    pub fn records(&self) -> impl Iterator<Item = &RoundRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Starts a fresh ledger for the next game
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Writes the ledger to `dir` as JSONL: a header line, then one record per line
    ///
    /// # Returns
    /// * Path of the timestamped file that was written
    pub async fn dump(
        &self,
        dir: &Path,
        game_id: u64,
        standings: &[GameScore],
    ) -> Result<PathBuf, LedgerError> {
        tokio::fs::create_dir_all(dir).await?;

        let now = chrono::Utc::now();
        let path = dir.join(format!(
            "round-ledger-{}-{}.jsonl",
            game_id,
            now.format("%Y%m%d-%H%M%S")
        ));

        let header = LedgerHeader {
            game_id,
            rounds: self.records.len(),
            standings: standings.to_vec(),
            dumped_at: now.to_rfc3339(),
        };

        let mut contents = serde_json::to_string(&header)?;
        contents.push('\n');
        for record in self.records() {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;

        info!(
            "Game {}: wrote {} round records to {}",
            game_id,
            self.records.len(),
            path.display()
        );
        Ok(path)
    }

    /// Reads a dump written by [`RoundLedger::dump`]
    pub fn load_dump<P: AsRef<Path>>(path: P) -> Result<LedgerDump, LedgerError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();

        let header_line = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(LedgerError::MissingHeader(path.display().to_string())),
            }
        };
        let header: LedgerHeader = serde_json::from_str(&header_line)?;

        let mut records = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(LedgerDump { header, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round_id: u32, gold: i32) -> RoundRecord {
        RoundRecord {
            round_id,
            position: Coord::new(1, 2),
            gold,
            target: Coord::new(2, 2),
            expected: 1.5,
            crowded: 1,
            target_contenders: 0,
            leader_defense: false,
        }
    }

    #[test]
    fn test_append_and_get() {
        let mut ledger = RoundLedger::new();
        ledger.append(record(3, 10)).unwrap();
        ledger.append(record(1, 12)).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(3), Some(&record(3, 10)));
        let rounds: Vec<u32> = ledger.records().map(|r| r.round_id).collect();
        assert_eq!(rounds, vec![1, 3]);
    }

    #[test]
    fn test_duplicate_round_is_refused_and_original_kept() {
        let mut ledger = RoundLedger::new();
        ledger.append(record(5, 10)).unwrap();

        let err = ledger.append(record(5, 99)).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateRound(5)));
        assert_eq!(ledger.get(5).map(|r| r.gold), Some(10));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_clear_starts_a_new_game() {
        let mut ledger = RoundLedger::new();
        ledger.append(record(0, 1)).unwrap();
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.append(record(0, 1)).is_ok());
    }

    #[tokio::test]
    async fn test_dump_round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = RoundLedger::new();
        for round in 0..4 {
            ledger.append(record(round, 20 + round as i32)).unwrap();
        }
        let standings = vec![GameScore {
            name: "knight".to_string(),
            gold: 88,
        }];

        let path = ledger.dump(dir.path(), 17, &standings).await.unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("round-ledger-17-"));

        let dump = RoundLedger::load_dump(&path).unwrap();
        assert_eq!(dump.header.game_id, 17);
        assert_eq!(dump.header.rounds, 4);
        assert_eq!(dump.header.standings, standings);
        let original: Vec<RoundRecord> = ledger.records().cloned().collect();
        assert_eq!(dump.records, original);
    }

    #[tokio::test]
    async fn test_dump_into_unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let ledger = RoundLedger::new();
        assert!(ledger.dump(&blocker, 1, &[]).await.is_err());
    }

    #[test]
    fn test_summary_of_dump() {
        let mut crowded = record(2, 30);
        crowded.crowded = 3;
        crowded.leader_defense = true;
        crowded.expected = 4.5;
        let dump = LedgerDump {
            header: LedgerHeader {
                game_id: 8,
                rounds: 2,
                standings: vec![
                    GameScore { name: "rival".to_string(), gold: 120 },
                    GameScore { name: "knight".to_string(), gold: 95 },
                ],
                dumped_at: String::new(),
            },
            records: vec![record(1, 12), crowded],
        };

        let summary = dump.summary("knight");
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.first_gold, Some(12));
        assert_eq!(summary.last_gold, Some(30));
        assert_eq!(summary.mean_expected, 3.0);
        assert_eq!(summary.defense_rounds, 1);
        assert_eq!(summary.crowded_rounds, 1);
        assert_eq!(summary.placement, Some(2));
        assert_eq!(dump.summary("nobody").placement, None);
    }

    #[test]
    fn test_load_dump_without_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(matches!(
            RoundLedger::load_dump(&path),
            Err(LedgerError::MissingHeader(_))
        ));
    }
}
