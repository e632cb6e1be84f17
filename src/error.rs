// Error kinds for the per-round decision pipeline
//
// Every variant here is local to one round: the caller logs it, skips the
// round and keeps the connection alive.

use thiserror::Error;

/// The round frame could not be turned into a usable board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("round frame has an empty tilemap")]
    EmptyBoard,
    #[error("tilemap row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("declared board {declared_width}x{declared_height} disagrees with tilemap {width}x{height}")]
    DimensionMismatch {
        declared_width: i32,
        declared_height: i32,
        width: usize,
        height: usize,
    },
    #[error("tile ({x}, {y}) is missing")]
    MissingTile { x: usize, y: usize },
    #[error("no occupant matches our identity '{0}'")]
    SelfNotFound(String),
}

/// Why no move was produced for a round
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecisionError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),
    #[error("no affordable cell with {gold} gold")]
    NoAffordableCell { gold: i32 },
    #[error("non-finite score {score} at ({x}, {y}) for reward {reward}")]
    ScoringFault {
        x: i32,
        y: i32,
        reward: i32,
        score: f64,
    },
    #[error("round {0} already has a recorded decision")]
    AlreadyDecided(u32),
}

/// Ledger failures
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("round {0} is already recorded")]
    DuplicateRound(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ledger dump {0} has no header line")]
    MissingHeader(String),
}
