// Opponent model extractor
//
// Splits the board's occupants into ourselves and everybody else. Runs
// once per round, before any cost or score is computed, so that every
// later stage sees our pre-move position and gold.

use std::cmp::Reverse;

use crate::config::IdentityConfig;
use crate::error::SnapshotError;
use crate::snapshot::Board;
use crate::types::Coord;

/// A player as seen in this round's snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub pos: Coord,
    pub gold: i32,
}

/// Ourselves plus the opponents, ranked by gold descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundActors {
    pub me: Actor,
    /// Occupants sharing our cell, ourselves included
    pub crowded: usize,
    pub opponents: Vec<Actor>,
}

impl RoundActors {
    /// The richest opponent, if any
    pub fn leader(&self) -> Option<&Actor> {
        self.opponents.first()
    }
}

/// Extracts our own actor and the ranked opponent list from a board
///
/// If our identity shows up more than once, the last occurrence in board
/// order wins, matching how the server lists a player only once per round.
pub fn extract_actors(board: &Board, identity: &IdentityConfig) -> Result<RoundActors, SnapshotError> {
    let mut me = None;
    let mut opponents = Vec::new();

    for cell in board.cells() {
        for occupant in &cell.occupants {
            let actor = Actor {
                id: occupant.id.clone(),
                pos: cell.pos,
                gold: occupant.gold,
            };
            if identity.is_me(&occupant.id) {
                me = Some((actor, cell.occupants.len()));
            } else {
                opponents.push(actor);
            }
        }
    }

    let (me, crowded) = me.ok_or_else(|| SnapshotError::SelfNotFound(identity.name.clone()))?;

    // Stable: equal gold keeps board order
    opponents.sort_by_key(|a| Reverse(a.gold));

    Ok(RoundActors {
        me,
        crowded,
        opponents,
    })
}
