// Selector: rank scored cells and pick among the best
//
// Ties at the top are broken uniformly at random so that opponents cannot
// predict our target from the board alone.

use rand::Rng;

use crate::reach::Contention;
use crate::types::Coord;

/// A candidate cell with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCell {
    pub pos: Coord,
    pub reward: i32,
    pub cost: i32,
    pub leftover: i32,
    pub contention: Contention,
    pub score: f64,
}

/// Stable sort by score, best first
pub fn rank(cells: &mut [ScoredCell]) {
    cells.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// The leading run of cells sharing the top score in a ranked slice
pub fn best_ties(ranked: &[ScoredCell]) -> &[ScoredCell] {
    let Some(top) = ranked.first() else {
        return ranked;
    };
    let end = ranked
        .iter()
        .position(|c| c.score != top.score)
        .unwrap_or(ranked.len());
    &ranked[..end]
}

/// Picks one of the top-scoring cells uniformly at random
///
/// `ranked` must already be sorted with [`rank`]. Returns `None` when there
/// is no candidate at all.
pub fn select_target<'a, R: Rng + ?Sized>(ranked: &'a [ScoredCell], rng: &mut R) -> Option<&'a ScoredCell> {
    let ties = best_ties(ranked);
    if ties.is_empty() {
        return None;
    }
    ties.get(rng.random_range(0..ties.len()))
}
