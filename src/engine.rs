// Decision engine: one round frame in, one move (or an explicit skip) out
//
// Pipeline per round:
// 1. Parse the frame into a board
// 2. Extract ourselves and the ranked opponents
// 3. Score every cell we can afford
// 4. Select a target among the best-scoring cells
//
// Our position and gold are refreshed from the frame in step 2 and only
// read afterwards, so every cost is computed from our pre-move state. The
// engine never does I/O; the caller sends the move and appends the record.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::{Config, IdentityConfig, LeaderDefenseConfig, ScoringConfig};
use crate::error::DecisionError;
use crate::ledger::RoundRecord;
use crate::opponents::{extract_actors, Actor, RoundActors};
use crate::reach::{Contention, Reach};
use crate::scoring::{leader_defense_active, score_cell, score_leader_defense, ScoreInputs};
use crate::selector::{best_ties, rank, select_target, ScoredCell};
use crate::snapshot::Board;
use crate::types::{Move, ServerMessage};

/// State carried from one round's evaluation to the next
///
/// Passed into [`DecisionEngine::evaluate_round`] by value and handed back
/// updated, so nothing about our own state lives in globals.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub identity: IdentityConfig,
    /// Last round a frame was evaluated for
    pub round_id: Option<u32>,
    /// Ourselves as seen in that frame, before moving
    pub me: Option<Actor>,
}

impl DecisionContext {
    pub fn new(identity: IdentityConfig) -> Self {
        DecisionContext {
            identity,
            round_id: None,
            me: None,
        }
    }
}

/// Result of evaluating one round
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// Send `mv` and record `record`
    Move {
        mv: Move,
        record: RoundRecord,
        candidates: usize,
        ties: usize,
    },
    /// Send nothing this round
    Skip(DecisionError),
}

/// All affordable cells of a board, ranked best first
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBoard {
    pub ranked: Vec<ScoredCell>,
    pub leader_defense: bool,
}

impl ScoredBoard {
    pub fn best(&self) -> &[ScoredCell] {
        best_ties(&self.ranked)
    }
}

/// Stateless move chooser built from the scoring sections of the config
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    scoring: ScoringConfig,
    leader_defense: LeaderDefenseConfig,
}

impl DecisionEngine {
    pub fn new(config: &Config) -> Self {
        DecisionEngine {
            scoring: config.scoring.clone(),
            leader_defense: config.leader_defense.clone(),
        }
    }

    /// Evaluates one round frame
    ///
    /// # Arguments
    /// * `context` - State handed back by the previous call
    /// * `frame` - The server's round frame
    /// * `rng` - Source for the tie-break among equally scored cells
    ///
    /// # Returns
    /// * The updated context and the outcome for this round
    pub fn evaluate_round<R: Rng + ?Sized>(
        &self,
        mut context: DecisionContext,
        frame: &ServerMessage,
        rng: &mut R,
    ) -> (DecisionContext, RoundOutcome) {
        context.round_id = Some(frame.round_id);

        let board = match Board::from_frame(frame) {
            Ok(board) => board,
            Err(e) => return (context, RoundOutcome::Skip(e.into())),
        };
        let actors = match extract_actors(&board, &context.identity) {
            Ok(actors) => actors,
            Err(e) => {
                context.me = None;
                return (context, RoundOutcome::Skip(e.into()));
            }
        };
        context.me = Some(actors.me.clone());

        let outcome = match self.decide(&board, &actors, rng) {
            Ok(outcome) => outcome,
            Err(e) => RoundOutcome::Skip(e),
        };
        (context, outcome)
    }

    fn decide<R: Rng + ?Sized>(
        &self,
        board: &Board,
        actors: &RoundActors,
        rng: &mut R,
    ) -> Result<RoundOutcome, DecisionError> {
        let scored = self.score_board(board, actors)?;
        let me = &actors.me;

        let chosen = select_target(&scored.ranked, rng)
            .ok_or(DecisionError::NoAffordableCell { gold: me.gold })?;
        let ties = scored.best().len();

        let mv = Move::clamped(board.round_id, chosen.pos, board.width, board.height);
        let record = RoundRecord {
            round_id: board.round_id,
            position: me.pos,
            gold: me.gold,
            target: mv.target,
            expected: chosen.score,
            crowded: actors.crowded,
            target_contenders: chosen.contention.reachable,
            leader_defense: scored.leader_defense,
        };

        info!(
            "Round {}: Chose ({}, {}) (expected: {:.3}, gold: {}, candidates: {}, ties: {}, defense: {})",
            board.round_id,
            mv.target.x,
            mv.target.y,
            chosen.score,
            me.gold,
            scored.ranked.len(),
            ties,
            scored.leader_defense
        );

        Ok(RoundOutcome::Move {
            mv,
            record,
            candidates: scored.ranked.len(),
            ties,
        })
    }

    /// Scores every cell we can afford and ranks them
    ///
    /// Cells beyond our gold are left out entirely. A non-finite score is a
    /// scoring fault and aborts the round.
    pub fn score_board(&self, board: &Board, actors: &RoundActors) -> Result<ScoredBoard, DecisionError> {
        let me = &actors.me;
        let defense = leader_defense_active(
            &self.leader_defense,
            board.round_id,
            me.gold,
            &actors.opponents,
        );
        if defense {
            debug!(
                "Round {}: leader defense active (gold {}, top opponent {:?})",
                board.round_id,
                me.gold,
                actors.leader().map(|a| a.gold)
            );
        }

        let mut ranked = Vec::with_capacity(board.cells().len());
        for cell in board.cells() {
            let Some(reach) = Reach::of(me, cell.pos) else {
                continue;
            };
            let contention = Contention::measure(cell.pos, reach.leftover, &actors.opponents);

            let score = if defense {
                score_leader_defense(cell.reward, &self.leader_defense)
            } else {
                score_cell(
                    &ScoreInputs {
                        reward: cell.reward,
                        cost: reach.cost,
                        leftover: reach.leftover,
                        contention,
                    },
                    &self.scoring,
                )
            };

            if !score.is_finite() {
                warn!(
                    "Round {}: scoring fault at ({}, {})",
                    board.round_id, cell.pos.x, cell.pos.y
                );
                return Err(DecisionError::ScoringFault {
                    x: cell.pos.x,
                    y: cell.pos.y,
                    reward: cell.reward,
                    score,
                });
            }

            ranked.push(ScoredCell {
                pos: cell.pos,
                reward: cell.reward,
                cost: reach.cost,
                leftover: reach.leftover,
                contention,
                score,
            });
        }

        rank(&mut ranked);
        Ok(ScoredBoard {
            ranked,
            leader_defense: defense,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use crate::types::{Coord, GameScore, Tile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn identity() -> IdentityConfig {
        IdentityConfig {
            name: "knight".to_string(),
            token: "tok".to_string(),
        }
    }

    fn frame(round_id: u32, rewards: &[&[i32]], players: &[(usize, usize, &str, i32)]) -> ServerMessage {
        let mut tilemap: Vec<Vec<Option<Tile>>> = rewards
            .iter()
            .map(|row| {
                row.iter()
                    .map(|gold| Some(Tile { gold: *gold, players: vec![] }))
                    .collect()
            })
            .collect();
        for (x, y, name, gold) in players {
            if let Some(tile) = tilemap[*y][*x].as_mut() {
                tile.players.push(GameScore {
                    name: name.to_string(),
                    gold: *gold,
                });
            }
        }
        ServerMessage {
            msg_type: 3,
            round_id,
            tilemap,
            ..Default::default()
        }
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new(&Config::default_hardcoded())
    }

    #[test]
    fn test_context_is_refreshed_from_frame() {
        let mut rng = StdRng::seed_from_u64(3);
        let context = DecisionContext::new(identity());
        let f = frame(4, &[&[2, 3], &[5, 6]], &[(1, 1, "knight", 9), (0, 0, "rival", 12)]);

        let (context, outcome) = engine().evaluate_round(context, &f, &mut rng);

        assert_eq!(context.round_id, Some(4));
        let me = context.me.unwrap();
        assert_eq!(me.pos, Coord::new(1, 1));
        assert_eq!(me.gold, 9);
        assert!(matches!(outcome, RoundOutcome::Move { .. }));
    }

    #[test]
    fn test_record_describes_pre_move_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = frame(9, &[&[0, 0, 3]], &[(0, 0, "knight", 10), (0, 0, "rival", 11)]);

        let (_, outcome) = engine().evaluate_round(DecisionContext::new(identity()), &f, &mut rng);
        let RoundOutcome::Move { mv, record, candidates, .. } = outcome else {
            panic!("expected a move");
        };

        assert_eq!(record.round_id, 9);
        assert_eq!(record.position, Coord::new(0, 0));
        assert_eq!(record.gold, 10);
        assert_eq!(record.crowded, 2);
        assert_eq!(record.target, mv.target);
        assert_eq!(candidates, 3);
    }

    #[test]
    fn test_missing_self_skips_round() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = frame(2, &[&[1, 2]], &[(0, 0, "rival", 5)]);
        let (context, outcome) = engine().evaluate_round(DecisionContext::new(identity()), &f, &mut rng);

        assert_eq!(context.me, None);
        assert_eq!(
            outcome,
            RoundOutcome::Skip(DecisionError::Malformed(SnapshotError::SelfNotFound(
                "knight".to_string()
            )))
        );
    }

    #[test]
    fn test_empty_board_skips_round() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = ServerMessage {
            msg_type: 3,
            round_id: 1,
            ..Default::default()
        };
        let (_, outcome) = engine().evaluate_round(DecisionContext::new(identity()), &f, &mut rng);
        assert_eq!(
            outcome,
            RoundOutcome::Skip(DecisionError::Malformed(SnapshotError::EmptyBoard))
        );
    }

    #[test]
    fn test_broke_bot_has_no_move() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = frame(2, &[&[8, 8], &[8, 8]], &[(0, 0, "knight", 0)]);
        let (_, outcome) = engine().evaluate_round(DecisionContext::new(identity()), &f, &mut rng);
        assert_eq!(
            outcome,
            RoundOutcome::Skip(DecisionError::NoAffordableCell { gold: 0 })
        );
    }

    #[test]
    fn test_degenerate_weights_report_scoring_fault() {
        let mut config = Config::default_hardcoded();
        config.scoring.oppo_weight = -1.0;
        let engine = DecisionEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(3);

        // Richer rival next door: congestion = 1 * -1 + 0 + 1 = 0 at reward 3
        let f = frame(2, &[&[0, 3]], &[(0, 0, "knight", 5), (1, 0, "rival", 50)]);
        let (_, outcome) = engine.evaluate_round(DecisionContext::new(identity()), &f, &mut rng);
        assert!(matches!(
            outcome,
            RoundOutcome::Skip(DecisionError::ScoringFault { x: 1, y: 0, reward: 3, .. })
        ));
    }

    #[test]
    fn test_leader_defense_flag_reaches_record() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = frame(2, &[&[0, 8]], &[(0, 0, "knight", 30), (1, 0, "rival", 5)]);
        let (_, outcome) = engine().evaluate_round(DecisionContext::new(identity()), &f, &mut rng);
        let RoundOutcome::Move { mv, record, .. } = outcome else {
            panic!("expected a move");
        };
        assert!(record.leader_defense);
        assert_eq!(mv.target, Coord::new(0, 0));
        assert_eq!(record.expected, 10.0);
    }
}
