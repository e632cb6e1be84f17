// Protocol session: login, prepare, play rounds, game over, repeat
//
// The session owns everything that outlives a single round (decision
// context, ledger, debug logger, rng) and talks to the server through the
// Transport trait. It never retries on its own; any transport failure is
// returned and the caller decides when to reconnect.

use log::{debug, error, info, warn};
use rand::Rng;
use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::{DecisionContext, DecisionEngine, RoundOutcome};
use crate::error::DecisionError;
use crate::ledger::RoundLedger;
use crate::types::{ClientMessage, GameScore, Move, MsgType, ServerMessage};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login rejected by server")]
    LoginRejected,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A bidirectional message channel to the game server
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&mut self, msg: &ClientMessage) -> Result<(), TransportError>;
    async fn recv(&mut self) -> Result<ServerMessage, TransportError>;
}

/// What one finished game looked like from our side
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_id: u64,
    pub rounds_moved: usize,
    pub rounds_skipped: usize,
    pub standings: Vec<GameScore>,
}

pub struct Session<R: Rng> {
    config: Config,
    engine: DecisionEngine,
    context: DecisionContext,
    ledger: RoundLedger,
    debug_logger: DebugLogger,
    rng: R,
    rounds_skipped: usize,
}

impl<R: Rng> Session<R> {
    pub fn new(config: Config, rng: R, debug_logger: DebugLogger) -> Self {
        Session {
            engine: DecisionEngine::new(&config),
            context: DecisionContext::new(config.identity.clone()),
            ledger: RoundLedger::new(),
            debug_logger,
            rng,
            rounds_skipped: 0,
            config,
        }
    }

    pub fn ledger(&self) -> &RoundLedger {
        &self.ledger
    }

    pub fn context(&self) -> &DecisionContext {
        &self.context
    }

    /// Logs in and plays games until the transport fails
    ///
    /// Only returns on error; the ledger survives so a reconnect mid-game
    /// keeps the rounds recorded so far.
    pub async fn run<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        self.login(transport).await?;
        loop {
            self.wait_for_prepare(transport).await?;
            let summary = self.play_game(transport).await?;
            info!(
                "Game {} finished: {} moves, {} skipped rounds",
                summary.game_id, summary.rounds_moved, summary.rounds_skipped
            );
        }
    }

    /// Sends our token and waits for the server's verdict
    pub async fn login<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        transport
            .send(&ClientMessage::login(&self.config.identity.token))
            .await?;

        let reply = transport.recv().await?;
        if reply.kind() == Some(MsgType::LoginRejected) {
            error!("Server rejected login for '{}'", self.config.identity.name);
            return Err(SessionError::LoginRejected);
        }
        info!("Logged in as '{}'", self.config.identity.name);
        Ok(())
    }

    /// Ignores everything until the prepare notice, then reports ready
    pub async fn wait_for_prepare<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        loop {
            let msg = transport.recv().await?;
            if msg.kind() == Some(MsgType::Prepare) {
                info!("Preparing for next game");
                transport
                    .send(&ClientMessage::ready(&self.config.identity.token))
                    .await?;
                return Ok(());
            }
            debug!("Ignoring message type {} while waiting to prepare", msg.msg_type);
        }
    }

    /// Plays rounds until the game-over notice arrives
    pub async fn play_game<T: Transport>(&mut self, transport: &mut T) -> Result<GameSummary, SessionError> {
        self.rounds_skipped = 0;
        loop {
            let msg = transport.recv().await?;
            match msg.kind() {
                Some(MsgType::RoundFrame) => {
                    if let Some(mv) = self.handle_round(&msg) {
                        transport
                            .send(&ClientMessage::player_move(&self.config.identity.token, &mv))
                            .await?;
                    }
                }
                Some(MsgType::GameOver) => return Ok(self.finish_game(&msg).await),
                _ => debug!("Ignoring message type {} during game", msg.msg_type),
            }
        }
    }

    /// Decides one round and records it; `None` means send nothing
    pub fn handle_round(&mut self, frame: &ServerMessage) -> Option<Move> {
        let outcome = if self.ledger.contains(frame.round_id) {
            RoundOutcome::Skip(DecisionError::AlreadyDecided(frame.round_id))
        } else {
            let (context, outcome) =
                self.engine
                    .evaluate_round(self.context.clone(), frame, &mut self.rng);
            self.context = context;
            outcome
        };

        match outcome {
            RoundOutcome::Move { mv, record, .. } => {
                if let Err(e) = self.ledger.append(record) {
                    warn!("Round {}: {}", frame.round_id, e);
                }
                self.debug_logger.log_round(frame, Some(mv.target));
                Some(mv)
            }
            RoundOutcome::Skip(reason) => {
                warn!("Round {}: no move sent ({})", frame.round_id, reason);
                self.rounds_skipped += 1;
                self.debug_logger.log_round(frame, None);
                None
            }
        }
    }

    /// Dumps the ledger, reports standings and resets for the next game
    ///
    /// A failed dump is logged and otherwise ignored.
    async fn finish_game(&mut self, msg: &ServerMessage) -> GameSummary {
        info!("Game over, GameID = {}", msg.game_id);
        for (place, score) in msg.results.iter().enumerate() {
            info!("  #{} {} - {} gold", place + 1, score.name, score.gold);
        }

        if self.config.ledger.enabled {
            let dir = Path::new(&self.config.ledger.output_dir);
            if let Err(e) = self.ledger.dump(dir, msg.game_id, &msg.results).await {
                error!("Failed to dump round ledger for game {}: {}", msg.game_id, e);
            }
        }

        let summary = GameSummary {
            game_id: msg.game_id,
            rounds_moved: self.ledger.len(),
            rounds_skipped: self.rounds_skipped,
            standings: msg.results.clone(),
        };
        self.ledger.clear();
        self.context = DecisionContext::new(self.config.identity.clone());
        summary
    }
}
