// Debug logging module for asynchronous round logging
//
// This module provides fire-and-forget async logging so the round loop
// never waits on disk. Each round's frame and chosen target is written as
// one JSONL line, which the replay tool reads back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{Coord, ServerMessage};

/// A single debug log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundLogEntry {
    pub round_id: u32,
    /// `None` when the round was skipped
    pub target: Option<Coord>,
    pub frame: ServerMessage,
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> so that spawned writes stay ordered per file
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a round decision asynchronously (fire-and-forget)
    /// Must be called from within a tokio runtime
    pub fn log_round(&self, frame: &ServerMessage, target: Option<Coord>) {
        if !self.enabled {
            return;
        }

        let entry = Self::entry(frame, target);
        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Logs a round decision and waits for the write to finish
    pub async fn log_round_now(&self, frame: &ServerMessage, target: Option<Coord>) {
        if !self.enabled {
            return;
        }
        Self::write_entry(self.file.clone(), Self::entry(frame, target)).await;
    }

    fn entry(frame: &ServerMessage, target: Option<Coord>) -> RoundLogEntry {
        RoundLogEntry {
            round_id: frame.round_id,
            target,
            frame: frame.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Appends one entry and flushes, reporting failures instead of returning them
    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: RoundLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
