// Debug logging module for asynchronous decision logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each decided turn is written to a JSONL file
// that the replay tool can read back.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::engine::DecisionPath;
use crate::types::{Battlesnake, Board, Direction};

/// One line of the decision log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub game_id: String,
    pub turn: i32,
    pub you: Battlesnake,
    pub board: Board,
    pub chosen_move: Direction,
    pub path: DecisionPath,
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
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
            return DebugLogger::disabled();
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
                DebugLogger::disabled()
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

    /// Logs a decision asynchronously (fire-and-forget).
    /// Outside a tokio runtime the record is dropped.
    pub fn log_decision(&self, record: DecisionRecord) {
        if !self.enabled {
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("No async runtime, dropping debug record for turn {}", record.turn);
                return;
            }
        };

        let file_handle = self.file.clone();
        handle.spawn(async move {
            Self::write_record(file_handle, record).await;
        });
    }

    /// Appends one record and flushes. Returns false if nothing was written.
    async fn write_record(file_handle: Arc<Mutex<Option<File>>>, record: DecisionRecord) -> bool {
        let mut file_guard = file_handle.lock().await;

        let Some(file) = file_guard.as_mut() else {
            return false;
        };

        let json_line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
                return false;
            }
        };

        if let Err(e) = file.write_all(format!("{}\n", json_line).as_bytes()).await {
            error!("Failed to write debug log entry: {}", e);
            return false;
        }
        // Flush to ensure data is written to disk
        if let Err(e) = file.flush().await {
            error!("Failed to flush debug log: {}", e);
            return false;
        }
        true
    }

    /// Writes a record and waits for it, for callers that need the line on
    /// disk before continuing
    pub async fn log_decision_now(&self, record: DecisionRecord) -> bool {
        if !self.enabled {
            return false;
        }
        Self::write_record(self.file.clone(), record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn record(turn: i32) -> DecisionRecord {
        let you = Battlesnake {
            id: "me".to_string(),
            name: "me".to_string(),
            health: 90,
            body: vec![Coord::new(1, 1), Coord::new(1, 0)],
            head: Coord::new(1, 1),
            length: 2,
            latency: "0".to_string(),
            shout: None,
        };
        DecisionRecord {
            game_id: "g".to_string(),
            turn,
            board: Board {
                height: 11,
                width: 11,
                food: vec![],
                snakes: vec![you.clone()],
                hazards: vec![],
            },
            you,
            chosen_move: Direction::Up,
            path: DecisionPath::Random { candidates: 3 },
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_logger_writes_nothing() {
        let logger = DebugLogger::disabled();
        assert!(!logger.is_enabled());
        assert!(!logger.log_decision_now(record(1)).await);
    }

    #[tokio::test]
    async fn test_records_are_written_as_json_lines() {
        let path = std::env::temp_dir().join(format!(
            "debug_logger_test_{}.jsonl",
            std::process::id()
        ));
        let path_str = path.to_string_lossy().to_string();

        let logger = DebugLogger::new(true, &path_str).await;
        assert!(logger.is_enabled());
        assert!(logger.log_decision_now(record(1)).await);
        assert!(logger.log_decision_now(record(2)).await);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: DecisionRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.turn, 2);
        assert_eq!(parsed.chosen_move, Direction::Up);
        assert_eq!(parsed.path, DecisionPath::Random { candidates: 3 });

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_logging_outside_runtime_is_a_no_op() {
        let logger = DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: true,
        };
        logger.log_decision(record(1));
    }
}
