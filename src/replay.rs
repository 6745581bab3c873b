// Replay module for checking logged decisions against the engine
//
// This module provides functionality to:
// 1. Parse JSONL decision logs written by the debug logger
// 2. Re-run the deterministic stages of the pipeline on each logged turn
// 3. Check the logged move is one the engine could have returned
// 4. Generate summary reports
//
// Random tie-breaks cannot be reproduced unless a seed is configured, so
// without one a turn is judged by membership in the candidate set.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DecisionRecord;
use crate::engine::{decide, plan, Plan};
use crate::safety::RiskPolicy;
use crate::snapshot::Snapshot;
use crate::types::Direction;

/// Result of replaying a single turn
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub turn: i32,
    pub logged_move: Direction,
    /// Moves the engine could have returned for this turn
    pub allowed: Vec<Direction>,
    /// The exact move, when a seed makes it reproducible
    pub replayed_move: Option<Direction>,
    pub consistent: bool,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub consistent: usize,
    pub inconsistent: usize,
    pub consistency_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    policy: RiskPolicy,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            policy: config.risk.policy(),
            config,
            verbose,
        }
    }

    /// Loads all records from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DecisionRecord>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DecisionRecord = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single record and compares the result
    pub fn replay_entry(&self, entry: &DecisionRecord) -> ReplayResult {
        let start_time = Instant::now();

        let (allowed, replayed_move) = match Snapshot::ingest(&entry.board, &entry.you, entry.turn) {
            Ok(snapshot) => {
                let allowed = match plan(&snapshot, &self.policy) {
                    Plan::Choose(candidates) => candidates,
                    Plan::Risk(choice) => vec![choice.direction()],
                };
                let replayed = self.config.selection.seed.map(|seed| {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(entry.turn as u64));
                    decide(&snapshot, &self.policy, &mut rng).direction
                });
                (allowed, replayed)
            }
            Err(_) => (vec![Direction::FALLBACK], Some(Direction::FALLBACK)),
        };

        let consistent = match replayed_move {
            Some(replayed) => replayed == entry.chosen_move,
            None => allowed.contains(&entry.chosen_move),
        };

        let result = ReplayResult {
            turn: entry.turn,
            logged_move: entry.chosen_move,
            allowed,
            replayed_move,
            consistent,
            computation_time_us: start_time.elapsed().as_micros(),
        };

        if self.verbose {
            if result.consistent {
                info!(
                    "Turn {}: ✓ {} (allowed {:?})",
                    result.turn, result.logged_move, result.allowed
                );
            } else {
                warn!(
                    "Turn {}: ✗ logged {}, allowed {:?}, replayed {:?}",
                    result.turn, result.logged_move, result.allowed, result.replayed_move
                );
            }
        }

        result
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DecisionRecord]) -> Vec<ReplayResult> {
        entries.iter().map(|entry| self.replay_entry(entry)).collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[DecisionRecord],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        turn_numbers
            .iter()
            .map(|turn_num| {
                entries
                    .iter()
                    .find(|e| e.turn == *turn_num)
                    .map(|entry| self.replay_entry(entry))
                    .ok_or_else(|| format!("Turn {} not found in log file", turn_num))
            })
            .collect()
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let consistent = results.iter().filter(|r| r.consistent).count();
        let inconsistent = total_turns - consistent;
        let consistency_rate = if total_turns > 0 {
            (consistent as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            consistent,
            inconsistent,
            consistency_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!(
            "Consistent:     {} ({:.1}%)",
            stats.consistent, stats.consistency_rate
        );
        println!("Inconsistent:   {}", stats.inconsistent);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_us as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}us\n", avg_time);
        }

        let inconsistent: Vec<_> = results.iter().filter(|r| !r.consistent).collect();
        if !inconsistent.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                 INCONSISTENT TURNS");
            println!("═══════════════════════════════════════════════════════════");

            for result in inconsistent {
                println!(
                    "Turn {}: logged {}, allowed {:?}",
                    result.turn,
                    result.logged_move,
                    result.allowed.iter().map(|d| d.as_str()).collect::<Vec<_>>()
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[DecisionRecord],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}
