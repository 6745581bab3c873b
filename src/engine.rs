// Per-turn decision pipeline
//
//   ingest -> safety filter -> { safe moves?  -> lookahead -> select }
//                              { none safe    -> risk scorer         }
//
// Nothing here outlives the call; every turn starts from the snapshot alone.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lookahead::{filter_dead_ends, OccupancyGrid};
use crate::risk::{least_risky, RiskChoice};
use crate::safety::{assess, Assessment, RiskPolicy, Severity};
use crate::selector::select;
use crate::snapshot::Snapshot;
use crate::types::{Battlesnake, Board, Direction};

/// How the final move was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DecisionPath {
    /// Exactly one candidate survived the filters
    Single,
    /// Uniform draw among several candidates
    Random { candidates: usize },
    /// No safe move; least severe flagged move
    RiskScored { severity: Severity },
    /// No safe move and nothing flagged
    NoGoodOption,
    /// Payload could not be ingested
    MalformedInput,
}

impl DecisionPath {
    /// True for both last-resort outcomes
    pub fn is_fallback(&self) -> bool {
        matches!(self, DecisionPath::NoGoodOption | DecisionPath::MalformedInput)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub path: DecisionPath,
}

impl Decision {
    fn fallback(path: DecisionPath) -> Self {
        Decision {
            direction: Direction::FALLBACK,
            path,
        }
    }
}

/// Everything the pipeline settles before any randomness is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Candidates left after the safety and lookahead filters, never empty
    Choose(Vec<Direction>),
    /// No safe move existed
    Risk(RiskChoice),
}

impl Plan {
    /// Whether `direction` is a move this plan could produce
    pub fn allows(&self, direction: Direction) -> bool {
        match self {
            Plan::Choose(candidates) => candidates.contains(&direction),
            Plan::Risk(choice) => choice.direction() == direction,
        }
    }
}

/// Runs the deterministic stages: safety filter, then either lookahead or
/// risk scoring
pub fn plan(snapshot: &Snapshot, policy: &RiskPolicy) -> Plan {
    let Assessment { safety, risks } = assess(snapshot, policy);
    debug!(
        "Turn {}: safe {:?}, risks {:?}",
        snapshot.turn,
        safety.safe_moves(),
        risks.entries()
    );

    if !safety.any_safe() {
        return Plan::Risk(least_risky(&risks));
    }

    let grid = OccupancyGrid::from_opponents(snapshot);
    let candidates = filter_dead_ends(&safety.safe_moves(), &snapshot.head, &grid);
    Plan::Choose(candidates)
}

/// Decides a move for an already ingested snapshot
pub fn decide<R: Rng>(snapshot: &Snapshot, policy: &RiskPolicy, rng: &mut R) -> Decision {
    match plan(snapshot, policy) {
        Plan::Choose(candidates) => match select(&candidates, rng) {
            Some(direction) => Decision {
                direction,
                path: if candidates.len() == 1 {
                    DecisionPath::Single
                } else {
                    DecisionPath::Random {
                        candidates: candidates.len(),
                    }
                },
            },
            None => Decision::fallback(DecisionPath::NoGoodOption),
        },
        Plan::Risk(RiskChoice::Scored {
            direction,
            severity,
        }) => Decision {
            direction,
            path: DecisionPath::RiskScored { severity },
        },
        Plan::Risk(RiskChoice::NoGoodOption) => {
            warn!(
                "Turn {}: no good option, falling back to {}",
                snapshot.turn,
                Direction::FALLBACK
            );
            Decision::fallback(DecisionPath::NoGoodOption)
        }
    }
}

/// Ingests the payload and decides. A payload that cannot be ingested yields
/// the fallback move instead of an error.
pub fn decide_turn<R: Rng>(
    board: &Board,
    you: &Battlesnake,
    turn: i32,
    policy: &RiskPolicy,
    rng: &mut R,
) -> Decision {
    match Snapshot::ingest(board, you, turn) {
        Ok(snapshot) => decide(&snapshot, policy, rng),
        Err(e) => {
            warn!(
                "Turn {}: malformed input ({}), falling back to {}",
                turn,
                e,
                Direction::FALLBACK
            );
            Decision::fallback(DecisionPath::MalformedInput)
        }
    }
}
