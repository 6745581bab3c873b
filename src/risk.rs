// Risk scorer
//
// Only consulted when the safety filter left no unconditionally safe move.

use crate::safety::{RiskTable, Severity};
use crate::types::Direction;

/// Outcome of scoring the risk table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskChoice {
    /// Least severe flagged move
    Scored {
        direction: Direction,
        severity: Severity,
    },
    /// Nothing was flagged; the fixed fallback move is returned
    NoGoodOption,
}

impl RiskChoice {
    pub fn direction(&self) -> Direction {
        match self {
            RiskChoice::Scored { direction, .. } => *direction,
            RiskChoice::NoGoodOption => Direction::FALLBACK,
        }
    }
}

/// Picks the minimum severity, earliest flagged entry winning ties
pub fn least_risky(risks: &RiskTable) -> RiskChoice {
    let mut best: Option<(Direction, Severity)> = None;
    for &(direction, severity) in risks.entries() {
        match best {
            Some((_, current)) if current <= severity => {}
            _ => best = Some((direction, severity)),
        }
    }

    match best {
        Some((direction, severity)) => RiskChoice::Scored {
            direction,
            severity,
        },
        None => RiskChoice::NoGoodOption,
    }
}
