// Directional safety filter
//
// Runs the exclusion rules (reversal, boundary, self collision, opponent
// collision) for every candidate move and returns which moves are still
// unconditionally safe, plus a risk table for moves that were flagged rather
// than blocked outright.
//
// Rules only ever clear a move; a move cleared by one rule is never made safe
// again by another.

use crate::snapshot::{SnakeView, Snapshot};
use crate::types::{Coord, Direction};

/// Lower is safer
pub type Severity = u32;

/// Why a candidate move was taken out of the safe set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclusion {
    /// Would move back onto the neck
    Reversal,
    OutOfBounds,
    /// Non-tail segment of our own body
    SelfBody,
    /// Our own tail, which normally vacates this turn
    SelfTail,
    /// Non-tail segment of an opponent
    OpponentBody,
    /// An opponent tail, which normally vacates this turn
    OpponentTail,
    /// A cell an equal or longer opponent head can reach this turn
    HeadOn,
}

impl Exclusion {
    /// Outright exclusions never become risk-scored candidates
    pub fn is_outright(&self) -> bool {
        matches!(
            self,
            Exclusion::Reversal
                | Exclusion::OutOfBounds
                | Exclusion::SelfBody
                | Exclusion::OpponentBody
        )
    }

    /// Severity recorded in the risk table, if this exclusion is scoreable
    pub fn severity(&self, policy: &RiskPolicy) -> Option<Severity> {
        match self {
            Exclusion::SelfTail | Exclusion::OpponentTail => Some(policy.tail_severity),
            Exclusion::HeadOn => Some(policy.head_on_severity),
            _ => None,
        }
    }
}

/// Severities assigned to flagged moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskPolicy {
    pub tail_severity: Severity,
    pub head_on_severity: Severity,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        RiskPolicy {
            tail_severity: 1,
            head_on_severity: 2,
        }
    }
}

/// Per-direction safety, remembering the first rule that cleared each move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyState {
    cleared: [Option<Exclusion>; 4],
}

impl SafetyState {
    pub fn all_safe() -> Self {
        SafetyState { cleared: [None; 4] }
    }

    /// Returns a copy with `dir` cleared. An earlier reason is kept.
    #[must_use]
    pub fn clear(mut self, dir: Direction, reason: Exclusion) -> Self {
        let slot = &mut self.cleared[dir.index()];
        if slot.is_none() {
            *slot = Some(reason);
        }
        self
    }

    pub fn is_safe(&self, dir: Direction) -> bool {
        self.cleared[dir.index()].is_none()
    }

    pub fn reason(&self, dir: Direction) -> Option<Exclusion> {
        self.cleared[dir.index()]
    }

    /// Safe moves in evaluation order
    pub fn safe_moves(&self) -> Vec<Direction> {
        Direction::EVALUATION_ORDER
            .iter()
            .copied()
            .filter(|dir| self.is_safe(*dir))
            .collect()
    }

    pub fn any_safe(&self) -> bool {
        self.cleared.iter().any(Option::is_none)
    }
}

/// Severity per flagged move, in the order the moves were first flagged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskTable {
    entries: Vec<(Direction, Severity)>,
}

impl RiskTable {
    pub fn new() -> Self {
        RiskTable::default()
    }

    /// Records `severity` for `dir`. Flagging an already present move keeps
    /// its position and the worse of the two severities.
    #[must_use]
    pub fn flag(mut self, dir: Direction, severity: Severity) -> Self {
        match self.entries.iter_mut().find(|(d, _)| *d == dir) {
            Some(entry) => entry.1 = entry.1.max(severity),
            None => self.entries.push((dir, severity)),
        }
        self
    }

    #[must_use]
    fn without(mut self, dir: Direction) -> Self {
        self.entries.retain(|(d, _)| *d != dir);
        self
    }

    pub fn severity(&self, dir: Direction) -> Option<Severity> {
        self.entries
            .iter()
            .find(|(d, _)| *d == dir)
            .map(|(_, severity)| *severity)
    }

    pub fn entries(&self) -> &[(Direction, Severity)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of the safety filter for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub safety: SafetyState,
    pub risks: RiskTable,
}

/// Runs every exclusion rule against the snapshot
pub fn assess(snapshot: &Snapshot, policy: &RiskPolicy) -> Assessment {
    let findings = findings(snapshot);

    let mut outright = [false; 4];
    let mut safety = SafetyState::all_safe();
    let mut risks = RiskTable::new();

    for (dir, reason) in findings {
        safety = safety.clear(dir, reason);
        if reason.is_outright() {
            outright[dir.index()] = true;
        }
        if let Some(severity) = reason.severity(policy) {
            risks = risks.flag(dir, severity);
        }
    }

    // A blocked move must never come back through the risk scorer, or we
    // could run into a body segment when a tail or head-on cell also matched.
    for dir in Direction::EVALUATION_ORDER {
        if outright[dir.index()] {
            risks = risks.without(dir);
        }
    }

    Assessment { safety, risks }
}

/// Every (move, reason) pair the rules produce, in rule order
pub fn findings(snapshot: &Snapshot) -> Vec<(Direction, Exclusion)> {
    let mut out = Vec::new();

    if let Some(dir) = reverse_direction(snapshot.head, snapshot.neck) {
        out.push((dir, Exclusion::Reversal));
    }

    for dir in Direction::EVALUATION_ORDER {
        if !snapshot.in_bounds(&dir.apply(&snapshot.head)) {
            out.push((dir, Exclusion::OutOfBounds));
        }
    }

    for dir in Direction::EVALUATION_ORDER {
        let target = dir.apply(&snapshot.head);
        if let Some(reason) = body_hit(&snapshot.you, &target, Exclusion::SelfTail, Exclusion::SelfBody) {
            out.push((dir, reason));
        }
    }

    let own_length = snapshot.you.length();
    for opponent in &snapshot.opponents {
        for dir in Direction::EVALUATION_ORDER {
            let target = dir.apply(&snapshot.head);
            if let Some(reason) =
                body_hit(opponent, &target, Exclusion::OpponentTail, Exclusion::OpponentBody)
            {
                out.push((dir, reason));
            }
        }

        if opponent.length() < own_length {
            continue;
        }
        let Some(their_head) = opponent.head() else {
            continue;
        };
        let reachable = their_head.neighbors();
        for dir in Direction::EVALUATION_ORDER {
            if reachable.contains(&dir.apply(&snapshot.head)) {
                out.push((dir, Exclusion::HeadOn));
            }
        }
    }

    out
}

/// The move that would put the head back onto the neck.
///
/// Axes are checked x first; a head stacked on its neck (first turn) has no
/// reverse move.
pub fn reverse_direction(head: Coord, neck: Coord) -> Option<Direction> {
    if neck.x < head.x {
        Some(Direction::Left)
    } else if neck.x > head.x {
        Some(Direction::Right)
    } else if neck.y < head.y {
        Some(Direction::Down)
    } else if neck.y > head.y {
        Some(Direction::Up)
    } else {
        None
    }
}

fn body_hit(
    snake: &SnakeView,
    target: &Coord,
    tail_reason: Exclusion,
    body_reason: Exclusion,
) -> Option<Exclusion> {
    if snake.is_tail(target) {
        Some(tail_reason)
    } else if snake.body.contains(target) {
        Some(body_reason)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board};

    fn snake(name: &str, body: &[(i32, i32)]) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Battlesnake {
            id: name.to_string(),
            name: name.to_string(),
            health: 100,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        }
    }

    fn snapshot(me: &[(i32, i32)], others: &[&[(i32, i32)]]) -> Snapshot {
        let you = snake("me", me);
        let mut snakes = vec![you.clone()];
        for (i, body) in others.iter().enumerate() {
            snakes.push(snake(&format!("opp{}", i), body));
        }
        let board = Board {
            height: 11,
            width: 11,
            food: vec![],
            snakes,
            hazards: vec![],
        };
        Snapshot::ingest(&board, &you, 1).unwrap()
    }

    #[test]
    fn test_reversal_excludes_exactly_one_move() {
        let snap = snapshot(&[(5, 5), (4, 5)], &[]);
        let result = assess(&snap, &RiskPolicy::default());

        assert_eq!(result.safety.reason(Direction::Left), Some(Exclusion::Reversal));
        assert_eq!(
            result.safety.safe_moves(),
            vec![Direction::Down, Direction::Up, Direction::Right]
        );
    }

    #[test]
    fn test_reverse_direction_for_each_axis() {
        let head = Coord::new(5, 5);
        assert_eq!(reverse_direction(head, Coord::new(4, 5)), Some(Direction::Left));
        assert_eq!(reverse_direction(head, Coord::new(6, 5)), Some(Direction::Right));
        assert_eq!(reverse_direction(head, Coord::new(5, 4)), Some(Direction::Down));
        assert_eq!(reverse_direction(head, Coord::new(5, 6)), Some(Direction::Up));
        assert_eq!(reverse_direction(head, head), None);
    }

    #[test]
    fn test_stacked_start_has_no_reversal() {
        let snap = snapshot(&[(5, 5), (5, 5), (5, 5)], &[]);
        let result = assess(&snap, &RiskPolicy::default());
        assert_eq!(result.safety.safe_moves().len(), 4);
        assert!(result.risks.is_empty());
    }

    #[test]
    fn test_walls_block_outright() {
        let snap = snapshot(&[(10, 0), (9, 0)], &[]);
        let result = assess(&snap, &RiskPolicy::default());

        assert_eq!(result.safety.reason(Direction::Right), Some(Exclusion::OutOfBounds));
        assert_eq!(result.safety.reason(Direction::Down), Some(Exclusion::OutOfBounds));
        assert_eq!(result.safety.safe_moves(), vec![Direction::Up]);
        assert!(result.risks.is_empty());
    }

    #[test]
    fn test_own_body_blocks_but_own_tail_is_only_flagged() {
        // Head (5,5); body curls so that up is mid-body and right is the tail
        let snap = snapshot(
            &[(5, 5), (4, 5), (4, 6), (5, 6), (6, 6), (6, 5)],
            &[],
        );
        let result = assess(&snap, &RiskPolicy::default());

        assert_eq!(result.safety.reason(Direction::Up), Some(Exclusion::SelfBody));
        assert_eq!(result.safety.reason(Direction::Right), Some(Exclusion::SelfTail));
        assert_eq!(result.risks.severity(Direction::Right), Some(1));
        assert_eq!(result.risks.severity(Direction::Up), None);
        assert_eq!(result.safety.safe_moves(), vec![Direction::Down]);
    }

    #[test]
    fn test_opponent_body_and_tail() {
        // Opponent occupies (5,6) mid-body and has its tail at (6,5)
        let snap = snapshot(
            &[(5, 5), (5, 4)],
            &[&[(5, 8), (5, 7), (5, 6), (6, 6), (6, 5)]],
        );
        let result = assess(&snap, &RiskPolicy::default());

        assert_eq!(result.safety.reason(Direction::Up), Some(Exclusion::OpponentBody));
        assert_eq!(result.safety.reason(Direction::Right), Some(Exclusion::OpponentTail));
        assert_eq!(result.risks.entries(), &[(Direction::Right, 1)]);
        assert_eq!(result.safety.safe_moves(), vec![Direction::Left]);
    }

    #[test]
    fn test_head_on_only_for_equal_or_longer_opponents() {
        // Opponent head at (7,5) can reach (6,5), our right move
        let longer = snapshot(&[(5, 5), (5, 4)], &[&[(7, 5), (8, 5), (9, 5)]]);
        let result = assess(&longer, &RiskPolicy::default());
        assert_eq!(result.safety.reason(Direction::Right), Some(Exclusion::HeadOn));
        assert_eq!(result.risks.severity(Direction::Right), Some(2));

        let shorter = snapshot(&[(5, 5), (5, 4), (5, 3)], &[&[(7, 5), (8, 5)]]);
        let result = assess(&shorter, &RiskPolicy::default());
        assert!(result.safety.is_safe(Direction::Right));
        assert!(result.risks.is_empty());
    }

    #[test]
    fn test_outright_block_removes_risk_entry() {
        // Opponent head at (9,6) reaches both (10,6) and (9,5); (10,6) is
        // also its neck
        let snap = snapshot(&[(10, 5), (10, 4)], &[&[(9, 6), (10, 6), (10, 7)]]);
        let result = assess(&snap, &RiskPolicy::default());

        assert_eq!(result.safety.reason(Direction::Up), Some(Exclusion::OpponentBody));
        assert_eq!(result.risks.entries(), &[(Direction::Left, 2)]);
        assert_eq!(result.risks.severity(Direction::Up), None);
    }

    #[test]
    fn test_repeated_flag_keeps_position_and_worst_severity() {
        let table = RiskTable::new()
            .flag(Direction::Down, 1)
            .flag(Direction::Up, 1)
            .flag(Direction::Down, 2)
            .flag(Direction::Down, 1);

        assert_eq!(table.entries(), &[(Direction::Down, 2), (Direction::Up, 1)]);
    }

    #[test]
    fn test_safety_state_is_monotonic() {
        let state = SafetyState::all_safe()
            .clear(Direction::Up, Exclusion::OutOfBounds)
            .clear(Direction::Up, Exclusion::HeadOn);

        assert!(!state.is_safe(Direction::Up));
        assert_eq!(state.reason(Direction::Up), Some(Exclusion::OutOfBounds));
        assert!(state.any_safe());
    }
}
