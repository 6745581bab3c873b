// Board snapshot ingest
//
// Normalizes the wire payload into the per-turn model the decision pipeline
// works on. A snapshot is built at the start of a turn and dropped at its end.

use std::error::Error;
use std::fmt;

use crate::types::{Battlesnake, Board, Coord};

/// Largest accepted board side
pub const MAX_BOARD_DIMENSION: i32 = 255;

/// Reasons a payload cannot be turned into a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Our own body needs at least a head and a neck
    SelfTooShort { segments: usize },
    /// Width or height not positive, or above `MAX_BOARD_DIMENSION`
    InvalidDimensions { width: i32, height: i32 },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::SelfTooShort { segments } => write!(
                f,
                "own body has {} segment(s), need at least head and neck",
                segments
            ),
            IngestError::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {}x{}", width, height)
            }
        }
    }
}

impl Error for IngestError {}

/// One snake as seen by the engine: head at index 0, tail last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeView {
    pub name: String,
    pub body: Vec<Coord>,
    pub health: i32,
}

impl SnakeView {
    fn from_wire(snake: &Battlesnake) -> Self {
        SnakeView {
            name: snake.name.clone(),
            body: snake.body.clone(),
            health: snake.health,
        }
    }

    /// Derived from the body, not from the payload's `length` field
    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }

    pub fn tail(&self) -> Option<Coord> {
        self.body.last().copied()
    }

    /// True when `coord` is where the tail currently sits
    pub fn is_tail(&self, coord: &Coord) -> bool {
        self.tail().as_ref() == Some(coord)
    }
}

/// Our snake plus the opponents, in the engine's terms
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    pub turn: i32,
    pub food: Vec<Coord>,
    pub you: SnakeView,
    pub head: Coord,
    pub neck: Coord,
    pub opponents: Vec<SnakeView>,
}

impl Snapshot {
    /// Builds a snapshot from the board and our own snake.
    ///
    /// Self is matched by name; every other snake on the board is an
    /// opponent. Opponents with no body segments carry no position and are
    /// dropped.
    pub fn ingest(board: &Board, you: &Battlesnake, turn: i32) -> Result<Self, IngestError> {
        let valid = 1..=MAX_BOARD_DIMENSION;
        if !valid.contains(&board.width) || !valid.contains(&board.height) {
            return Err(IngestError::InvalidDimensions {
                width: board.width,
                height: board.height,
            });
        }

        let (head, neck) = match (you.body.first(), you.body.get(1)) {
            (Some(head), Some(neck)) => (*head, *neck),
            _ => {
                return Err(IngestError::SelfTooShort {
                    segments: you.body.len(),
                })
            }
        };

        let opponents = board
            .snakes
            .iter()
            .filter(|snake| snake.name != you.name)
            .filter(|snake| !snake.body.is_empty())
            .map(SnakeView::from_wire)
            .collect();

        Ok(Snapshot {
            width: board.width,
            height: board.height,
            turn,
            food: board.food.clone(),
            you: SnakeView::from_wire(you),
            head,
            neck,
            opponents,
        })
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }
}
