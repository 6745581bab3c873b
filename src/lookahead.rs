// Local lookahead filter
//
// One-step dead-end check: a safe move whose destination has all four
// neighbours blocked is dropped, unless that would leave no move at all.
//
// Only opponent bodies are marked on the grid. Our own body is not, so the
// check cannot see a trap we build around ourselves.

use crate::snapshot::Snapshot;
use crate::types::{Coord, Direction};

/// Board-sized occupancy map, rebuilt every turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    pub fn empty(width: i32, height: i32) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize);
        OccupancyGrid {
            width,
            height,
            cells: vec![0; size],
        }
    }

    /// Marks every segment of every opponent
    pub fn from_opponents(snapshot: &Snapshot) -> Self {
        let mut grid = OccupancyGrid::empty(snapshot.width, snapshot.height);
        for opponent in &snapshot.opponents {
            for segment in &opponent.body {
                grid.mark(segment);
            }
        }
        grid
    }

    fn offset(&self, coord: &Coord) -> Option<usize> {
        if coord.x < 0 || coord.x >= self.width || coord.y < 0 || coord.y >= self.height {
            return None;
        }
        Some((coord.y as usize) * (self.width as usize) + coord.x as usize)
    }

    /// Off-board coordinates are ignored
    pub fn mark(&mut self, coord: &Coord) {
        if let Some(i) = self.offset(coord) {
            self.cells[i] = 1;
        }
    }

    /// Off-board counts as blocked
    pub fn is_blocked(&self, coord: &Coord) -> bool {
        match self.offset(coord) {
            Some(i) => self.cells[i] != 0,
            None => true,
        }
    }

    /// True when every neighbour of `coord` is blocked
    pub fn is_dead_end(&self, coord: &Coord) -> bool {
        coord.neighbors().iter().all(|n| self.is_blocked(n))
    }
}

/// Drops moves that lead into a dead end. Never returns an empty set when
/// given a non-empty one.
pub fn filter_dead_ends(
    candidates: &[Direction],
    head: &Coord,
    grid: &OccupancyGrid,
) -> Vec<Direction> {
    let open: Vec<Direction> = candidates
        .iter()
        .copied()
        .filter(|dir| !grid.is_dead_end(&dir.apply(head)))
        .collect();

    if open.is_empty() {
        candidates.to_vec()
    } else {
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_board_neighbours_are_blocked() {
        let grid = OccupancyGrid::empty(3, 3);
        assert!(grid.is_blocked(&Coord::new(-1, 0)));
        assert!(grid.is_blocked(&Coord::new(0, 3)));
        assert!(!grid.is_blocked(&Coord::new(1, 1)));
    }

    #[test]
    fn test_dead_end_requires_all_four_neighbours() {
        let mut grid = OccupancyGrid::empty(5, 5);
        let cell = Coord::new(2, 2);
        grid.mark(&Coord::new(2, 3));
        grid.mark(&Coord::new(2, 1));
        grid.mark(&Coord::new(1, 2));
        assert!(!grid.is_dead_end(&cell));

        grid.mark(&Coord::new(3, 2));
        assert!(grid.is_dead_end(&cell));
    }

    #[test]
    fn test_corner_with_two_blocked_neighbours_is_dead_end() {
        let mut grid = OccupancyGrid::empty(5, 5);
        grid.mark(&Coord::new(1, 0));
        grid.mark(&Coord::new(0, 1));
        assert!(grid.is_dead_end(&Coord::new(0, 0)));
    }

    #[test]
    fn test_dead_end_moves_are_removed() {
        let head = Coord::new(2, 2);
        let mut grid = OccupancyGrid::empty(5, 5);
        // Box in (2,3), including the head cell
        for c in Coord::new(2, 3).neighbors().iter() {
            grid.mark(c);
        }

        let kept = filter_dead_ends(&[Direction::Up, Direction::Right], &head, &grid);
        assert_eq!(kept, vec![Direction::Right]);
    }

    #[test]
    fn test_only_candidate_survives_even_if_dead_end() {
        let head = Coord::new(5, 5);
        let mut grid = OccupancyGrid::empty(11, 11);
        for c in Coord::new(5, 6).neighbors().iter() {
            grid.mark(c);
        }

        let kept = filter_dead_ends(&[Direction::Up], &head, &grid);
        assert_eq!(kept, vec![Direction::Up]);
    }
}
