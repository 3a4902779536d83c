//! Grid geometry for the play field
//!
//! Cells are integer coordinates with (0, 0) at the top-left, x growing
//! right and y growing down. Wrapped arithmetic (ghost mode, adversary
//! movement) is always modulo the grid size via `rem_euclid`, so negative
//! coordinates land on the far side instead of UB-ish `%` behavior.

use glam::IVec2;

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};

/// One grid cell
pub type Cell = IVec2;

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step for this direction (y grows downward)
    #[inline]
    pub fn delta(self) -> Cell {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Exact reverse of this direction
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Check if a cell lies inside the grid
#[inline]
pub fn in_bounds(cell: Cell) -> bool {
    cell.x >= 0 && cell.x < GRID_WIDTH && cell.y >= 0 && cell.y < GRID_HEIGHT
}

/// Wrap a cell onto the grid (torus topology)
#[inline]
pub fn wrap(cell: Cell) -> Cell {
    IVec2::new(cell.x.rem_euclid(GRID_WIDTH), cell.y.rem_euclid(GRID_HEIGHT))
}

/// Chebyshev (king-move) distance between two cells
#[inline]
pub fn chebyshev(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Cells of a square footprint centered on `center` with the given
/// half-extent (1 => 3x3), clipped to the grid.
pub fn square_footprint(center: Cell, half: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    for dx in -half..=half {
        for dy in -half..=half {
            let c = center + IVec2::new(dx, dy);
            if in_bounds(c) {
                cells.push(c);
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_direction_deltas_are_unit_steps() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let d = dir.delta();
            assert_eq!(d.x.abs() + d.y.abs(), 1);
        }
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.delta() + dir.opposite().delta(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_wrap_negative_coordinates() {
        assert_eq!(wrap(IVec2::new(-1, 0)), IVec2::new(GRID_WIDTH - 1, 0));
        assert_eq!(wrap(IVec2::new(0, -1)), IVec2::new(0, GRID_HEIGHT - 1));
        assert_eq!(wrap(IVec2::new(GRID_WIDTH, GRID_HEIGHT)), IVec2::ZERO);
    }

    #[test]
    fn test_wrap_inside_grid_is_identity() {
        let c = IVec2::new(3, 7);
        assert_eq!(wrap(c), c);
    }

    #[test]
    fn test_distances() {
        let a = IVec2::new(2, 3);
        let b = IVec2::new(5, 1);
        assert_eq!(chebyshev(a, b), 3);
        assert_eq!(manhattan(a, b), 5);
        assert_eq!(chebyshev(a, a), 0);
    }

    #[test]
    fn test_square_footprint_clips_at_edges() {
        // Corner cell: 3x3 footprint loses the out-of-bounds cells
        let cells = square_footprint(IVec2::new(0, 0), 1);
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| in_bounds(*c)));

        // Interior cell keeps the full 3x3
        let cells = square_footprint(IVec2::new(10, 10), 1);
        assert_eq!(cells.len(), 9);
    }

    proptest! {
        #[test]
        fn test_wrap_always_lands_in_bounds(x in -1000i32..1000, y in -1000i32..1000) {
            let c = wrap(IVec2::new(x, y));
            prop_assert!(in_bounds(c));
        }

        #[test]
        fn test_wrap_is_idempotent(x in -1000i32..1000, y in -1000i32..1000) {
            let once = wrap(IVec2::new(x, y));
            prop_assert_eq!(wrap(once), once);
        }
    }
}
