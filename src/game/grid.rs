//! Grid geometry: fitting a cell grid into a container, bounds checks and
//! free-cell selection. Everything here is a pure function of its inputs
//! (plus the caller's RNG).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Position;

/// Minimum number of columns a computed grid tries to fit
pub const MIN_COLUMNS: u32 = 20;
/// Minimum number of rows a computed grid tries to fit
pub const MIN_ROWS: u32 = 15;

/// Grid dimensions in cells, plus the size of one cell in container units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
}

/// Choose the largest cell size (capped at `max_cell_size`) that still fits
/// [`MIN_COLUMNS`] x [`MIN_ROWS`] cells, clamp it up to `min_cell_size`, and
/// derive the column/row counts by floor division.
///
/// Small containers degrade to `min_cell_size` cells, which may yield fewer
/// than the minimum columns/rows (possibly zero). Cell size never drops below 1.
pub fn compute_grid(
    container_width: u32,
    container_height: u32,
    min_cell_size: u32,
    max_cell_size: u32,
) -> GridLayout {
    let cell_size = (container_width / MIN_COLUMNS)
        .min(container_height / MIN_ROWS)
        .min(max_cell_size)
        .max(min_cell_size)
        .max(1);

    GridLayout {
        width: container_width / cell_size,
        height: container_height / cell_size,
        cell_size,
    }
}

/// Check if a position lies inside a `width` x `height` grid
pub fn is_in_bounds(pos: Position, width: u32, height: u32) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as i64) < width as i64 && (pos.y as i64) < height as i64
}

/// Pick a cell not contained in `excluded`.
///
/// Samples uniformly, giving up after `width * height` draws. If sampling
/// never hit a free cell the grid is scanned row by row for one; a completely
/// covered grid returns the last sample.
pub fn pick_free_cell<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    excluded: &[Position],
) -> Position {
    if width == 0 || height == 0 {
        return Position::new(0, 0);
    }

    let max_attempts = width as u64 * height as u64;
    let mut candidate = Position::new(0, 0);

    for _ in 0..max_attempts {
        candidate = Position::new(
            rng.gen_range(0..width) as i32,
            rng.gen_range(0..height) as i32,
        );
        if !excluded.contains(&candidate) {
            return candidate;
        }
    }

    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
        .find(|pos| !excluded.contains(pos))
        .unwrap_or(candidate)
}

/// Manhattan distance between two cells
pub fn manhattan_distance(a: Position, b: Position) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_compute_grid_typical_container() {
        // 800/20 = 40, 600/15 = 40, capped at max 40
        let grid = compute_grid(800, 600, 20, 40);
        assert_eq!(grid, GridLayout { width: 20, height: 15, cell_size: 40 });
    }

    #[test]
    fn test_compute_grid_caps_at_max_cell_size() {
        let grid = compute_grid(1600, 1200, 20, 40);
        assert_eq!(grid.cell_size, 40);
        assert_eq!(grid.width, 40);
        assert_eq!(grid.height, 30);
    }

    #[test]
    fn test_compute_grid_height_bound() {
        // width allows 50px cells, height only 20px
        let grid = compute_grid(1000, 300, 10, 40);
        assert_eq!(grid.cell_size, 20);
        assert_eq!(grid.width, 50);
        assert_eq!(grid.height, 15);
    }

    #[test]
    fn test_compute_grid_clamps_to_min_cell_size() {
        let grid = compute_grid(200, 150, 20, 40);
        assert_eq!(grid.cell_size, 20);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 7);
    }

    #[test]
    fn test_compute_grid_degenerate_container() {
        let grid = compute_grid(0, 0, 0, 40);
        assert_eq!(grid.cell_size, 1);
        assert_eq!(grid.width, 0);
        assert_eq!(grid.height, 0);
    }

    #[test]
    fn test_bounds_checking() {
        assert!(is_in_bounds(Position::new(0, 0), 20, 15));
        assert!(is_in_bounds(Position::new(19, 14), 20, 15));
        assert!(!is_in_bounds(Position::new(-1, 0), 20, 15));
        assert!(!is_in_bounds(Position::new(20, 0), 20, 15));
        assert!(!is_in_bounds(Position::new(0, 15), 20, 15));
    }

    #[test]
    fn test_pick_free_cell_avoids_excluded() {
        let mut rng = StdRng::seed_from_u64(7);
        let excluded = vec![Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)];
        for _ in 0..200 {
            let pos = pick_free_cell(&mut rng, 2, 2, &excluded);
            assert_eq!(pos, Position::new(1, 1));
        }
    }

    #[test]
    fn test_pick_free_cell_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let pos = pick_free_cell(&mut rng, 20, 15, &[]);
            assert!(is_in_bounds(pos, 20, 15));
        }
    }

    #[test]
    fn test_pick_free_cell_terminates_when_full() {
        let mut rng = StdRng::seed_from_u64(1);
        let excluded: Vec<Position> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
            .collect();
        let pos = pick_free_cell(&mut rng, 3, 3, &excluded);
        assert!(is_in_bounds(pos, 3, 3));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan_distance(Position::new(0, 0), Position::new(3, 4)), 7);
        assert_eq!(manhattan_distance(Position::new(-2, 1), Position::new(2, -1)), 6);
    }
}
