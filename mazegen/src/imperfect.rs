// imperfect.rs - Turn a perfect maze into one with loops by opening dead ends
//
// Single row-major pass. A wall opened for one cell can change whether a later
// cell still counts as a dead end; that order dependence is part of the output
// a seed produces and must not be replaced by a fixed-point iteration.

use rand::Rng;

use crate::carver::pick_direction;
use crate::grid::{Direction, Grid, Region, Walls};

/// Resumable dead-end scan, see [`crate::carver::CarveState`] for the pattern
#[derive(Debug, Clone)]
pub struct DeadEndState {
    next: usize,
    probability: f64,
}

impl DeadEndState {
    /// `probability` is a percentage; `<= 0` disables the pass, `>= 100` opens every eligible dead end
    pub fn new(probability: f64) -> Self {
        Self { next: 0, probability }
    }

    pub fn step<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Option<Region> {
        if self.probability <= 0.0 {
            return None;
        }
        while self.next < grid.cell_count() {
            let p = grid.point_at(self.next);
            self.next += 1;

            // entry, exit and pattern cells are never touched
            if grid.cell(p).marker().is_some() {
                continue;
            }
            let walls = grid.walls(p);
            if walls.bits().count_ones() != 3 {
                continue;
            }
            if self.probability < 100.0 && rng.gen::<f64>() >= self.probability / 100.0 {
                continue;
            }

            let removable = Direction::members(walls)
                .filter(|&d| grid.neighbor(p, d).is_some_and(|n| !grid.is_pattern(n)))
                .fold(Walls::empty(), |acc, d| acc | d.wall());
            if removable.is_empty() {
                continue;
            }

            let dir = pick_direction(removable, rng);
            grid.remove_wall(p, dir);
            return Some(Region::around(p, grid));
        }
        None
    }
}

/// Animated dead-end removal: one item per opened wall
pub struct DeadEndBreaker<'a, R: ?Sized> {
    grid: &'a mut Grid,
    rng: &'a mut R,
    state: DeadEndState,
}

impl<'a, R: Rng + ?Sized> DeadEndBreaker<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R, probability: f64) -> Self {
        Self {
            grid,
            rng,
            state: DeadEndState::new(probability),
        }
    }
}

impl<R: Rng + ?Sized> Iterator for DeadEndBreaker<'_, R> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        self.state.step(self.grid, self.rng)
    }
}

/// Open extra walls at dead ends. Returns how many walls were removed.
pub fn break_dead_ends<R: Rng + ?Sized>(grid: &mut Grid, probability: f64, rng: &mut R) -> usize {
    let removed = DeadEndBreaker::new(grid, rng, probability).count();
    log::debug!("Removed {} dead-end walls (p={}%)", removed, probability);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::carve;
    use crate::grid::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn perfect(width: usize, height: usize, seed: u64) -> Grid {
        let mut grid = Grid::new(width, height);
        carve(&mut grid, Point::new(0, 0), &mut StdRng::seed_from_u64(seed));
        grid
    }

    fn dead_ends(grid: &Grid) -> usize {
        grid.points()
            .filter(|&p| grid.cell(p).marker().is_none() && grid.walls(p).bits().count_ones() == 3)
            .count()
    }

    #[test]
    fn test_zero_probability_changes_nothing() {
        let mut grid = perfect(9, 7, 5);
        let before = grid.clone();
        assert_eq!(break_dead_ends(&mut grid, 0.0, &mut StdRng::seed_from_u64(1)), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_u_bend_gets_closed_into_a_loop() {
        // (0,0) -> (0,1) -> (1,1) -> (1,0), so (0,0) is a dead end whose only
        // inner wall faces (1,0)
        let mut grid = Grid::new(2, 2);
        grid.remove_wall(Point::new(0, 0), Direction::South);
        grid.remove_wall(Point::new(0, 1), Direction::East);
        grid.remove_wall(Point::new(1, 1), Direction::North);

        let removed = break_dead_ends(&mut grid, 100.0, &mut StdRng::seed_from_u64(0));
        assert_eq!(removed, 1);
        assert!(!grid.has_wall(Point::new(0, 0), Direction::East));
        assert_eq!(grid.passage_count(), 4);
    }

    #[test]
    fn test_border_only_dead_end_is_kept() {
        let mut grid = Grid::new(3, 1);
        grid.remove_wall(Point::new(0, 0), Direction::East);
        grid.remove_wall(Point::new(1, 0), Direction::East);
        assert_eq!(break_dead_ends(&mut grid, 100.0, &mut StdRng::seed_from_u64(0)), 0);
    }

    #[test]
    fn test_full_probability_adds_loops_and_keeps_border() {
        let mut grid = perfect(10, 10, 21);
        let before = dead_ends(&grid);
        let tree_edges = grid.passage_count();

        let removed = break_dead_ends(&mut grid, 100.0, &mut StdRng::seed_from_u64(2));
        assert!(removed > 0);
        assert_eq!(grid.passage_count(), tree_edges + removed);
        assert!(dead_ends(&grid) < before);
        for p in grid.points() {
            if p.y == 0 {
                assert!(grid.has_top_wall(p), "top border opened at {p}");
            }
            if p.x == 9 {
                assert!(grid.has_right_wall(p), "right border opened at {p}");
            }
        }
    }

    #[test]
    fn test_never_opens_into_pattern_or_markers() {
        let mut grid = Grid::new(6, 6);
        grid.mark_pattern(Point::new(3, 3));
        grid.mark_entry(Point::new(0, 0));
        grid.mark_exit(Point::new(5, 5));
        carve(&mut grid, Point::new(5, 5), &mut StdRng::seed_from_u64(9));

        let regions: Vec<Region> =
            DeadEndBreaker::new(&mut grid, &mut StdRng::seed_from_u64(4), 100.0).collect();
        assert!(!regions.is_empty());
        assert_eq!(grid.walls(Point::new(3, 3)), Walls::all());
        assert!(grid.is_pattern(Point::new(3, 3)));
        assert_eq!(grid.cell(Point::new(0, 0)).marker(), Some(crate::grid::Marker::Entry));
        assert_eq!(grid.cell(Point::new(5, 5)).marker(), Some(crate::grid::Marker::Exit));
    }
}
