// solver/budgeted.rs - Depth-first branch and bound with path stitching
//
// Heuristic: returns a good path quickly and keeps refining it until the
// wall-clock budget runs out. The result is not guaranteed to be the shortest.
//
// Every cell gets stamped with the smallest depth it was reached at. Reaching a
// stamped cell deeper than before prunes the branch. Reaching it shallower while
// it lies on the incumbent best path splices the current prefix onto the rest of
// the incumbent, which shortens it without searching that suffix again.

use std::time::{Duration, Instant};

use super::{Path, SearchOutcome};
use crate::grid::{Direction, Grid, Point, Walls};

/// Wall-clock budget once a first path exists
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy)]
struct Frame {
    at: Point,
    remaining: Walls,
}

/// Per-run side tables, indexed like the grid
struct Scratch {
    depth: Vec<usize>,
    on_path: Vec<bool>,
    dead_end: Vec<bool>,
}

pub struct BudgetedSearch<'g> {
    grid: &'g Grid,
    entry: Point,
    exit: Point,
    budget: Duration,
}

impl<'g> BudgetedSearch<'g> {
    pub fn new(grid: &'g Grid, entry: Point, exit: Point) -> Self {
        Self {
            grid,
            entry,
            exit,
            budget: DEFAULT_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Search, optionally starting from a previously found path to refine.
    /// Runs without a time limit until some path is known.
    pub fn run(&self, best_so_far: &Path) -> SearchOutcome {
        let grid = self.grid;
        let n = grid.cell_count();
        let mut scratch = Scratch {
            depth: vec![0; n],
            on_path: vec![false; n],
            dead_end: vec![false; n],
        };

        let mut best: Vec<Point> = best_so_far.points().to_vec();
        let mut stack: Vec<Frame> = Vec::new();
        let seed = if best.len() > 1 { best.clone() } else { vec![self.entry] };
        for at in seed {
            scratch.on_path[grid.index(at)] = true;
            stack.push(Frame { at, remaining: Walls::all() });
        }

        // a first path found late earns a short grace period instead of an immediate stop
        let grace = self.budget / 4;
        let start = Instant::now();
        // None: the budget reaches past what an Instant can represent
        let mut deadline = start.checked_add(self.budget);
        let mut paths_found = 0usize;

        while let Some(&Frame { at, remaining }) = stack.last() {
            if !best.is_empty() && deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            let i = stack.len() - 1;
            let len = stack.len();

            if !best.is_empty() && (len + at.manhattan(self.exit) > best.len() || len >= best.len()) {
                pop(&mut stack, &mut scratch, grid);
                continue;
            }

            if at == self.exit {
                paths_found += 1;
                if best.is_empty() || best.len() > len {
                    best = stack.iter().map(|f| f.at).collect();
                    log::trace!("Path #{} with {} cells", paths_found, best.len());
                }
                pop(&mut stack, &mut scratch, grid);
                if paths_found == 1 && start.elapsed() > self.budget.saturating_sub(grace) {
                    deadline = Instant::now().checked_add(grace);
                }
                continue;
            }

            if i > 0 {
                let idx = grid.index(at);
                let old = scratch.depth[idx];
                if old == 0 || old > i {
                    scratch.depth[idx] = i;
                    if old > 0 {
                        if let Some(k) = best.iter().position(|&p| p == at) {
                            let mut spliced: Vec<Point> = stack.iter().map(|f| f.at).collect();
                            spliced.extend_from_slice(&best[k + 1..]);
                            best = spliced;
                            for (j, p) in best.iter().enumerate().skip(i + 1) {
                                scratch.depth[grid.index(*p)] = j;
                            }
                            log::trace!("Stitched at {}, best is now {} cells", at, best.len());
                            pop(&mut stack, &mut scratch, grid);
                            continue;
                        }
                    }
                } else if old < i || (old == i && remaining == Walls::all()) {
                    pop(&mut stack, &mut scratch, grid);
                    continue;
                }
            }

            let moves = Direction::members(remaining)
                .filter(|&d| {
                    grid.step(at, d).is_some_and(|next| {
                        let ni = grid.index(next);
                        !scratch.on_path[ni] && !scratch.dead_end[ni]
                    })
                })
                .fold(Walls::empty(), |acc, d| acc | d.wall());

            let Some(dir) = preferred_direction(at, self.exit, moves) else {
                if i > 0 && grid.walls(at).bits().count_ones() >= 3 {
                    scratch.dead_end[grid.index(at)] = true;
                }
                pop(&mut stack, &mut scratch, grid);
                continue;
            };

            stack[i].remaining = moves - dir.wall();
            if let Some(next) = grid.step(at, dir) {
                scratch.on_path[grid.index(next)] = true;
                stack.push(Frame { at: next, remaining: Walls::all() });
            }
        }

        let exhaustive = stack.is_empty();
        if !exhaustive {
            log::warn!(
                "Search stopped after {:.1}s, the path may not be the shortest",
                start.elapsed().as_secs_f64()
            );
        }
        SearchOutcome {
            path: Path::new(best).erase_loops(),
            exhaustive,
        }
    }
}

fn pop(stack: &mut Vec<Frame>, scratch: &mut Scratch, grid: &Grid) {
    if let Some(frame) = stack.pop() {
        scratch.on_path[grid.index(frame.at)] = false;
    }
}

/// Head for the exit along the longer axis first, then the shorter one,
/// otherwise take the first open side in top, right, bottom, left order
fn preferred_direction(at: Point, exit: Point, moves: Walls) -> Option<Direction> {
    let horizontal = if exit.x > at.x {
        Some(Direction::East)
    } else if exit.x < at.x {
        Some(Direction::West)
    } else {
        None
    };
    let vertical = if exit.y > at.y {
        Some(Direction::South)
    } else if exit.y < at.y {
        Some(Direction::North)
    } else {
        None
    };
    let toward = if at.x.abs_diff(exit.x) > at.y.abs_diff(exit.y) {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    toward
        .into_iter()
        .flatten()
        .chain(Direction::ALL)
        .find(|d| moves.contains(d.wall()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carver::carve;
    use crate::imperfect::break_dead_ends;
    use crate::solver::find_path_bfs;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_grid(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height);
        for p in grid.points().collect::<Vec<_>>() {
            grid.remove_wall(p, Direction::East);
            grid.remove_wall(p, Direction::South);
        }
        grid
    }

    #[test]
    fn test_preferred_direction_follows_longer_axis() {
        let all = Walls::all();
        assert_eq!(preferred_direction(Point::new(0, 0), Point::new(5, 2), all), Some(Direction::East));
        assert_eq!(preferred_direction(Point::new(0, 0), Point::new(2, 2), all), Some(Direction::South));
        assert_eq!(
            preferred_direction(Point::new(0, 0), Point::new(5, 2), Walls::SOUTH | Walls::NORTH),
            Some(Direction::South)
        );
        assert_eq!(
            preferred_direction(Point::new(3, 3), Point::new(5, 3), Walls::WEST | Walls::NORTH),
            Some(Direction::North)
        );
        assert_eq!(preferred_direction(Point::new(0, 0), Point::new(1, 1), Walls::empty()), None);
    }

    #[test]
    fn test_perfect_maze_path_matches_bfs() {
        let mut grid = Grid::new(15, 12);
        carve(&mut grid, Point::new(14, 11), &mut StdRng::seed_from_u64(77));
        let (entry, exit) = (Point::new(0, 0), Point::new(14, 11));

        let outcome = BudgetedSearch::new(&grid, entry, exit).run(&Path::default());
        assert!(outcome.exhaustive);
        assert_eq!(outcome.path, find_path_bfs(&grid, entry, exit));
    }

    #[test]
    fn test_imperfect_maze_path_is_valid() {
        let mut grid = Grid::new(12, 12);
        let mut rng = StdRng::seed_from_u64(5);
        carve(&mut grid, Point::new(11, 11), &mut rng);
        break_dead_ends(&mut grid, 100.0, &mut rng);
        let (entry, exit) = (Point::new(0, 0), Point::new(11, 11));

        let outcome = BudgetedSearch::new(&grid, entry, exit).run(&Path::default());
        let shortest = find_path_bfs(&grid, entry, exit);
        assert!(outcome.path.is_valid_in(&grid, entry, exit));
        assert!(outcome.path.len() >= shortest.len());
    }

    #[test]
    fn test_refines_a_detour_into_the_shortest_path() {
        let grid = open_grid(3, 3);
        let snake: Vec<Point> = [(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1), (0, 2), (1, 2), (2, 2)]
            .into_iter()
            .map(Point::from)
            .collect();
        let (entry, exit) = (Point::new(0, 0), Point::new(2, 2));

        let outcome = BudgetedSearch::new(&grid, entry, exit).run(&Path::new(snake));
        assert!(outcome.exhaustive);
        assert_eq!(outcome.path.len(), 5);
        assert!(outcome.path.is_valid_in(&grid, entry, exit));
    }

    #[test]
    fn test_zero_budget_stops_after_first_path() {
        let mut grid = Grid::new(20, 20);
        let mut rng = StdRng::seed_from_u64(8);
        carve(&mut grid, Point::new(19, 19), &mut rng);
        break_dead_ends(&mut grid, 100.0, &mut rng);
        let (entry, exit) = (Point::new(0, 0), Point::new(19, 19));

        let outcome = BudgetedSearch::new(&grid, entry, exit)
            .with_budget(Duration::ZERO)
            .run(&Path::default());
        assert!(outcome.may_not_be_shortest());
        assert!(outcome.path.is_valid_in(&grid, entry, exit));
    }

    #[test]
    fn test_unbounded_budget_runs_to_exhaustion() {
        let mut grid = Grid::new(6, 6);
        let mut rng = StdRng::seed_from_u64(13);
        carve(&mut grid, Point::new(5, 5), &mut rng);
        break_dead_ends(&mut grid, 100.0, &mut rng);
        let (entry, exit) = (Point::new(0, 0), Point::new(5, 5));

        let outcome = BudgetedSearch::new(&grid, entry, exit)
            .with_budget(Duration::MAX)
            .run(&Path::default());
        assert!(outcome.exhaustive);
        assert!(outcome.path.is_valid_in(&grid, entry, exit));
    }

    #[test]
    fn test_unreachable_exit_exhausts_the_stack() {
        let grid = Grid::new(4, 4);
        let outcome = BudgetedSearch::new(&grid, Point::new(0, 0), Point::new(3, 3)).run(&Path::default());
        assert!(outcome.exhaustive);
        assert!(outcome.path.is_empty());
    }
}
