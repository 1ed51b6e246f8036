// solver/mod.rs - Paths through the maze and the two search strategies

pub mod bfs;
pub mod budgeted;

pub use bfs::find_path_bfs;
pub use budgeted::{BudgetedSearch, DEFAULT_BUDGET};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::grid::{Direction, Grid, Point};

/// Ordered cells from entry to exit. Empty means "no path".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Walk from `start` following `directions`. `None` if a step leaves the
    /// non-negative quadrant.
    pub fn replay(start: Point, directions: impl IntoIterator<Item = Direction>) -> Option<Path> {
        let mut points = vec![start];
        let mut at = start;
        for dir in directions {
            at = match dir {
                Direction::North => Point::new(at.x, at.y.checked_sub(1)?),
                Direction::East => Point::new(at.x + 1, at.y),
                Direction::South => Point::new(at.x, at.y + 1),
                Direction::West => Point::new(at.x.checked_sub(1)?, at.y),
            };
            points.push(at);
        }
        Some(Path { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of moves, one less than the number of cells
    pub fn steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.points.contains(&p)
    }

    /// Direction of every move, or the index of the first move that is not a
    /// single orthogonal step
    pub fn directions(&self) -> Result<Vec<Direction>, usize> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(i, w)| Direction::between(w[0], w[1]).ok_or(i))
            .collect()
    }

    /// True if the path runs from `entry` to `exit` through open walls only
    pub fn is_valid_in(&self, grid: &Grid, entry: Point, exit: Point) -> bool {
        if self.points.first() != Some(&entry) || self.points.last() != Some(&exit) {
            return false;
        }
        self.points.iter().all(|&p| grid.contains(p))
            && self.points.windows(2).all(|w| {
                Direction::between(w[0], w[1]).is_some_and(|d| grid.step(w[0], d) == Some(w[1]))
            })
    }

    /// Cut out every cycle so no cell appears twice
    pub fn erase_loops(self) -> Path {
        let mut seen: HashMap<Point, usize> = HashMap::with_capacity(self.points.len());
        let mut points: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in self.points {
            if let Some(&at) = seen.get(&p) {
                for dropped in points.drain(at + 1..) {
                    seen.remove(&dropped);
                }
            } else {
                seen.insert(p, points.len());
                points.push(p);
            }
        }
        Path { points }
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Result of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub path: Path,
    /// False when the search stopped on its time budget before exploring everything
    pub exhaustive: bool,
}

impl SearchOutcome {
    pub fn may_not_be_shortest(&self) -> bool {
        !self.exhaustive
    }
}

/// Which path finder to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Exact shortest path
    #[default]
    BreadthFirst,
    /// Depth-first branch and bound with path stitching, stopped by a wall-clock budget
    Budgeted { budget: Duration },
}

/// Run one strategy from `entry` to `exit`.
/// An empty path here means the grid is not connected, which carving rules out.
pub fn find_path(grid: &Grid, entry: Point, exit: Point, strategy: Strategy) -> SearchOutcome {
    let outcome = match strategy {
        Strategy::BreadthFirst => SearchOutcome {
            path: find_path_bfs(grid, entry, exit),
            exhaustive: true,
        },
        Strategy::Budgeted { budget } => BudgetedSearch::new(grid, entry, exit)
            .with_budget(budget)
            .run(&Path::default()),
    };
    if outcome.path.is_empty() {
        log::error!("Internal inconsistency: no path from {} to {} in a carved maze", entry, exit);
    }
    outcome
}
