// carver.rs - Randomized depth-first backtracker producing a perfect maze
//
// The carve runs on an explicit frame stack. Each frame remembers which of its
// four sides are still worth trying, so backtracking never re-rolls a side.

use rand::Rng;

use crate::grid::{Direction, Grid, Point, Region, Walls};

#[derive(Debug, Clone, Copy)]
struct Frame {
    at: Point,
    remaining: Walls,
}

/// Pick one direction uniformly from a non-empty wall set
pub(crate) fn pick_direction<R: Rng + ?Sized>(walls: Walls, rng: &mut R) -> Direction {
    let mut options = [Direction::North; 4];
    let mut n = 0;
    for d in Direction::members(walls) {
        options[n] = d;
        n += 1;
    }
    options[rng.gen_range(0..n)]
}

/// Resumable carving state. The grid and random source are lent per step,
/// so the same state can drive both the one-shot and the animated carve.
#[derive(Debug, Clone)]
pub struct CarveState {
    stack: Vec<Frame>,
    visited: Vec<bool>,
}

impl CarveState {
    pub fn new(grid: &Grid, start: Point) -> Self {
        let mut visited = vec![false; grid.cell_count()];
        visited[grid.index(start)] = true;
        Self {
            stack: vec![Frame { at: start, remaining: Walls::all() }],
            visited,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stack.is_empty()
    }

    /// Backtrack until some cell has an unvisited neighbour, open one wall
    /// towards it and report the touched area. `None` once every reachable
    /// cell is part of the tree.
    pub fn step<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Option<Region> {
        while let Some(top) = self.stack.last_mut() {
            let at = top.at;
            let open = Direction::members(top.remaining)
                .filter(|&d| {
                    grid.neighbor(at, d).is_some_and(|n| {
                        !grid.is_pattern(n) && !self.visited[grid.index(n)]
                    })
                })
                .fold(Walls::empty(), |acc, d| acc | d.wall());

            if open.is_empty() {
                self.stack.pop();
                continue;
            }

            let dir = pick_direction(open, rng);
            top.remaining = open - dir.wall();

            let next = grid.neighbor(at, dir)?;
            grid.remove_wall(at, dir);
            self.visited[grid.index(next)] = true;
            self.stack.push(Frame { at: next, remaining: Walls::all() });
            return Some(Region::around(at, grid));
        }
        None
    }
}

/// Animated carve: each item is the redraw area after one wall removal
pub struct Carver<'a, R: ?Sized> {
    grid: &'a mut Grid,
    rng: &'a mut R,
    state: CarveState,
}

impl<'a, R: Rng + ?Sized> Carver<'a, R> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut R, start: Point) -> Self {
        let state = CarveState::new(grid, start);
        Self { grid, rng, state }
    }
}

impl<R: Rng + ?Sized> Iterator for Carver<'_, R> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        self.state.step(self.grid, self.rng)
    }
}

/// Carve a spanning tree over every non-pattern cell reachable from `start`.
/// Returns the number of walls removed.
pub fn carve<R: Rng + ?Sized>(grid: &mut Grid, start: Point, rng: &mut R) -> usize {
    let carved = Carver::new(grid, rng, start).count();
    log::debug!("Carved {} passages from {}", carved, start);
    carved
}
