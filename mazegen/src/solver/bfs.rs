// solver/bfs.rs - Exact shortest path by breadth-first search

use std::collections::VecDeque;

use super::Path;
use crate::grid::{Direction, Grid, Point};

/// Shortest path from `entry` to `exit`, empty if the exit cannot be reached.
/// Neighbours are expanded top, right, bottom, left, so ties resolve the same way every run.
pub fn find_path_bfs(grid: &Grid, entry: Point, exit: Point) -> Path {
    let mut parent: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::from([entry]);
    visited[grid.index(entry)] = true;

    while let Some(p) = queue.pop_front() {
        if p == exit {
            let mut points = vec![p];
            let mut at = grid.index(p);
            while let Some(prev) = parent[at] {
                points.push(grid.point_at(prev));
                at = prev;
            }
            points.reverse();
            return Path::new(points);
        }

        for n in Direction::ALL.into_iter().filter_map(|d| grid.step(p, d)) {
            let i = grid.index(n);
            if !visited[i] {
                visited[i] = true;
                parent[i] = Some(grid.index(p));
                queue.push_back(n);
            }
        }
    }
    Path::default()
}
