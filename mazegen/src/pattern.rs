// pattern.rs - Decorative "42" glyph stamped into the grid before carving

use std::collections::VecDeque;
use thiserror::Error;

use crate::error_handling::Endpoint;
use crate::grid::{Direction, Grid, Point};

/// Reasons a pattern could not be placed. None of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("pattern is {pattern_width}x{pattern_height} but the maze is only {width}x{height}")]
    TooLarge {
        pattern_width: usize,
        pattern_height: usize,
        width: usize,
        height: usize,
    },

    #[error("pattern would cover the {0} at {1}")]
    CoversEndpoint(Endpoint, Point),

    #[error("pattern would leave no way between entry and exit")]
    SeparatesEndpoints,

    #[error("pattern would wall off {0} cell(s) from the rest of the maze")]
    IsolatesCells(usize),
}

/// Fixed bitmap, `#` marks an impassable cell
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    rows: &'static [&'static str],
}

/// Where a pattern ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    pub origin: Point,
    pub width: usize,
    pub height: usize,
    /// Cells that were made impassable, row-major
    pub cells: Vec<Point>,
}

impl Footprint {
    /// True if `p` lies inside the footprint's bounding box
    pub fn spans(&self, p: Point) -> bool {
        (self.origin.x..self.origin.x + self.width).contains(&p.x)
            && (self.origin.y..self.origin.y + self.height).contains(&p.y)
    }
}

impl Pattern {
    pub const FORTY_TWO: Pattern = Pattern {
        rows: &[
            "#...###",
            "#.....#",
            "###.###",
            "..#.#..",
            "..#.###",
        ],
    };

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_on(&self, x: usize, y: usize) -> bool {
        self.rows[y].as_bytes()[x] == b'#'
    }

    /// Centre the pattern in `grid` and mark its cells impassable.
    /// On any rejection the grid is left untouched.
    pub fn try_place(
        &self,
        grid: &mut Grid,
        entry: Point,
        exit: Point,
    ) -> Result<Footprint, PlacementError> {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 || w > grid.width() || h > grid.height() {
            return Err(PlacementError::TooLarge {
                pattern_width: w,
                pattern_height: h,
                width: grid.width(),
                height: grid.height(),
            });
        }

        let origin = Point::new((grid.width() - w) / 2, (grid.height() - h) / 2);
        let footprint = Footprint {
            origin,
            width: w,
            height: h,
            cells: (0..h)
                .flat_map(|y| (0..w).map(move |x| (x, y)))
                .filter(|&(x, y)| self.is_on(x, y))
                .map(|(x, y)| Point::new(origin.x + x, origin.y + y))
                .collect(),
        };

        check_endpoints(&footprint, grid.height(), entry, exit)?;

        let isolated = isolated_cells(grid, &footprint, exit);
        if isolated > 0 {
            return Err(PlacementError::IsolatesCells(isolated));
        }

        for &p in &footprint.cells {
            grid.mark_pattern(p);
        }
        log::debug!(
            "Placed {}x{} pattern at {} ({} cells)",
            w,
            h,
            origin,
            footprint.cells.len()
        );
        Ok(footprint)
    }
}

/// Accept when both endpoints sit beyond the same edge of the footprint.
/// Otherwise both must be outside it, and the footprint must either leave a
/// row free or have both endpoints on the same side horizontally.
fn check_endpoints(
    footprint: &Footprint,
    grid_height: usize,
    entry: Point,
    exit: Point,
) -> Result<(), PlacementError> {
    let Footprint { origin, width, height, .. } = *footprint;
    let both = |f: &dyn Fn(Point) -> bool| f(entry) && f(exit);

    if both(&|p: Point| p.y < origin.y)
        || both(&|p: Point| p.x < origin.x)
        || both(&|p: Point| p.y >= origin.y + height)
        || both(&|p: Point| p.x >= origin.x + width)
    {
        return Ok(());
    }

    for (which, p) in [(Endpoint::Entry, entry), (Endpoint::Exit, exit)] {
        if footprint.spans(p) {
            return Err(PlacementError::CoversEndpoint(which, p));
        }
    }

    if height < grid_height || both(&|p: Point| p.x < origin.x) || both(&|p: Point| p.x > origin.x) {
        Ok(())
    } else {
        Err(PlacementError::SeparatesEndpoints)
    }
}

/// Count free cells that would be unreachable from `start` once the footprint is blocked
fn isolated_cells(grid: &Grid, footprint: &Footprint, start: Point) -> usize {
    let mut blocked = vec![false; grid.cell_count()];
    for p in grid.points().filter(|&p| grid.is_pattern(p)) {
        blocked[grid.index(p)] = true;
    }
    for &p in &footprint.cells {
        blocked[grid.index(p)] = true;
    }
    let free = blocked.iter().filter(|b| !**b).count();

    let mut seen = blocked;
    let mut queue = VecDeque::from([start]);
    seen[grid.index(start)] = true;
    let mut reached = 1;
    while let Some(p) = queue.pop_front() {
        for n in Direction::ALL.into_iter().filter_map(|d| grid.neighbor(p, d)) {
            let i = grid.index(n);
            if !seen[i] {
                seen[i] = true;
                reached += 1;
                queue.push_back(n);
            }
        }
    }
    free - reached
}
