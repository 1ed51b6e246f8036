// grid.rs - Cell bit encoding and wall queries for the rectangular maze grid
//
// Every cell owns only its top and right walls. Bottom and left walls are read
// from the neighbour below / to the left, and the outer border is always walled.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

const TOP_WALL: u8 = 0x1;
const RIGHT_WALL: u8 = 0x2;
const MARKER_MASK: u8 = 0xC;
const ENTRY_MARK: u8 = 0x4;
const EXIT_MARK: u8 = 0x8;
const PATTERN_MARK: u8 = 0xF;

bitflags! {
    /// Set of walls around a cell, using the serialized nibble layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Walls: u8 {
        const NORTH = 0x1;
        const EAST = 0x2;
        const SOUTH = 0x4;
        const WEST = 0x8;
    }
}

// ============================================================================
// COORDINATES AND DIRECTIONS
// ============================================================================

/// Cell coordinate, `x` is the column and `y` the row (row 0 at the top)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(usize, usize)> for Point {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Top, right, bottom, left: the order every scan in this crate uses
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub fn wall(self) -> Walls {
        match self {
            Direction::North => Walls::NORTH,
            Direction::East => Walls::EAST,
            Direction::South => Walls::SOUTH,
            Direction::West => Walls::WEST,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }

    pub fn from_char(c: char) -> Option<Direction> {
        match c {
            'N' => Some(Direction::North),
            'E' => Some(Direction::East),
            'S' => Some(Direction::South),
            'W' => Some(Direction::West),
            _ => None,
        }
    }

    /// Direction of a single orthogonal step, `None` for diagonal, distant or zero moves
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        if from.manhattan(to) != 1 {
            return None;
        }
        Some(if to.x > from.x {
            Direction::East
        } else if to.x < from.x {
            Direction::West
        } else if to.y > from.y {
            Direction::South
        } else {
            Direction::North
        })
    }

    /// Directions contained in a wall set, in `ALL` order
    pub fn members(walls: Walls) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| walls.contains(d.wall()))
    }
}

/// Inclusive rectangle of cells that changed, for incremental redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Region {
    /// The cell plus a one-cell margin, clamped to the grid
    pub fn around(p: Point, grid: &Grid) -> Self {
        Self {
            x1: p.x.saturating_sub(1),
            y1: p.y.saturating_sub(1),
            x2: (p.x + 1).min(grid.width() - 1),
            y2: (p.y + 1).min(grid.height() - 1),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        (self.x1..=self.x2).contains(&p.x) && (self.y1..=self.y2).contains(&p.y)
    }
}

// ============================================================================
// CELL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Entry,
    Exit,
    Pattern,
}

/// One grid cell: bit 0 top wall, bit 1 right wall, bits 2-3 marker
/// (`0x4` entry, `0x8` exit, `0xF` as a whole means pattern)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const CLOSED: Cell = Cell(TOP_WALL | RIGHT_WALL);
    pub const PATTERN: Cell = Cell(PATTERN_MARK);

    /// Raw value as a renderer sees it (`0x7` entry, `0xB` exit, `0xF` pattern, ...)
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn has_top_wall(self) -> bool {
        self.0 & TOP_WALL != 0
    }

    #[inline]
    pub fn has_right_wall(self) -> bool {
        self.0 & RIGHT_WALL != 0
    }

    pub fn marker(self) -> Option<Marker> {
        match self.0 & MARKER_MASK {
            0 => None,
            ENTRY_MARK => Some(Marker::Entry),
            EXIT_MARK => Some(Marker::Exit),
            _ => Some(Marker::Pattern),
        }
    }

    #[inline]
    pub fn is_pattern(self) -> bool {
        self.0 & MARKER_MASK == MARKER_MASK
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Row-major maze grid. Coordinates passed in are trusted to be inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Every cell starts closed (top and right walls present, no marker)
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::CLOSED; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }

    #[inline]
    pub fn index(&self, p: Point) -> usize {
        p.y * self.width + p.x
    }

    #[inline]
    pub fn point_at(&self, index: usize) -> Point {
        Point::new(index % self.width, index / self.width)
    }

    #[inline]
    pub fn cell(&self, p: Point) -> Cell {
        self.cells[self.index(p)]
    }

    /// All coordinates in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.cells.len()).map(move |i| self.point_at(i))
    }

    pub fn mark_entry(&mut self, p: Point) {
        let i = self.index(p);
        self.cells[i].0 = (self.cells[i].0 & !MARKER_MASK) | ENTRY_MARK;
    }

    pub fn mark_exit(&mut self, p: Point) {
        let i = self.index(p);
        self.cells[i].0 = (self.cells[i].0 & !MARKER_MASK) | EXIT_MARK;
    }

    pub fn mark_pattern(&mut self, p: Point) {
        let i = self.index(p);
        self.cells[i] = Cell::PATTERN;
    }

    #[inline]
    pub fn is_pattern(&self, p: Point) -> bool {
        self.cell(p).is_pattern()
    }

    pub fn has_top_wall(&self, p: Point) -> bool {
        self.cell(p).has_top_wall()
    }

    pub fn has_right_wall(&self, p: Point) -> bool {
        self.cell(p).has_right_wall()
    }

    pub fn has_bottom_wall(&self, p: Point) -> bool {
        p.y + 1 >= self.height || self.cell(Point::new(p.x, p.y + 1)).has_top_wall()
    }

    pub fn has_left_wall(&self, p: Point) -> bool {
        p.x == 0 || self.cell(Point::new(p.x - 1, p.y)).has_right_wall()
    }

    /// Effective wall on one side, the outer border included
    pub fn has_wall(&self, p: Point, dir: Direction) -> bool {
        match dir {
            Direction::North => p.y == 0 || self.has_top_wall(p),
            Direction::East => p.x + 1 >= self.width || self.has_right_wall(p),
            Direction::South => self.has_bottom_wall(p),
            Direction::West => self.has_left_wall(p),
        }
    }

    /// Effective wall set of a cell, markers stripped
    pub fn walls(&self, p: Point) -> Walls {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.has_wall(p, d))
            .fold(Walls::empty(), |acc, d| acc | d.wall())
    }

    /// Adjacent in-bounds cell, regardless of walls
    pub fn neighbor(&self, p: Point, dir: Direction) -> Option<Point> {
        match dir {
            Direction::North if p.y > 0 => Some(Point::new(p.x, p.y - 1)),
            Direction::East if p.x + 1 < self.width => Some(Point::new(p.x + 1, p.y)),
            Direction::South if p.y + 1 < self.height => Some(Point::new(p.x, p.y + 1)),
            Direction::West if p.x > 0 => Some(Point::new(p.x - 1, p.y)),
            _ => None,
        }
    }

    /// Neighbour reachable through an open wall, never a pattern cell
    pub fn step(&self, p: Point, dir: Direction) -> Option<Point> {
        if self.has_wall(p, dir) {
            return None;
        }
        self.neighbor(p, dir).filter(|&n| !self.is_pattern(n))
    }

    /// Clear the wall between `p` and its neighbour in `dir`.
    /// Returns false (and changes nothing) for the outer border.
    pub fn remove_wall(&mut self, p: Point, dir: Direction) -> bool {
        let Some(n) = self.neighbor(p, dir) else {
            return false;
        };
        let (owner, bit) = match dir {
            Direction::North => (p, TOP_WALL),
            Direction::East => (p, RIGHT_WALL),
            Direction::South => (n, TOP_WALL),
            Direction::West => (n, RIGHT_WALL),
        };
        let i = self.index(owner);
        self.cells[i].0 &= !bit;
        true
    }

    /// Number of open interior walls, i.e. edges of the passage graph
    pub fn passage_count(&self) -> usize {
        self.points()
            .map(|p| {
                [Direction::East, Direction::South]
                    .into_iter()
                    .filter(|&d| self.neighbor(p, d).is_some() && !self.has_wall(p, d))
                    .count()
            })
            .sum()
    }
}
