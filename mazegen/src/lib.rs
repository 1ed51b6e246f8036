// lib.rs - Library exports for the maze generator
// Grid model, "42" pattern, carving, dead-end removal, path finding and the text file format

pub mod carver;
pub mod error_handling;
pub mod generator;
pub mod grid;
pub mod imperfect;
pub mod params;
pub mod pattern;
pub mod serializer;
pub mod solver;

// Re-export commonly used types
pub use error_handling::{Endpoint, MazeError, Result};
pub use generator::{generate, AnimatedGeneration, Generation, GenerationEvent, Stage};
pub use grid::{Cell, Direction, Grid, Marker, Point, Region, Walls};
pub use params::{MazeParams, DEFAULT_DEAD_END_PROBABILITY};
pub use pattern::{Footprint, Pattern, PlacementError};
pub use serializer::{render, write_maze, MazeFile};
pub use solver::{find_path, find_path_bfs, BudgetedSearch, Path, SearchOutcome, Strategy, DEFAULT_BUDGET};
