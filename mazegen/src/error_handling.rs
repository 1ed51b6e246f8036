// error_handling.rs - Error taxonomy for maze generation, search and file I/O

use std::path::PathBuf;
use thiserror::Error;

use crate::grid::Point;

/// Which endpoint a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Entry,
    Exit,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Entry => f.write_str("Entry"),
            Endpoint::Exit => f.write_str("Exit"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("Maze dimensions must be at least 1x1 (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Entry and exit must be different (both at {0})")]
    EntryIsExit(Point),

    #[error("{which} must be inside the maze ({which}={point}, width={width}, height={height})")]
    OutOfBounds {
        which: Endpoint,
        point: Point,
        width: usize,
        height: usize,
    },

    #[error("Dead-end removal probability must be within 0..=100 (got {0})")]
    InvalidProbability(f64),

    #[error("Can't save the maze, output file name not defined")]
    NoOutputPath,

    #[error("Failed to write maze file {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read maze file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not a chain of adjacent cells (move {0})")]
    BrokenPath(usize),

    #[error("Malformed maze file at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, MazeError>;

impl MazeError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        MazeError::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// True for errors raised by parameter validation, before any grid exists
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MazeError::InvalidDimensions { .. }
                | MazeError::EntryIsExit(_)
                | MazeError::OutOfBounds { .. }
                | MazeError::InvalidProbability(_)
        )
    }
}
