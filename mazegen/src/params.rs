// params.rs - Maze parameter record and its validation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error_handling::{Endpoint, MazeError, Result};
use crate::grid::Point;

pub const DEFAULT_DEAD_END_PROBABILITY: f64 = 99.0;

/// Everything the pipeline needs to build, solve and save one maze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeParams {
    pub width: usize,
    pub height: usize,
    pub entry: Point,
    pub exit: Point,
    #[serde(default = "default_true")]
    pub perfect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub insert_pattern: bool,
    /// Chance (percent) that a dead end gets an extra wall removed; imperfect mazes only
    #[serde(default = "default_probability")]
    pub dead_end_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_probability() -> f64 {
    DEFAULT_DEAD_END_PROBABILITY
}

impl MazeParams {
    pub fn new(width: usize, height: usize, entry: Point, exit: Point) -> Self {
        Self {
            width,
            height,
            entry,
            exit,
            perfect: true,
            seed: None,
            insert_pattern: true,
            dead_end_probability: DEFAULT_DEAD_END_PROBABILITY,
            output_file: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn perfect(mut self, perfect: bool) -> Self {
        self.perfect = perfect;
        self
    }

    pub fn with_pattern(mut self, insert: bool) -> Self {
        self.insert_pattern = insert;
        self
    }

    pub fn with_dead_end_probability(mut self, percent: f64) -> Self {
        self.dead_end_probability = percent;
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Reject parameters the pipeline cannot work with. Nothing is repaired.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MazeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.entry == self.exit {
            return Err(MazeError::EntryIsExit(self.entry));
        }
        for (which, point) in [(Endpoint::Entry, self.entry), (Endpoint::Exit, self.exit)] {
            if point.x >= self.width || point.y >= self.height {
                return Err(MazeError::OutOfBounds {
                    which,
                    point,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        if !(0.0..=100.0).contains(&self.dead_end_probability) {
            return Err(MazeError::InvalidProbability(self.dead_end_probability));
        }
        Ok(())
    }
}
