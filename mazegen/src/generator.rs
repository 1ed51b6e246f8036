// generator.rs - Generation pipeline: validate, place pattern, carve, open dead ends
//
// The pipeline is a pull-based state machine. `generate` simply drains it, so
// the animated and one-shot paths cannot drift apart for the same seed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::carver::CarveState;
use crate::error_handling::Result;
use crate::grid::{Grid, Region};
use crate::imperfect::DeadEndState;
use crate::params::MazeParams;
use crate::pattern::{Footprint, Pattern, PlacementError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pattern,
    Carve,
    DeadEnds,
}

/// One item of the animated pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationEvent {
    /// A single wall was removed; cells in the region need redrawing
    Redraw(Region),
    StageComplete(Stage),
}

/// Finished maze plus what happened to the pattern
#[derive(Debug, Clone)]
pub struct Generation {
    pub grid: Grid,
    pub pattern: Option<Footprint>,
    /// Non-fatal problems, currently only a rejected pattern placement
    pub warnings: Vec<PlacementError>,
}

enum Phase {
    Pattern,
    Carve(CarveState),
    DeadEnds(DeadEndState),
    Done,
}

/// Lazily generated maze, one wall removal per item
pub struct AnimatedGeneration {
    params: MazeParams,
    grid: Grid,
    rng: StdRng,
    phase: Phase,
    pattern: Option<Footprint>,
    warnings: Vec<PlacementError>,
    changes: usize,
}

impl AnimatedGeneration {
    /// Validates `params` and prepares a grid with entry and exit marked.
    /// Nothing is carved until the iterator is pulled.
    pub fn new(params: &MazeParams) -> Result<Self> {
        params.validate()?;

        let mut grid = Grid::new(params.width, params.height);
        grid.mark_entry(params.entry);
        grid.mark_exit(params.exit);

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let phase = if params.insert_pattern {
            Phase::Pattern
        } else {
            Phase::Carve(CarveState::new(&grid, params.exit))
        };

        Ok(Self {
            params: params.clone(),
            grid,
            rng,
            phase,
            pattern: None,
            warnings: Vec::new(),
            changes: 0,
        })
    }

    /// The grid as it currently stands, for incremental drawing
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Run whatever is left and hand over the result
    pub fn into_generation(mut self) -> Generation {
        self.by_ref().for_each(drop);
        Generation {
            grid: self.grid,
            pattern: self.pattern,
            warnings: self.warnings,
        }
    }

    fn place_pattern(&mut self) {
        match Pattern::FORTY_TWO.try_place(&mut self.grid, self.params.entry, self.params.exit) {
            Ok(footprint) => self.pattern = Some(footprint),
            Err(err) => {
                log::warn!("Pattern not placed: {}", err);
                self.warnings.push(err);
            }
        }
    }

    fn finish_carve(&mut self) -> Phase {
        log::debug!("Carving done, {} passages opened", self.changes);
        self.changes = 0;
        if self.params.perfect {
            Phase::Done
        } else {
            Phase::DeadEnds(DeadEndState::new(self.params.dead_end_probability))
        }
    }
}

impl Iterator for AnimatedGeneration {
    type Item = GenerationEvent;

    fn next(&mut self) -> Option<GenerationEvent> {
        match &mut self.phase {
            Phase::Pattern => {
                self.place_pattern();
                self.phase = Phase::Carve(CarveState::new(&self.grid, self.params.exit));
                Some(GenerationEvent::StageComplete(Stage::Pattern))
            }
            Phase::Carve(state) => match state.step(&mut self.grid, &mut self.rng) {
                Some(region) => {
                    self.changes += 1;
                    Some(GenerationEvent::Redraw(region))
                }
                None => {
                    self.phase = self.finish_carve();
                    Some(GenerationEvent::StageComplete(Stage::Carve))
                }
            },
            Phase::DeadEnds(state) => match state.step(&mut self.grid, &mut self.rng) {
                Some(region) => {
                    self.changes += 1;
                    Some(GenerationEvent::Redraw(region))
                }
                None => {
                    log::debug!("Dead-end pass done, {} walls removed", self.changes);
                    self.changes = 0;
                    self.phase = Phase::Done;
                    Some(GenerationEvent::StageComplete(Stage::DeadEnds))
                }
            },
            Phase::Done => None,
        }
    }
}

/// Build a complete maze from validated parameters.
/// Configuration errors are returned before any grid exists.
pub fn generate(params: &MazeParams) -> Result<Generation> {
    let generation = AnimatedGeneration::new(params)?.into_generation();
    log::debug!(
        "Generated {}x{} maze, {} passages",
        params.width,
        params.height,
        generation.grid.passage_count()
    );
    Ok(generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::MazeError;
    use crate::grid::Point;
    use crate::serializer::render;
    use crate::solver::find_path_bfs;

    fn params(width: usize, height: usize) -> MazeParams {
        MazeParams::new(width, height, Point::new(0, 0), Point::new(width - 1, height - 1))
    }

    #[test]
    fn test_small_seeded_maze() {
        let p = params(5, 5).with_seed(1).with_pattern(false);
        let generation = generate(&p).unwrap();
        let grid = &generation.grid;
        assert_eq!(grid.passage_count(), 24);
        assert!(generation.warnings.is_empty());

        let path = find_path_bfs(grid, p.entry, p.exit);
        assert!(path.is_valid_in(grid, p.entry, p.exit));
        assert!(path.steps() >= 8);
        assert_eq!(path.steps() % 2, 0);

        let text = render(grid, p.entry, p.exit, &path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[..5].iter().all(|l| l.len() == 5));
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "0,0");
        assert_eq!(lines[7], "4,4");
        assert_eq!(lines[8].len(), path.len() - 1);
    }

    #[test]
    fn test_entry_equal_to_exit_is_rejected() {
        let p = MazeParams::new(5, 5, Point::new(2, 2), Point::new(2, 2));
        assert!(matches!(generate(&p), Err(MazeError::EntryIsExit(_))));
        assert!(AnimatedGeneration::new(&p).is_err());
    }

    #[test]
    fn test_pattern_too_large_is_a_warning() {
        let p = params(3, 2).with_seed(4);
        let generation = generate(&p).unwrap();
        assert!(generation.pattern.is_none());
        assert!(matches!(generation.warnings.as_slice(), [PlacementError::TooLarge { .. }]));
        assert_eq!(generation.grid.passage_count(), 5);
    }

    #[test]
    fn test_pattern_cells_stay_out_of_the_tree() {
        let p = params(15, 11).with_seed(9);
        let generation = generate(&p).unwrap();
        let footprint = generation.pattern.expect("pattern fits a 15x11 maze");
        for &c in &footprint.cells {
            assert!(generation.grid.is_pattern(c));
        }
        assert_eq!(
            generation.grid.passage_count(),
            15 * 11 - footprint.cells.len() - 1
        );
        assert!(!generation.grid.is_pattern(p.entry));
        assert!(!generation.grid.is_pattern(p.exit));
    }

    #[test]
    fn test_same_seed_same_maze() {
        let p = params(12, 9).with_seed(2024).perfect(false);
        assert_eq!(generate(&p).unwrap().grid, generate(&p).unwrap().grid);
        let other = p.clone().with_seed(2025);
        assert_ne!(generate(&p).unwrap().grid, generate(&other).unwrap().grid);
    }

    #[test]
    fn test_imperfect_maze_has_loops() {
        let p = params(10, 10).with_seed(3).with_pattern(false).perfect(false).with_dead_end_probability(100.0);
        let generation = generate(&p).unwrap();
        assert!(generation.grid.passage_count() > 10 * 10 - 1);
    }

    #[test]
    fn test_animation_matches_one_shot() {
        let p = params(15, 11).with_seed(77).perfect(false);
        let mut animated = AnimatedGeneration::new(&p).unwrap();

        let events: Vec<GenerationEvent> = animated.by_ref().collect();
        let stages: Vec<Stage> = events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::StageComplete(s) => Some(*s),
                GenerationEvent::Redraw(_) => None,
            })
            .collect();
        assert_eq!(stages, [Stage::Pattern, Stage::Carve, Stage::DeadEnds]);
        assert!(animated.is_done());
        assert_eq!(animated.grid(), &generate(&p).unwrap().grid);
    }

    #[test]
    fn test_perfect_animation_skips_dead_end_stage() {
        let p = params(6, 6).with_seed(5).with_pattern(false);
        let events: Vec<GenerationEvent> = AnimatedGeneration::new(&p).unwrap().collect();
        assert_eq!(events.len(), 6 * 6 - 1 + 1);
        assert_eq!(events.last(), Some(&GenerationEvent::StageComplete(Stage::Carve)));
    }
}
