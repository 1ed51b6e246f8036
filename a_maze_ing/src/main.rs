// main.rs - Command line maze generator: read config, build, solve, save

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use mazegen::{
    find_path, generate, write_maze, AnimatedGeneration, Generation, GenerationEvent, MazeFile, MazeParams,
    Strategy, DEFAULT_BUDGET,
};

mod config;

use crate::config::Config;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Solver {
    /// Exact shortest path
    Bfs,
    /// Depth-first search with path stitching, stopped by --search-budget
    Budgeted,
}

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a maze, solve it and save it as text", long_about = None)]
pub struct Args {
    /// Configuration file with KEY=VALUE lines
    pub config: PathBuf,

    /// Output file, overrides OUTPUT_FILE
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Random seed, overrides SEED
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Open extra walls at dead ends, overrides PERFECT
    #[arg(long)]
    pub imperfect: bool,

    /// Do not stamp the "42" pattern
    #[arg(long)]
    pub no_pattern: bool,

    /// Path finder
    #[arg(long, value_enum, default_value_t = Solver::Bfs)]
    pub solver: Solver,

    /// Wall-clock budget for the budgeted solver, in seconds
    #[arg(long, default_value_t = DEFAULT_BUDGET.as_secs_f64())]
    pub search_budget: f64,

    /// Build the maze step by step and log every redraw region
    #[arg(long)]
    pub animate: bool,
}

impl Args {
    fn strategy(&self) -> Result<Strategy> {
        Ok(match self.solver {
            Solver::Bfs => Strategy::BreadthFirst,
            Solver::Budgeted => {
                let budget = Duration::try_from_secs_f64(self.search_budget).with_context(|| {
                    format!(
                        "--search-budget must be a non-negative number of seconds within range (got {})",
                        self.search_budget
                    )
                })?;
                Strategy::Budgeted { budget }
            }
        })
    }

    /// Apply command line overrides on top of the config file
    fn apply(&self, mut params: MazeParams) -> MazeParams {
        if let Some(output) = &self.output {
            params = params.with_output_file(output);
        }
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        if self.imperfect {
            params = params.perfect(false);
        }
        if self.no_pattern {
            params = params.with_pattern(false);
        }
        params
    }
}

/// Drive the animated pipeline; there is no window, so redraws only go to the log
fn animate(params: &MazeParams) -> Result<Generation> {
    let mut animated = AnimatedGeneration::new(params)?;
    let mut redraws = 0usize;
    for event in animated.by_ref() {
        match event {
            GenerationEvent::Redraw(r) => {
                redraws += 1;
                debug!("Redraw ({},{})-({},{})", r.x1, r.y1, r.x2, r.y2);
            }
            GenerationEvent::StageComplete(stage) => {
                info!("{:?} stage complete ({} redraws so far)", stage, redraws);
            }
        }
    }
    Ok(animated.into_generation())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let config = Config::load(&args.config)?;
    let params = args.apply(config.to_params()?);
    params.validate().context("Invalid maze configuration")?;
    let strategy = args.strategy()?;
    info!("Maze config: {}", serde_json::to_string(&params)?);

    let start = Instant::now();
    let generation = if args.animate {
        animate(&params)?
    } else {
        generate(&params)?
    };
    info!(
        "Generated {}x{} maze in {:.3}s (pattern: {})",
        params.width,
        params.height,
        start.elapsed().as_secs_f64(),
        if generation.pattern.is_some() { "placed" } else { "not placed" }
    );

    let start = Instant::now();
    let outcome = find_path(&generation.grid, params.entry, params.exit, strategy);
    info!("Time: {:.6} sec.", start.elapsed().as_secs_f64());
    info!("Path length: {}", outcome.path.len());
    if outcome.may_not_be_shortest() {
        warn!("Search ran out of time, the saved path may not be the shortest");
    }

    let file = write_maze(&generation.grid, &params, &outcome.path).context("Failed to save the maze")?;
    let saved = MazeFile::read(&file).context("Failed to read back the saved maze")?;
    ensure!(
        saved.path == outcome.path,
        "Saved path differs from the computed one ({} vs {} cells)",
        saved.path.len(),
        outcome.path.len()
    );
    info!("The maze saved to file '{}'", file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(["a-maze-ing", "maze.env"].iter().chain(extra)).unwrap()
    }

    #[test]
    fn test_default_solver_is_bfs() {
        assert_eq!(args(&[]).strategy().unwrap(), Strategy::BreadthFirst);
    }

    #[test]
    fn test_search_budget_in_seconds() {
        let strategy = args(&["--solver", "budgeted", "--search-budget", "1.5"]).strategy().unwrap();
        assert_eq!(strategy, Strategy::Budgeted { budget: Duration::from_millis(1500) });
    }

    #[test]
    fn test_out_of_range_search_budget_is_an_error() {
        for budget in ["1e30", "-1", "inf", "NaN"] {
            let flag = format!("--search-budget={budget}");
            let err = args(&["--solver", "budgeted", &flag])
                .strategy()
                .unwrap_err();
            assert!(err.to_string().contains("--search-budget"), "{budget}: {err}");
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let params = MazeParams::new(5, 5, mazegen::Point::new(0, 0), mazegen::Point::new(4, 4)).with_seed(1);
        let params = args(&["--seed", "9", "--imperfect", "--no-pattern", "-o", "out.txt"]).apply(params);
        assert_eq!(params.seed, Some(9));
        assert!(!params.perfect);
        assert!(!params.insert_pattern);
        assert_eq!(params.output_file, Some(PathBuf::from("out.txt")));
    }
}
