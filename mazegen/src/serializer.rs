// serializer.rs - Flat text maze format: writer and reader
//
// Layout:
//   <height lines of <width> uppercase hex digits, the effective wall mask>
//   <blank line>
//   <entryX>,<entryY>
//   <exitX>,<exitY>
//   <one N/E/S/W character per path step>

use std::path::{Path as FilePath, PathBuf};

use crate::error_handling::{MazeError, Result};
use crate::grid::{Direction, Grid, Point, Walls};
use crate::params::MazeParams;
use crate::solver::{find_path_bfs, Path};

/// Encode a maze and a path as text. An empty path gives an empty direction line.
pub fn render(grid: &Grid, entry: Point, exit: Point, path: &Path) -> Result<String> {
    let directions = path.directions().map_err(MazeError::BrokenPath)?;

    let mut out = String::with_capacity((grid.width() + 1) * grid.height() + directions.len() + 32);
    for y in 0..grid.height() {
        out.extend((0..grid.width()).map(|x| hex_digit(grid.walls(Point::new(x, y)))));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("{},{}\n", entry.x, entry.y));
    out.push_str(&format!("{},{}\n", exit.x, exit.y));
    out.extend(directions.iter().map(|d| d.to_char()));
    out.push('\n');
    Ok(out)
}

/// Uppercase hex digit of a wall mask
fn hex_digit(walls: Walls) -> char {
    char::from_digit(u32::from(walls.bits()), 16).map_or('F', |c| c.to_ascii_uppercase())
}

/// Write the maze to `params.output_file`, solving it by BFS first when `path`
/// is empty. Returns the file that was written.
pub fn write_maze(grid: &Grid, params: &MazeParams, path: &Path) -> Result<PathBuf> {
    let file = params.output_file.clone().ok_or(MazeError::NoOutputPath)?;
    if file.as_os_str().is_empty() {
        return Err(MazeError::NoOutputPath);
    }

    let solved;
    let path = if path.is_empty() {
        solved = find_path_bfs(grid, params.entry, params.exit);
        &solved
    } else {
        path
    };

    let text = render(grid, params.entry, params.exit, path)?;
    write_text(&file, &text)?;
    log::debug!("Wrote {} ({} bytes)", file.display(), text.len());
    Ok(file)
}

fn write_text(file: &FilePath, text: &str) -> Result<()> {
    std::fs::write(file, text).map_err(|source| MazeError::Write {
        path: file.to_path_buf(),
        source,
    })
}

// ============================================================================
// READER
// ============================================================================

/// A maze file read back into memory. Pattern cells come back as fully walled
/// cells; the format does not tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeFile {
    pub grid: Grid,
    pub entry: Point,
    pub exit: Point,
    pub path: Path,
}

impl MazeFile {
    pub fn read(file: &FilePath) -> Result<MazeFile> {
        let text = std::fs::read_to_string(file).map_err(|source| MazeError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse the text layout. Line numbers in errors are 1-based.
    pub fn parse(text: &str) -> Result<MazeFile> {
        let lines: Vec<&str> = text.lines().collect();

        let blank = lines
            .iter()
            .position(|l| l.is_empty())
            .ok_or_else(|| MazeError::parse(lines.len() + 1, "missing blank line after the wall rows"))?;
        if blank == 0 {
            return Err(MazeError::parse(1, "no wall rows"));
        }

        let masks = parse_rows(&lines[..blank])?;
        let grid = rebuild_grid(&masks)?;

        let coordinate = |offset: usize, what: &str| -> Result<Point> {
            let n = blank + offset;
            let line = lines
                .get(n)
                .ok_or_else(|| MazeError::parse(n + 1, format!("missing {what} line")))?;
            let point = parse_point(line).ok_or_else(|| MazeError::parse(n + 1, format!("bad {what} '{line}'")))?;
            if !grid.contains(point) {
                return Err(MazeError::parse(n + 1, format!("{what} {point} is outside the maze")));
            }
            Ok(point)
        };
        let entry = coordinate(1, "entry")?;
        let exit = coordinate(2, "exit")?;

        let dir_line = blank + 3;
        let moves = lines.get(dir_line).copied().unwrap_or("");
        let path = if moves.is_empty() {
            Path::default()
        } else {
            let directions = moves
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    Direction::from_char(c)
                        .ok_or_else(|| MazeError::parse(dir_line + 1, format!("bad direction '{c}' at column {}", i + 1)))
                })
                .collect::<Result<Vec<_>>>()?;
            Path::replay(entry, directions)
                .filter(|p| p.is_valid_in(&grid, entry, exit))
                .ok_or_else(|| MazeError::parse(dir_line + 1, "path does not lead from entry to exit through open walls"))?
        };

        if let Some(extra) = lines.iter().skip(dir_line + 1).position(|l| !l.trim().is_empty()) {
            return Err(MazeError::parse(dir_line + 2 + extra, "unexpected trailing content"));
        }

        Ok(MazeFile { grid, entry, exit, path })
    }
}

fn parse_rows(rows: &[&str]) -> Result<Vec<Vec<Walls>>> {
    let width = rows[0].chars().count();
    rows.iter()
        .enumerate()
        .map(|(y, row)| {
            if row.chars().count() != width {
                return Err(MazeError::parse(
                    y + 1,
                    format!("row has {} cells, expected {width}", row.chars().count()),
                ));
            }
            row.chars()
                .map(|c| {
                    c.to_digit(16)
                        .map(|v| Walls::from_bits_truncate(v as u8))
                        .ok_or_else(|| MazeError::parse(y + 1, format!("'{c}' is not a hex digit")))
                })
                .collect()
        })
        .collect()
}

fn parse_point(line: &str) -> Option<Point> {
    let (x, y) = line.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Rebuild the owned top/right bits, checking that both sides of every wall
/// agree and the border is closed
fn rebuild_grid(masks: &[Vec<Walls>]) -> Result<Grid> {
    let height = masks.len();
    let width = masks[0].len();
    let mut grid = Grid::new(width, height);

    for (y, row) in masks.iter().enumerate() {
        for (x, &walls) in row.iter().enumerate() {
            let p = Point::new(x, y);
            for dir in Direction::ALL {
                let closed = walls.contains(dir.wall());
                match grid.neighbor(p, dir) {
                    None if !closed => {
                        return Err(MazeError::parse(y + 1, format!("border open at {p} ({})", dir.to_char())));
                    }
                    None => {}
                    Some(n) => {
                        if masks[n.y][n.x].contains(dir.opposite().wall()) != closed {
                            return Err(MazeError::parse(
                                y + 1,
                                format!("wall between {p} and {n} differs on each side"),
                            ));
                        }
                        if !closed && matches!(dir, Direction::North | Direction::East) {
                            grid.remove_wall(p, dir);
                        }
                    }
                }
            }
        }
    }
    Ok(grid)
}
