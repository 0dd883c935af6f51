use std::{fs, io, path::Path, sync::LazyLock};

use thiserror::Error;

pub const IDEAL_GLIDER_ROWS: usize = 9;
pub const IDEAL_GLIDER_COLS: usize = 15;

/// Three gliders travelling the same diagonal, staggered so they never collide.
#[rustfmt::skip]
pub const IDEAL_GLIDER_ARRAY: [[u8; IDEAL_GLIDER_COLS]; IDEAL_GLIDER_ROWS] = [
    [0,0,1,0,0,0,0,0,0,0,0,0,0,0,0],
    [0,0,1,0,0,0,0,0,0,0,0,0,0,0,0],
    [1,1,1,0,0,0,0,0,0,0,0,0,0,0,0],
    [0,0,0,0,0,0,0,1,0,0,0,0,0,0,0],
    [0,0,0,0,0,0,0,1,1,0,0,0,0,0,0],
    [0,0,0,0,0,0,0,1,0,0,0,0,0,0,0],
    [0,0,0,0,0,0,0,0,0,0,0,0,1,1,1],
    [0,0,0,0,0,0,0,0,0,0,0,0,1,0,0],
    [0,0,0,0,0,0,0,0,0,0,0,0,1,0,0],
];

static IDEAL_GLIDER: LazyLock<Pattern> = LazyLock::new(|| {
    let cells = IDEAL_GLIDER_ARRAY
        .iter()
        .flat_map(|row| row.iter().map(|&v| v != 0))
        .collect();
    Pattern {
        name: "ideal glider".to_owned(),
        rows: IDEAL_GLIDER_ROWS,
        cols: IDEAL_GLIDER_COLS,
        cells,
    }
});

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read pattern file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("pattern `{0}` has no cells")]
    Empty(String),
    #[error("invalid character {ch:?} in pattern `{name}` at line {line}")]
    InvalidChar { name: String, line: usize, ch: char },
}

/// Immutable rectangular starting configuration, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Pattern {
    pub fn ideal_glider() -> &'static Pattern {
        &IDEAL_GLIDER
    }

    /// A single glider heading south-east.
    pub fn pure_glider() -> Pattern {
        #[rustfmt::skip]
        let cells = vec![
            false, true,  false,
            false, false, true,
            true,  true,  true,
        ];
        Pattern {
            name: "pure glider".to_owned(),
            rows: 3,
            cols: 3,
            cells,
        }
    }

    /// Parses the Life "plaintext" format (`.cells`).
    ///
    /// Lines starting with `!` are comments, `O`, `*` and `#` are alive, `.` is dead.
    /// Short rows are padded with dead cells up to the widest row.
    pub fn parse_plaintext(name: &str, src: &str) -> Result<Pattern, PatternError> {
        let mut grid: Vec<Vec<bool>> = Vec::new();
        for (line_no, line) in src.lines().enumerate() {
            if line.starts_with('!') {
                continue;
            }
            let row = line
                .trim_end()
                .chars()
                .map(|ch| match ch {
                    'O' | '*' | '#' => Ok(true),
                    '.' => Ok(false),
                    _ => Err(PatternError::InvalidChar {
                        name: name.to_owned(),
                        line: line_no + 1,
                        ch,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            grid.push(row);
        }

        // blank lines at the end are not part of the pattern
        while grid.last().is_some_and(|row| row.is_empty()) {
            grid.pop();
        }

        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if grid.is_empty() || cols == 0 {
            return Err(PatternError::Empty(name.to_owned()));
        }

        let rows = grid.len();
        let cells = grid
            .into_iter()
            .flat_map(|mut row| {
                row.resize(cols, false);
                row
            })
            .collect();

        Ok(Pattern {
            name: name.to_owned(),
            rows,
            cols,
            cells,
        })
    }

    /// Reads a plaintext pattern from disk, naming it after the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Pattern, PatternError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse_plaintext(&name, &src)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(row, col)` of every live cell.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(i, _)| (i / self.cols, i % self.cols))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ideal_glider_table_shape() {
        assert_eq!(IDEAL_GLIDER_ROWS, IDEAL_GLIDER_ARRAY.len());
        for row in IDEAL_GLIDER_ARRAY {
            assert_eq!(IDEAL_GLIDER_COLS, row.len());
            assert!(row.iter().all(|&v| v <= 1));
        }

        let glider = Pattern::ideal_glider();
        assert_eq!((9, 15), (glider.rows(), glider.cols()));
        // three gliders of five cells each
        assert_eq!(15, glider.live_cells().count());
        let live: Vec<_> = glider.live_cells().collect();
        assert_eq!(Some(&(0, 2)), live.first());
        assert_eq!(Some(&(8, 12)), live.last());
    }

    #[test]
    fn pure_glider_cells() {
        let glider = Pattern::pure_glider();
        let live: Vec<_> = glider.live_cells().collect();
        assert_eq!(vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)], live);
    }

    #[test]
    fn parse_plaintext_with_comments_and_ragged_rows() {
        let src = "!Name: Glider\n!\n.O\n..O\nOOO\n\n";
        let pattern = Pattern::parse_plaintext("glider", src).unwrap();
        assert_eq!("glider", pattern.name());
        assert_eq!(3, pattern.rows());
        assert_eq!(3, pattern.cols());
        assert_eq!(Pattern::pure_glider().cells, pattern.cells);
    }

    #[test]
    fn parse_plaintext_rejects_garbage() {
        let err = Pattern::parse_plaintext("bad", "..O\n.x.\n").unwrap_err();
        assert!(matches!(
            err,
            PatternError::InvalidChar { line: 2, ch: 'x', .. }
        ));

        let err = Pattern::parse_plaintext("blank", "!only a comment\n\n").unwrap_err();
        assert!(matches!(err, PatternError::Empty(_)));
    }

    #[test]
    fn load_from_disk() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/patterns/lwss.cells");
        let lwss = Pattern::load(path).unwrap();
        assert_eq!("lwss", lwss.name());
        assert_eq!((4, 5), (lwss.rows(), lwss.cols()));
        assert_eq!(9, lwss.live_cells().count());
    }

    #[test]
    fn load_missing_file() {
        let err = Pattern::load("/definitely/not/here.cells").unwrap_err();
        assert!(matches!(err, PatternError::Io { .. }));
    }
}
