use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use glam::DVec2;
use thiserror::Error;

/// Width of one grid cell in world units.
pub const CELL_WIDTH: f64 = 32.0;

/// Cell index containing a world coordinate.
#[inline]
pub fn cell_of(coord: f64) -> i64 {
    (coord / CELL_WIDTH).floor() as i64
}

/// World coordinate of a cell's low-side gridline.
#[inline]
pub fn world_of(cell: i64) -> f64 {
    cell as f64 * CELL_WIDTH
}

#[derive(Debug, Error)]
pub enum MapParseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("map is empty")]
    Empty,
    #[error("line {line}: invalid cell character {found:?}")]
    InvalidCell { line: usize, found: char },
    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular tile map of material codes. 0 is empty space, 1..=9 are wall
/// materials. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMap {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl WorldMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapParseError> {
        Self::from_reader(File::open(path)?)
    }

    /// Parse one row per line, one digit per cell. Comma separators are
    /// tolerated and stripped before the digit scan. Any malformed row aborts
    /// the whole load; there is no partial map.
    pub fn from_reader(reader: impl Read) -> Result<Self, MapParseError> {
        let mut cells = Vec::new();
        let mut width = 0;
        let mut height = 0;

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let row = line.trim();
            if row.is_empty() {
                continue;
            }

            let mut row_len = 0;
            for c in row.chars().filter(|&c| c != ',') {
                let code = c.to_digit(10).ok_or(MapParseError::InvalidCell {
                    line: idx + 1,
                    found: c,
                })?;
                cells.push(code as u8);
                row_len += 1;
            }

            if height == 0 {
                width = row_len;
            } else if row_len != width {
                return Err(MapParseError::RaggedRow {
                    line: idx + 1,
                    expected: width,
                    found: row_len,
                });
            }
            height += 1;
        }

        if cells.is_empty() {
            return Err(MapParseError::Empty);
        }

        Ok(Self {
            cells,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Material code at a cell. Indices outside the map are a caller contract
    /// violation and panic; the traversal stays in bounds as long as the
    /// border is solid, so per-step validation is deliberately absent.
    #[inline]
    pub fn material(&self, cell_x: i64, cell_y: i64) -> u8 {
        let (x, y) = (cell_x as usize, cell_y as usize);
        assert!(
            x < self.width && y < self.height,
            "cell ({cell_x}, {cell_y}) outside {}x{} map",
            self.width,
            self.height
        );
        self.cells[y * self.width + x]
    }

    /// Material code at a cell, or `None` outside the map. The traversal uses
    /// this so rays that escape an unbordered map run to the step cap instead
    /// of faulting.
    #[inline]
    pub fn get(&self, cell_x: i64, cell_y: i64) -> Option<u8> {
        if cell_x < 0 || cell_y < 0 {
            return None;
        }
        let (x, y) = (cell_x as usize, cell_y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// True when every edge cell is a wall. Rays cast from inside such a map
    /// always terminate on their own; without it they stop at the step cap.
    pub fn has_solid_border(&self) -> bool {
        let (w, h) = (self.width, self.height);
        let top = (0..w).all(|x| self.cells[x] != 0);
        let bottom = (0..w).all(|x| self.cells[(h - 1) * w + x] != 0);
        let left = (0..h).all(|y| self.cells[y * w] != 0);
        let right = (0..h).all(|y| self.cells[y * w + w - 1] != 0);
        top && bottom && left && right
    }

    /// Center of the first empty cell in row-major order, if any. Used as a
    /// spawn point for maps that don't specify one.
    pub fn first_open_cell(&self) -> Option<DVec2> {
        self.cells.iter().position(|&c| c == 0).map(|idx| {
            let (x, y) = ((idx % self.width) as i64, (idx / self.width) as i64);
            DVec2::new(
                world_of(x) + CELL_WIDTH / 2.0,
                world_of(y) + CELL_WIDTH / 2.0,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_rows() {
        let text = "1,1,1\n1,0,2\n1,1,1\n";
        let map = WorldMap::from_reader(text.as_bytes()).expect("map should parse");
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(map.material(1, 1), 0);
        assert_eq!(map.material(2, 1), 2);
    }

    #[test]
    fn parses_bare_digits() {
        let map = WorldMap::from_reader("111\n101\n111\n".as_bytes()).expect("map should parse");
        assert_eq!(map.width(), 3);
        assert!(map.has_solid_border());
    }

    #[test]
    fn rejects_non_digit() {
        let err = WorldMap::from_reader("111\n1x1\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            MapParseError::InvalidCell { line: 2, found: 'x' }
        ));
    }

    #[test]
    fn rejects_ragged_row() {
        let err = WorldMap::from_reader("111\n11\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            MapParseError::RaggedRow {
                line: 2,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let err = WorldMap::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, MapParseError::Empty));
    }

    #[test]
    fn detects_open_border() {
        let map = WorldMap::from_reader("111\n100\n111\n".as_bytes()).unwrap();
        assert!(!map.has_solid_border());
    }

    #[test]
    fn cell_world_conversions() {
        assert_eq!(cell_of(0.0), 0);
        assert_eq!(cell_of(31.9), 0);
        assert_eq!(cell_of(32.0), 1);
        assert_eq!(cell_of(-0.1), -1);
        assert_eq!(world_of(2), 64.0);
    }

    #[test]
    fn first_open_cell_is_centered() {
        let map = WorldMap::from_reader("111\n101\n111\n".as_bytes()).unwrap();
        assert_eq!(map.first_open_cell(), Some(DVec2::new(48.0, 48.0)));
    }
}
