//! Static world map and terrain collision.
//!
//! The map is loaded once at startup from a line-oriented text grid and never
//! changes afterwards. Each glyph becomes a [`Terrain`] variant; whether a cell
//! blocks movement is a property of the variant, not of the glyph.

use std::fmt;
use std::fs;
use std::path::Path;

/// Glyph used by map files to mark a player's starting point. Starting points
/// are assigned by the server, so the loader treats this glyph as open ground.
const PLAYER_GLYPH: char = '☺';

/// The closed set of terrain kinds a map cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Empty,
    Wall,
    Vegetation,
    Enemy,
}

impl Terrain {
    pub fn glyph(self) -> char {
        match self {
            Terrain::Empty => ' ',
            Terrain::Wall => '▤',
            Terrain::Vegetation => '♣',
            Terrain::Enemy => '☠',
        }
    }

    /// Whether the cell blocks occupancy.
    pub fn is_tangible(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Enemy)
    }

    /// Unknown glyphs and the player glyph load as [`Terrain::Empty`].
    pub fn from_glyph(glyph: char) -> Self {
        match glyph {
            '▤' => Terrain::Wall,
            '♣' => Terrain::Vegetation,
            '☠' => Terrain::Enemy,
            PLAYER_GLYPH => Terrain::Empty,
            _ => Terrain::Empty,
        }
    }
}

#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    Empty,
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(e) => write!(f, "failed to read map: {}", e),
            MapError::Empty => write!(f, "map has no cells"),
            MapError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {} has {} cells, expected {}",
                row, found, expected
            ),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e)
    }
}

/// Rectangular grid of terrain, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapModel {
    cells: Vec<Terrain>,
    width: usize,
    height: usize,
}

impl MapModel {
    /// Builds a map from rows of terrain. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self, MapError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MapError::Empty);
        }

        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(MapError::Ragged {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }

        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Parses the text format: one line per row, one glyph per cell.
    /// Trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<Terrain>> = text
            .lines()
            .map(|line| line.chars().map(Terrain::from_glyph).collect())
            .collect();

        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        Self::from_rows(rows)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Terrain at (x, y), or `None` outside the grid.
    pub fn terrain(&self, x: i32, y: i32) -> Option<Terrain> {
        if self.in_bounds(x, y) {
            Some(self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Cells outside the grid count as tangible.
    pub fn is_tangible(&self, x: i32, y: i32) -> bool {
        self.terrain(x, y).map_or(true, Terrain::is_tangible)
    }

    /// A fresh copy of every glyph, row by row.
    pub fn symbols(&self) -> Vec<Vec<char>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|t| t.glyph()).collect())
            .collect()
    }
}
