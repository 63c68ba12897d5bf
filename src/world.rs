use std::path::Path;

/// Tile value: 0 is open floor, anything else is a wall material id (texture id + 1).
/// Material ids go up to 255.
pub type Tile = u8;

const BUILTIN_MAP: &str = include_str!("../maps/default.txt");

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error reading map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("map has no rows")]
    Empty,
    #[error("map row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile {token:?} at row {row}, column {column}")]
    BadTile {
        row: usize,
        column: usize,
        token: String,
    },
    #[error("grid dimensions {width}x{height} do not match {len} cells")]
    Dimensions {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Immutable tile grid. Cells are stored row-major, `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, cells: Vec<Tile>) -> Result<Self, MapError> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return Err(MapError::Dimensions {
                width,
                height,
                len: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// The reference 24x24 maze shipped with the crate.
    pub fn builtin() -> Self {
        // The embedded map is covered by tests; a parse failure here is a build defect.
        Self::parse(BUILTIN_MAP).expect("built-in map is well formed")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let grid = Self::parse(&text)?;

        let open = grid.open_border_cells();
        if !open.is_empty() {
            tracing::warn!(
                path = %path.display(),
                open_cells = open.len(),
                "map border is not closed; rays may escape"
            );
        }
        tracing::info!(
            path = %path.display(),
            width = grid.width,
            height = grid.height,
            "loaded map"
        );
        Ok(grid)
    }

    /// Parse map text. Each non-blank, non-`#` line is one row. A row is either a run
    /// of digits (`10001`) or whitespace/comma separated integers (`1 0 12 1`).
    ///
    /// Tiles are `0..=255`; a larger value is reported as [`MapError::BadTile`].
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<Tile>> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row_idx = rows.len();
            let separated = line.contains(|c: char| c.is_whitespace() || c == ',');

            let row = if separated {
                line.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|t| !t.is_empty())
                    .enumerate()
                    .map(|(column, token)| parse_tile(token, row_idx, column))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                line.chars()
                    .enumerate()
                    .map(|(column, c)| {
                        c.to_digit(10)
                            .map(|d| d as Tile)
                            .ok_or_else(|| MapError::BadTile {
                                row: row_idx,
                                column,
                                token: c.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };

            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(MapError::Ragged {
                        row: row_idx,
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }

        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the grid. Callers keep traversal in bounds
    /// through a closed border; use [`Grid::get`] when that is not guaranteed.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        assert!(
            x < self.width && y < self.height,
            "tile ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.cells[y * self.width + x]
    }

    /// Checked lookup; `None` outside the grid (including negative coordinates).
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Anything outside the grid counts as solid.
    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(|t| t > 0)
    }

    /// Border cells holding 0, through which a ray could leave the grid.
    pub fn open_border_cells(&self) -> Vec<(usize, usize)> {
        let mut open = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let border = x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1;
                if border && self.tile_at(x, y) == 0 {
                    open.push((x, y));
                }
            }
        }
        open
    }

    /// Highest tile value in the grid.
    pub fn max_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }
}

fn parse_tile(token: &str, row: usize, column: usize) -> Result<Tile, MapError> {
    token.parse::<Tile>().map_err(|_| MapError::BadTile {
        row,
        column,
        token: token.to_string(),
    })
}
