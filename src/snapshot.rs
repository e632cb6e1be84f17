// Board snapshot parser
//
// Turns a round frame into a validated, immutable board. The board is
// rebuilt from scratch every round since the server is authoritative.

use crate::error::SnapshotError;
use crate::types::{Coord, ServerMessage};

/// A player standing on a cell, in server order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub id: String,
    pub gold: i32,
}

/// One cell of the board for the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub pos: Coord,
    pub reward: i32,
    pub occupants: Vec<Occupant>,
}

/// Round-scoped board, stored row-major (index = y * width + x)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub round_id: u32,
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from a round frame
    ///
    /// The tilemap must be non-empty and rectangular, every tile must be
    /// present, and non-zero declared dimensions must agree with it.
    pub fn from_frame(frame: &ServerMessage) -> Result<Board, SnapshotError> {
        let height = frame.tilemap.len();
        let width = frame.tilemap.first().map_or(0, |row| row.len());
        if height == 0 || width == 0 {
            return Err(SnapshotError::EmptyBoard);
        }

        for (row, tiles) in frame.tilemap.iter().enumerate() {
            if tiles.len() != width {
                return Err(SnapshotError::RaggedRow {
                    row,
                    expected: width,
                    found: tiles.len(),
                });
            }
        }

        let declared_mismatch = (frame.width != 0 && frame.width as usize != width)
            || (frame.height != 0 && frame.height as usize != height);
        if declared_mismatch {
            return Err(SnapshotError::DimensionMismatch {
                declared_width: frame.width,
                declared_height: frame.height,
                width,
                height,
            });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in frame.tilemap.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let tile = tile.as_ref().ok_or(SnapshotError::MissingTile { x, y })?;
                cells.push(Cell {
                    pos: Coord::new(x as i32, y as i32),
                    reward: tile.gold,
                    occupants: tile
                        .players
                        .iter()
                        .map(|p| Occupant {
                            id: p.name.clone(),
                            gold: p.gold,
                        })
                        .collect(),
                });
            }
        }

        Ok(Board {
            round_id: frame.round_id,
            width: width as i32,
            height: height as i32,
            cells,
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, pos: Coord) -> Option<&Cell> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.cells.get((pos.y * self.width + pos.x) as usize)
    }
}
