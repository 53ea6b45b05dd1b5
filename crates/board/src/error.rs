use thiserror::Error;

use crate::placement::GridFull;
use crate::render::TileRequest;

/// Problems with a submission, caught before any placement attempt
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Unknown color: {0}")]
    InvalidColor(String),
    #[error("Signature drawing is empty")]
    EmptyDrawing,
    #[error("Grid dimensions must be positive: {cols}x{rows} cells of {cell_width}x{cell_height}")]
    InvalidGrid {
        cols: u32,
        rows: u32,
        cell_width: u32,
        cell_height: u32,
    },
}

/// Failure while producing a tile image
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("Failed to encode tile: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No space available for signatures")]
    GridFull,
    #[error("Cell {col},{row} is outside the grid or already taken")]
    CellUnavailable { col: i32, row: i32 },
    #[error("Duplicate signature id: {0}")]
    DuplicateId(String),
    #[error("Unknown signature: {0}")]
    UnknownSignature(String),
    #[error("Tile {} {}/{} is outside the board", .0.level, .0.x, .0.y)]
    TileOutOfBounds(TileRequest),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<GridFull> for BoardError {
    fn from(_: GridFull) -> Self {
        Self::GridFull
    }
}
