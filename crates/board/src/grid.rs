//! Grid coordinate system: cell/pixel conversion and occupancy queries
//!
//! [`GridCoordinates`] is a fixed value object. Occupancy is never stored
//! here; callers pass whatever they derive it from through the
//! [`OccupiedPositions`] trait.

use std::collections::{HashMap, HashSet};

use signboard_config::{GridConfig, MAX_GRID_CELLS};
use signboard_ipc::{GridPosition, GridUsage};

use crate::error::ValidationError;

/// A point in board pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixel space, half-open on the right and bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// True when the two rectangles share a region of positive area
    #[inline]
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Anything that can answer "is this cell taken?"
pub trait OccupiedPositions {
    fn is_occupied(&self, position: GridPosition) -> bool;

    /// Number of occupied entries
    fn occupied_count(&self) -> usize;
}

impl OccupiedPositions for HashSet<GridPosition> {
    fn is_occupied(&self, position: GridPosition) -> bool {
        self.contains(&position)
    }

    fn occupied_count(&self) -> usize {
        self.len()
    }
}

impl<V> OccupiedPositions for HashMap<GridPosition, V> {
    fn is_occupied(&self, position: GridPosition) -> bool {
        self.contains_key(&position)
    }

    fn occupied_count(&self) -> usize {
        self.len()
    }
}

impl OccupiedPositions for [GridPosition] {
    fn is_occupied(&self, position: GridPosition) -> bool {
        self.contains(&position)
    }

    fn occupied_count(&self) -> usize {
        self.len()
    }
}

impl OccupiedPositions for Vec<GridPosition> {
    fn is_occupied(&self, position: GridPosition) -> bool {
        self.as_slice().is_occupied(position)
    }

    fn occupied_count(&self) -> usize {
        self.len()
    }
}

/// Fixed grid geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCoordinates {
    cols: u32,
    rows: u32,
    cell_width: u32,
    cell_height: u32,
}

impl GridCoordinates {
    /// Create a grid; every dimension must be positive and the cell counts
    /// must fit a signed cell index
    pub fn new(cols: u32, rows: u32, cell_width: u32, cell_height: u32) -> Result<Self, ValidationError> {
        let too_many = cols > MAX_GRID_CELLS || rows > MAX_GRID_CELLS;
        if cols == 0 || rows == 0 || cell_width == 0 || cell_height == 0 || too_many {
            return Err(ValidationError::InvalidGrid {
                cols,
                rows,
                cell_width,
                cell_height,
            });
        }
        Ok(Self {
            cols,
            rows,
            cell_width,
            cell_height,
        })
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, ValidationError> {
        Self::new(config.cols, config.rows, config.cell_width, config.cell_height)
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    #[inline]
    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Board width in pixels
    #[inline]
    pub fn board_width(&self) -> u64 {
        self.cols as u64 * self.cell_width as u64
    }

    /// Board height in pixels
    #[inline]
    pub fn board_height(&self) -> u64 {
        self.rows as u64 * self.cell_height as u64
    }

    /// The whole board as a pixel rectangle
    pub fn board_rect(&self) -> PixelRect {
        PixelRect::new(0.0, 0.0, self.board_width() as f64, self.board_height() as f64)
    }

    /// Top-left pixel of a cell. No bounds check.
    #[inline]
    pub fn grid_to_pixel(&self, position: GridPosition) -> PixelPoint {
        PixelPoint {
            x: position.col as f64 * self.cell_width as f64,
            y: position.row as f64 * self.cell_height as f64,
        }
    }

    /// Cell containing a pixel (floor division)
    #[inline]
    pub fn pixel_to_grid(&self, point: PixelPoint) -> GridPosition {
        GridPosition {
            col: (point.x / self.cell_width as f64).floor() as i32,
            row: (point.y / self.cell_height as f64).floor() as i32,
        }
    }

    /// Center pixel of a cell
    pub fn cell_center(&self, position: GridPosition) -> PixelPoint {
        let origin = self.grid_to_pixel(position);
        PixelPoint {
            x: origin.x + self.cell_width as f64 / 2.0,
            y: origin.y + self.cell_height as f64 / 2.0,
        }
    }

    #[inline]
    pub fn is_valid_position(&self, position: GridPosition) -> bool {
        position.col >= 0
            && (position.col as i64) < self.cols as i64
            && position.row >= 0
            && (position.row as i64) < self.rows as i64
    }

    /// Geometric center cell used by center-seeking placement
    pub fn center(&self) -> GridPosition {
        GridPosition {
            col: (self.cols / 2) as i32,
            row: (self.rows / 2) as i32,
        }
    }

    /// Every cell in row-major order (row ascending, then col ascending)
    pub fn all_positions(&self) -> impl Iterator<Item = GridPosition> + use<> {
        let cols = self.cols as i32;
        (0..self.rows as i32).flat_map(move |row| (0..cols).map(move |col| GridPosition { col, row }))
    }

    pub fn can_place_signature<O>(&self, position: GridPosition, occupied: &O) -> bool
    where
        O: OccupiedPositions + ?Sized,
    {
        self.is_valid_position(position) && !occupied.is_occupied(position)
    }

    /// Free cells in row-major order; this order is the tie-break for every
    /// placement decision
    pub fn all_available_positions<O>(&self, occupied: &O) -> Vec<GridPosition>
    where
        O: OccupiedPositions + ?Sized,
    {
        self.all_positions()
            .filter(|position| !occupied.is_occupied(*position))
            .collect()
    }

    /// First free cell in row-major order
    pub fn next_available_position<O>(&self, occupied: &O) -> Option<GridPosition>
    where
        O: OccupiedPositions + ?Sized,
    {
        self.all_positions()
            .find(|position| !occupied.is_occupied(*position))
    }

    /// Free cell closest to the grid center, earliest in row-major order on ties
    pub fn find_best_position<O>(&self, occupied: &O) -> Option<GridPosition>
    where
        O: OccupiedPositions + ?Sized,
    {
        let center = self.center();
        // Squared distance ranks identically to Euclidean distance without float ties
        self.all_positions()
            .filter(|position| !occupied.is_occupied(*position))
            .min_by_key(|position| {
                let dc = (position.col - center.col) as i64;
                let dr = (position.row - center.row) as i64;
                dc * dc + dr * dr
            })
    }

    /// Top-left pixel that centers a box of the given size in a cell
    pub fn centered_signature_position(&self, position: GridPosition, width: u32, height: u32) -> PixelPoint {
        let origin = self.grid_to_pixel(position);
        PixelPoint {
            x: origin.x + (self.cell_width as f64 - width as f64) / 2.0,
            y: origin.y + (self.cell_height as f64 - height as f64) / 2.0,
        }
    }

    /// Pixel bounds of a box centered in a cell
    pub fn signature_bounds(&self, position: GridPosition, width: u32, height: u32) -> PixelRect {
        let origin = self.centered_signature_position(position, width, height);
        PixelRect::new(origin.x, origin.y, width as f64, height as f64)
    }

    pub fn count_grid_usage<O>(&self, occupied: &O) -> GridUsage
    where
        O: OccupiedPositions + ?Sized,
    {
        let total = self.cols as u64 * self.rows as u64;
        let used = occupied.occupied_count() as u64;
        let percentage_used = if total == 0 {
            0.0
        } else {
            used as f64 * 100.0 / total as f64
        };
        GridUsage {
            total,
            used,
            open: total.saturating_sub(used),
            percentage_used,
        }
    }
}
