//! Placed signatures with a cell-range spatial index

use std::collections::HashMap;

use image::RgbaImage;
use signboard_ipc::{GridPosition, Signature};

use crate::error::BoardError;
use crate::grid::{GridCoordinates, OccupiedPositions, PixelPoint, PixelRect};

/// A signature that has a cell on the board
#[derive(Debug, Clone)]
pub struct PlacedSignature {
    pub signature: Signature,
    /// Box centered in the signature's cell
    pub bounds: PixelRect,
    /// Stroke image already scaled to the box, None if the payload did not decode
    pub strokes: Option<RgbaImage>,
}

impl PlacedSignature {
    pub fn new(grid: &GridCoordinates, signature: Signature, strokes: Option<RgbaImage>) -> Self {
        let bounds = grid.signature_bounds(signature.grid_position, signature.width, signature.height);
        Self {
            signature,
            bounds,
            strokes,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.signature.id
    }

    #[inline]
    pub fn position(&self) -> GridPosition {
        self.signature.grid_position
    }
}

/// Signatures in insertion order, indexed by cell and by id
///
/// Insertion order is the draw order and the hit-test order.
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    entries: Vec<PlacedSignature>,
    by_cell: HashMap<GridPosition, usize>,
    by_id: HashMap<String, usize>,
    /// Largest distance any box reaches past its own cell, per axis
    overflow_x: f64,
    overflow_y: f64,
}

impl SignatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature; its cell must be valid and free and its id unused
    pub fn insert(&mut self, grid: &GridCoordinates, placed: PlacedSignature) -> Result<usize, BoardError> {
        let position = placed.position();
        if !grid.can_place_signature(position, &self.by_cell) {
            return Err(BoardError::CellUnavailable {
                col: position.col,
                row: position.row,
            });
        }
        if self.by_id.contains_key(placed.id()) {
            return Err(BoardError::DuplicateId(placed.id().to_string()));
        }

        let cell = grid.grid_to_pixel(position);
        let cell_right = cell.x + grid.cell_width() as f64;
        let cell_bottom = cell.y + grid.cell_height() as f64;
        self.overflow_x = self
            .overflow_x
            .max(cell.x - placed.bounds.x)
            .max(placed.bounds.right() - cell_right);
        self.overflow_y = self
            .overflow_y
            .max(cell.y - placed.bounds.y)
            .max(placed.bounds.bottom() - cell_bottom);

        let index = self.entries.len();
        self.by_cell.insert(position, index);
        self.by_id.insert(placed.id().to_string(), index);
        self.entries.push(placed);
        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&PlacedSignature> {
        self.by_id.get(id).map(|index| &self.entries[*index])
    }

    #[inline]
    pub fn entries(&self) -> &[PlacedSignature] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_cell.clear();
        self.by_id.clear();
        self.overflow_x = 0.0;
        self.overflow_y = 0.0;
    }

    /// Signatures whose box intersects `rect`, in insertion order
    ///
    /// Only cells within reach of the rectangle are looked up, or every entry
    /// when that is fewer; the exact box test decides.
    pub fn intersecting(&self, grid: &GridCoordinates, rect: &PixelRect) -> Vec<&PlacedSignature> {
        if self.entries.is_empty() || rect.width <= 0.0 || rect.height <= 0.0 {
            return Vec::new();
        }
        let first = grid.pixel_to_grid(PixelPoint::new(rect.x - self.overflow_x, rect.y - self.overflow_y));
        let last = grid.pixel_to_grid(PixelPoint::new(
            rect.right() + self.overflow_x,
            rect.bottom() + self.overflow_y,
        ));
        let col_range = first.col.max(0)..=last.col.min(grid.cols() as i32 - 1);
        let row_range = first.row.max(0)..=last.row.min(grid.rows() as i32 - 1);

        // Wide rectangles reach more cells than there are signatures
        let span = |range: &std::ops::RangeInclusive<i32>| (*range.end() as i64 - *range.start() as i64 + 1).max(0);
        if span(&col_range).saturating_mul(span(&row_range)) > self.entries.len() as i64 {
            return self.entries.iter().filter(|placed| placed.bounds.intersects(rect)).collect();
        }

        let mut hits: Vec<usize> = Vec::new();
        for row in row_range {
            for col in col_range.clone() {
                if let Some(index) = self.by_cell.get(&GridPosition::new(col, row))
                    && self.entries[*index].bounds.intersects(rect)
                {
                    hits.push(*index);
                }
            }
        }
        hits.sort_unstable();
        hits.into_iter().map(|index| &self.entries[index]).collect()
    }

    /// First signature in insertion order whose box contains the point
    pub fn hit(&self, point: PixelPoint) -> Option<&PlacedSignature> {
        self.entries.iter().find(|placed| placed.bounds.contains(point))
    }
}

impl OccupiedPositions for SignatureIndex {
    fn is_occupied(&self, position: GridPosition) -> bool {
        self.by_cell.contains_key(&position)
    }

    fn occupied_count(&self) -> usize {
        self.by_cell.len()
    }
}
