//! Zoom level pyramid in the deep-zoom layout the viewer expects
//!
//! Level `max_level` is the board at full resolution; each level below it
//! halves both dimensions, down to a single pixel at level 0.

use crate::grid::PixelRect;

use super::TileRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pyramid {
    width: u64,
    height: u64,
    tile_size: u32,
    max_level: u32,
}

impl Pyramid {
    pub fn new(width: u64, height: u64, tile_size: u32) -> Self {
        let largest = width.max(height).max(1);
        // Smallest level whose full-resolution size covers the largest side
        let max_level = 64 - (largest - 1).leading_zeros();
        Self {
            width,
            height,
            tile_size,
            max_level,
        }
    }

    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// How many times `level` is halved relative to full resolution
    #[inline]
    fn shift(&self, level: u32) -> Option<u32> {
        self.max_level.checked_sub(level)
    }

    /// Output pixels per board pixel at `level`
    pub fn scale(&self, level: u32) -> Option<f64> {
        self.shift(level).map(|shift| 0.5f64.powi(shift as i32))
    }

    /// Pixel size of the whole board at `level`
    pub fn level_dimensions(&self, level: u32) -> Option<(u64, u64)> {
        let shift = self.shift(level)?;
        let halve = |value: u64| {
            let divisor = 1u128 << shift;
            (value as u128).div_ceil(divisor) as u64
        };
        Some((halve(self.width), halve(self.height)))
    }

    /// Number of tiles across and down at `level`
    pub fn tile_count(&self, level: u32) -> Option<(u64, u64)> {
        let (width, height) = self.level_dimensions(level)?;
        let tile_size = self.tile_size as u64;
        Some((width.div_ceil(tile_size), height.div_ceil(tile_size)))
    }

    pub fn contains(&self, request: TileRequest) -> bool {
        match self.tile_count(request.level) {
            Some((tiles_x, tiles_y)) => (request.x as u64) < tiles_x && (request.y as u64) < tiles_y,
            None => false,
        }
    }

    /// Board-pixel rectangle covered by a tile, or None if the tile does not exist
    pub fn tile_region(&self, request: TileRequest) -> Option<PixelRect> {
        if !self.contains(request) {
            return None;
        }
        let shift = self.shift(request.level)?;
        let span = (self.tile_size as u128) << shift;
        let x = request.x as u128 * span;
        let y = request.y as u128 * span;
        Some(PixelRect::new(x as f64, y as f64, span as f64, span as f64))
    }

    /// Tiles at `level` whose region intersects `rect`
    pub fn tiles_intersecting(&self, level: u32, rect: &PixelRect) -> Vec<TileRequest> {
        let (Some(shift), Some((tiles_x, tiles_y))) = (self.shift(level), self.tile_count(level)) else {
            return Vec::new();
        };
        if rect.width <= 0.0 || rect.height <= 0.0 || tiles_x == 0 || tiles_y == 0 {
            return Vec::new();
        }
        let span = ((self.tile_size as u128) << shift) as f64;
        let first = |start: f64| (start / span).floor().max(0.0) as u64;
        // Exclusive right/bottom edge: a rect ending exactly on a tile border stays out of the next tile
        let last = |end: f64, count: u64| (((end / span).ceil() as u64).max(1) - 1).min(count - 1);

        let (x0, x1) = (first(rect.x), last(rect.right(), tiles_x));
        let (y0, y1) = (first(rect.y), last(rect.bottom(), tiles_y));

        let mut tiles = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                tiles.push(TileRequest {
                    level,
                    x: x as u32,
                    y: y as u32,
                });
            }
        }
        tiles
    }
}
