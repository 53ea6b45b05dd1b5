//! Tile source: deterministic rendering of board regions
//!
//! A tile's pixels depend only on the grid, the placed signatures and the
//! flipped set. The full resolution level draws board pixels directly;
//! lower levels compose into the tile at their own scale, so a tile never
//! costs more memory than the tile itself.

mod index;
mod pyramid;
mod scaled;
mod sprite;

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

pub use index::{PlacedSignature, SignatureIndex};
pub use pyramid::Pyramid;
pub use sprite::{caption_lines, fill_color, render_sprite};

use crate::constants::{BACKGROUND_COLOR, GRID_LINE_COLOR, GRID_LINE_WIDTH, LABEL_COLOR};
use crate::error::{BoardError, RenderError};
use crate::flip::FlippedState;
use crate::glyphs;
use crate::grid::{GridCoordinates, PixelRect};
use crate::surface::Surface;

/// Address of one tile in the zoom pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRequest {
    pub level: u32,
    pub x: u32,
    pub y: u32,
}

impl TileRequest {
    pub const fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }
}

pub struct BoardRenderer {
    grid: GridCoordinates,
    pyramid: Pyramid,
}

impl BoardRenderer {
    pub fn new(grid: GridCoordinates, tile_size: u32) -> Self {
        let pyramid = Pyramid::new(grid.board_width(), grid.board_height(), tile_size);
        Self { grid, pyramid }
    }

    #[inline]
    pub fn grid(&self) -> &GridCoordinates {
        &self.grid
    }

    #[inline]
    pub fn pyramid(&self) -> &Pyramid {
        &self.pyramid
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.pyramid.tile_size()
    }

    /// Render one `tile_size` x `tile_size` tile
    ///
    /// Pixels past the board edge stay transparent.
    pub fn render_tile(
        &self,
        signatures: &SignatureIndex,
        flipped: &FlippedState,
        request: TileRequest,
    ) -> Result<RgbaImage, BoardError> {
        let region = self
            .pyramid
            .tile_region(request)
            .ok_or(BoardError::TileOutOfBounds(request))?;
        let board = self.grid.board_rect();

        // Part of the tile region that lies on the board, whole board pixels
        let x0 = region.x;
        let y0 = region.y;
        let x1 = region.right().min(board.right());
        let y1 = region.bottom().min(board.bottom());
        let clip = PixelRect::new(x0, y0, x1 - x0, y1 - y0);

        let tile_size = self.tile_size();
        let mut tile = Surface::new(tile_size, tile_size);
        let scale = self.pyramid.scale(request.level).unwrap_or(1.0);
        if scale >= 1.0 {
            // One board pixel per tile pixel; the clip is at most one tile
            let mut full = Surface::new(clip.width as u32, clip.height as u32);
            self.draw_region(&mut full, clip, signatures, flipped);
            tile.draw_image(&full.to_image()?, 0, 0);
        } else {
            self.draw_region_scaled(&mut tile, clip, scale, signatures, flipped);
        }

        debug!("Rendered tile {}/{}/{}", request.level, request.x, request.y);
        Ok(tile.to_image()?)
    }

    /// Full-board image with grid lines and a `col,row` label in every cell
    pub fn render_reference(&self) -> Result<RgbaImage, RenderError> {
        let board = self.grid.board_rect();
        let mut surface = Surface::new(board.width as u32, board.height as u32);
        self.draw_background(&mut surface, board);

        for position in self.grid.all_positions() {
            let label = position.to_string();
            let center = self.grid.cell_center(position);
            let text = glyphs::fit_text(&label, self.grid.cell_width().saturating_sub(4));
            glyphs::draw_text_centered(&mut surface, text, center.x, center.y, LABEL_COLOR);
        }
        surface.to_image()
    }

    /// Draw the board region `region` (board pixels) onto a surface whose
    /// top-left pixel is the region's top-left corner
    fn draw_region(
        &self,
        surface: &mut Surface,
        region: PixelRect,
        signatures: &SignatureIndex,
        flipped: &FlippedState,
    ) {
        self.draw_background(surface, region);

        for placed in signatures.intersecting(&self.grid, &region) {
            let sprite = render_sprite(placed, flipped.is_flipped(placed.id()));
            let Ok(image) = sprite.to_image() else {
                continue;
            };
            // First pixel whose center falls inside the box
            let x = (placed.bounds.x - region.x - 0.5).ceil() as i64;
            let y = (placed.bounds.y - region.y - 0.5).ceil() as i64;
            surface.draw_image(&image, x, y);
        }
    }

    /// Draw the board region `region` shrunk by `scale` onto a surface
    /// whose top-left pixel is the region's top-left corner
    fn draw_region_scaled(
        &self,
        surface: &mut Surface,
        region: PixelRect,
        scale: f64,
        signatures: &SignatureIndex,
        flipped: &FlippedState,
    ) {
        let width = ((region.width * scale).ceil() as usize).min(surface.width as usize);
        let height = ((region.height * scale).ceil() as usize).min(surface.height as usize);
        let columns = scaled::line_coverage(
            region.x,
            region.right(),
            self.grid.cell_width(),
            self.grid.cols(),
            scale,
            width,
        );
        let rows = scaled::line_coverage(
            region.y,
            region.bottom(),
            self.grid.cell_height(),
            self.grid.rows(),
            scale,
            height,
        );

        for (y, row) in rows.iter().enumerate() {
            for (x, column) in columns.iter().enumerate() {
                let covered = 1.0 - (1.0 - column.min(1.0)) * (1.0 - row.min(1.0));
                let color = scaled::mix(BACKGROUND_COLOR, GRID_LINE_COLOR, covered);
                surface.set_pixel(x as i64, y as i64, color);
            }
        }

        for placed in signatures.intersecting(&self.grid, &region) {
            let sprite = render_sprite(placed, flipped.is_flipped(placed.id()));
            // Same first pixel as at full resolution
            let left = (placed.bounds.x - 0.5).ceil() - region.x;
            let top = (placed.bounds.y - 0.5).ceil() - region.y;
            scaled::composite_scaled(surface, &sprite, left, top, scale);
        }
    }

    /// Background plus grid separators for the region
    fn draw_background(&self, surface: &mut Surface, region: PixelRect) {
        surface.clear(BACKGROUND_COLOR);

        let (origin_x, origin_y) = (region.x as i64, region.y as i64);
        let (width, height) = (surface.width as i64, surface.height as i64);
        let half = (GRID_LINE_WIDTH / 2.0) as i64;
        let line = GRID_LINE_WIDTH as i64;

        let cell_width = self.grid.cell_width() as i64;
        let first_col = ((origin_x - line) / cell_width).max(0);
        let last_col = ((origin_x + width + line) / cell_width).min(self.grid.cols() as i64);
        for col in first_col..=last_col {
            let x = col * cell_width - origin_x - half;
            surface.fill_rect(x, 0, x + line, height, GRID_LINE_COLOR);
        }

        let cell_height = self.grid.cell_height() as i64;
        let first_row = ((origin_y - line) / cell_height).max(0);
        let last_row = ((origin_y + height + line) / cell_height).min(self.grid.rows() as i64);
        for row in first_row..=last_row {
            let y = row * cell_height - origin_y - half;
            surface.fill_rect(0, y, width, y + line, GRID_LINE_COLOR);
        }
    }

    /// Tiles across every level that show any part of `rect`
    pub fn tiles_covering(&self, rect: &PixelRect) -> Vec<TileRequest> {
        (0..=self.pyramid.max_level())
            .flat_map(|level| self.pyramid.tiles_intersecting(level, rect))
            .collect()
    }
}

/// PNG bytes of an image
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use signboard_ipc::{GridPosition, Signature, SignatureColor};

    use super::*;
    use crate::payload::tests::solid_png_data_url;
    use crate::payload::decode_drawing_scaled;

    fn signature(id: &str, col: i32, row: i32, color: SignatureColor) -> Signature {
        Signature {
            id: id.to_string(),
            grid_position: GridPosition::new(col, row),
            width: 75,
            height: 50,
            color,
            timestamp: "2024-04-24T11:47:34-04:00".to_string(),
            data: solid_png_data_url(150, 100, [0, 0, 0, 255]),
            location: None,
            device_id: None,
        }
    }

    fn index(grid: &GridCoordinates, signatures: Vec<Signature>) -> SignatureIndex {
        let mut index = SignatureIndex::new();
        for signature in signatures {
            let strokes = decode_drawing_scaled(&signature.data, signature.width, signature.height).ok();
            index.insert(grid, PlacedSignature::new(grid, signature, strokes)).unwrap();
        }
        index
    }

    fn renderer(cols: u32, rows: u32, tile_size: u32) -> BoardRenderer {
        BoardRenderer::new(GridCoordinates::new(cols, rows, 78, 53).unwrap(), tile_size)
    }

    #[test]
    fn test_empty_tile_has_background_and_lines() {
        let renderer = renderer(4, 4, 256);
        let max = renderer.pyramid().max_level();
        let tile = renderer
            .render_tile(&SignatureIndex::new(), &FlippedState::new(), TileRequest::new(max, 0, 0))
            .unwrap();

        assert_eq!(tile.dimensions(), (256, 256));
        assert_eq!(tile.get_pixel(40, 20).0, BACKGROUND_COLOR);
        // Line centered on x = 78 covers 77..=79
        for x in 77..=79 {
            assert_eq!(tile.get_pixel(x, 20).0, GRID_LINE_COLOR);
        }
        assert_eq!(tile.get_pixel(76, 20).0, BACKGROUND_COLOR);
        assert_eq!(tile.get_pixel(80, 20).0, BACKGROUND_COLOR);
        // Board is 212 px tall; below it is transparent
        assert_eq!(tile.get_pixel(40, 230).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_signature_drawn_at_centered_box() {
        let renderer = renderer(4, 4, 256);
        let grid = *renderer.grid();
        let signatures = index(&grid, vec![signature("a", 1, 1, SignatureColor::Red)]);
        let max = renderer.pyramid().max_level();
        let tile = renderer
            .render_tile(&signatures, &FlippedState::new(), TileRequest::new(max, 0, 0))
            .unwrap();

        // Box starts at (79.5, 54.5); pixel row 54 has its center inside and carries the outline
        assert_eq!(tile.get_pixel(110, 54).0, GRID_LINE_COLOR);
        // Strokes cover the whole box interior
        assert_eq!(tile.get_pixel(110, 80).0, [0, 0, 0, 255]);
        assert_eq!(tile.get_pixel(10, 10).0, BACKGROUND_COLOR);
    }

    #[test]
    fn test_signature_split_across_tiles() {
        // 64 px tiles: the box at (0,0) spans x 1.5..76.5 and crosses into tile x = 1
        let renderer = renderer(2, 2, 64);
        let grid = *renderer.grid();
        let signatures = index(&grid, vec![signature("a", 0, 0, SignatureColor::Green)]);
        let max = renderer.pyramid().max_level();
        let flipped = FlippedState::new();

        let left = renderer.render_tile(&signatures, &flipped, TileRequest::new(max, 0, 0)).unwrap();
        let right = renderer.render_tile(&signatures, &flipped, TileRequest::new(max, 1, 0)).unwrap();
        assert_eq!(left.get_pixel(63, 25).0, [0, 0, 0, 255]);
        assert_eq!(right.get_pixel(0, 25).0, [0, 0, 0, 255]);
        // Outline at board x = 75 is tile-local x = 11
        assert_eq!(right.get_pixel(11, 25).0, GRID_LINE_COLOR);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = renderer(5, 5, 128);
        let grid = *renderer.grid();
        let signatures = index(
            &grid,
            vec![signature("a", 2, 2, SignatureColor::Blue), signature("b", 1, 2, SignatureColor::Pink)],
        );
        let mut flipped = FlippedState::new();
        flipped.toggle("b");

        for level in [renderer.pyramid().max_level(), 7, 3, 0] {
            let first = renderer.render_tile(&signatures, &flipped, TileRequest::new(level, 0, 0)).unwrap();
            let second = renderer.render_tile(&signatures, &flipped, TileRequest::new(level, 0, 0)).unwrap();
            assert_eq!(first.as_raw(), second.as_raw(), "level {}", level);
        }
    }

    #[test]
    fn test_flip_changes_only_the_flipped_box() {
        let renderer = renderer(3, 1, 256);
        let grid = *renderer.grid();
        let signatures = index(
            &grid,
            vec![signature("a", 0, 0, SignatureColor::Red), signature("b", 2, 0, SignatureColor::Red)],
        );
        let max = renderer.pyramid().max_level();
        let request = TileRequest::new(max, 0, 0);

        let before = renderer.render_tile(&signatures, &FlippedState::new(), request).unwrap();
        let mut flipped = FlippedState::new();
        flipped.toggle("a");
        let after = renderer.render_tile(&signatures, &flipped, request).unwrap();

        let a = grid.signature_bounds(GridPosition::new(0, 0), 75, 50);
        for (x, y, pixel) in after.enumerate_pixels() {
            let inside = a.contains(crate::grid::PixelPoint::new(x as f64 + 0.5, y as f64 + 0.5));
            if !inside {
                assert_eq!(pixel, before.get_pixel(x, y), "pixel {},{}", x, y);
            }
        }
        assert_ne!(before.as_raw(), after.as_raw());
    }

    #[test]
    fn test_lower_levels_downsample() {
        let renderer = renderer(4, 4, 256);
        let max = renderer.pyramid().max_level();
        let tile = renderer
            .render_tile(&SignatureIndex::new(), &FlippedState::new(), TileRequest::new(max - 1, 0, 0))
            .unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
        // 312 x 212 board halves to 156 x 106
        assert_ne!(tile.get_pixel(20, 20).0[3], 0);
        assert_eq!(tile.get_pixel(200, 20).0, [0, 0, 0, 0]);
        assert_eq!(tile.get_pixel(20, 120).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_lower_level_shows_scaled_signature() {
        let renderer = renderer(4, 4, 256);
        let grid = *renderer.grid();
        let signatures = index(&grid, vec![signature("a", 0, 0, SignatureColor::Red)]);
        let level = renderer.pyramid().max_level() - 1;
        let tile = renderer
            .render_tile(&signatures, &FlippedState::new(), TileRequest::new(level, 0, 0))
            .unwrap();

        // Board pixels 38..40 x 26..28 lie inside the stroke-covered box
        assert_eq!(tile.get_pixel(19, 13).0, [0, 0, 0, 255]);
        // Cell (2,2) is empty background
        assert_eq!(tile.get_pixel(97, 66).0, BACKGROUND_COLOR);
    }

    #[test]
    fn test_zoomed_out_tile_of_huge_board() {
        // 780000 x 530000 px; a full resolution pass would need terabytes
        let renderer = renderer(10_000, 10_000, 256);
        let grid = *renderer.grid();
        let signatures = index(
            &grid,
            vec![
                signature("a", 0, 0, SignatureColor::Blue),
                signature("b", 9_999, 9_999, SignatureColor::Green),
            ],
        );
        let flipped = FlippedState::new();

        let overview = renderer.render_tile(&signatures, &flipped, TileRequest::new(0, 0, 0)).unwrap();
        assert_eq!(overview.dimensions(), (256, 256));
        let pixel = overview.get_pixel(0, 0).0;
        assert_eq!(pixel[3], 255);
        // Mostly background with a share of grid line
        for channel in 0..3 {
            assert!(pixel[channel] <= BACKGROUND_COLOR[channel]);
            assert!(pixel[channel] >= GRID_LINE_COLOR[channel]);
        }
        assert_eq!(overview.get_pixel(1, 0).0, [0, 0, 0, 0]);

        let level = renderer.pyramid().max_level() - 6;
        let tile = renderer.render_tile(&signatures, &flipped, TileRequest::new(level, 0, 0)).unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
    }

    #[test]
    fn test_tile_outside_board_is_refused() {
        let renderer = renderer(2, 2, 256);
        let max = renderer.pyramid().max_level();
        let result = renderer.render_tile(&SignatureIndex::new(), &FlippedState::new(), TileRequest::new(max, 1, 0));
        assert!(matches!(result, Err(BoardError::TileOutOfBounds(_))));
        let result = renderer.render_tile(&SignatureIndex::new(), &FlippedState::new(), TileRequest::new(max + 1, 0, 0));
        assert!(matches!(result, Err(BoardError::TileOutOfBounds(_))));
    }

    #[test]
    fn test_reference_image() {
        let renderer = renderer(2, 2, 256);
        let image = renderer.render_reference().unwrap();
        assert_eq!(image.dimensions(), (156, 106));
        assert!(image.pixels().any(|p| p.0 == LABEL_COLOR));
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_tiles_covering_spans_levels() {
        let renderer = renderer(12, 36, 512);
        let grid = *renderer.grid();
        let tiles = renderer.tiles_covering(&grid.signature_bounds(GridPosition::new(0, 0), 75, 50));
        assert_eq!(tiles.len() as u32, renderer.pyramid().max_level() + 1);
        assert!(tiles.contains(&TileRequest::new(renderer.pyramid().max_level(), 0, 0)));
        assert!(tiles.contains(&TileRequest::new(0, 0, 0)));
        assert!(tiles.iter().all(|tile| renderer.pyramid().contains(*tile)));
    }
}
