//! Per-signature box in its face or back state

use chrono::DateTime;
use signboard_ipc::{Signature, SignatureColor};

use crate::constants::{
    CAPTION_COLOR, CAPTION_LINE_GAP, CAPTION_PADDING, CORNER_RADIUS, GRID_LINE_COLOR, OUTLINE_WIDTH,
};
use crate::glyphs::{self, GLYPH_HEIGHT};
use crate::grid::PixelRect;
use crate::surface::Surface;

use super::PlacedSignature;

/// Fill color of a signature box
pub fn fill_color(color: SignatureColor) -> [u8; 4] {
    match color {
        SignatureColor::Red => [0xff, 0x6b, 0x6b, 0xff],
        SignatureColor::Blue => [0x4d, 0xab, 0xf7, 0xff],
        SignatureColor::Yellow => [0xff, 0xd4, 0x3b, 0xff],
        SignatureColor::Green => [0x51, 0xcf, 0x66, 0xff],
        SignatureColor::Pink => [0xf7, 0x83, 0xac, 0xff],
        SignatureColor::Purple => [0xcc, 0x5d, 0xe8, 0xff],
    }
}

/// Date, time and location lines shown on the back of a signature
pub fn caption_lines(signature: &Signature) -> [String; 3] {
    let (date, time) = match DateTime::parse_from_rfc3339(&signature.timestamp) {
        Ok(timestamp) => (
            timestamp.format("%Y-%m-%d").to_string(),
            timestamp.format("%H:%M").to_string(),
        ),
        Err(_) => (signature.timestamp.clone(), String::new()),
    };
    [date, time, signature.location_or_default().to_string()]
}

/// Render the box of one signature at its own size, origin at (0, 0)
pub fn render_sprite(placed: &PlacedSignature, flipped: bool) -> Surface {
    let signature = &placed.signature;
    let mut sprite = Surface::new(signature.width, signature.height);
    let full = PixelRect::new(0.0, 0.0, signature.width as f64, signature.height as f64);
    sprite.fill_rounded_rect(full, CORNER_RADIUS, fill_color(signature.color));

    if flipped {
        draw_caption(&mut sprite, signature);
    } else if let Some(strokes) = &placed.strokes {
        // Strokes stay inside the rounded box
        for (x, y, pixel) in strokes.enumerate_pixels() {
            let (x, y) = (x as i64, y as i64);
            if sprite.get_pixel(x, y).is_some_and(|under| under[3] != 0) {
                sprite.blend_pixel(x, y, pixel.0);
            }
        }
    }

    // Inset by half the stroke so the outline lands on the outermost pixels
    let half = OUTLINE_WIDTH / 2.0;
    let outline = PixelRect::new(half, half, full.width - OUTLINE_WIDTH, full.height - OUTLINE_WIDTH);
    sprite.stroke_rounded_rect(outline, CORNER_RADIUS, OUTLINE_WIDTH, GRID_LINE_COLOR);
    sprite
}

fn draw_caption(sprite: &mut Surface, signature: &Signature) {
    let lines = caption_lines(signature);
    let max_width = sprite.width.saturating_sub(2 * CAPTION_PADDING);
    let block_height = 3 * GLYPH_HEIGHT + 2 * CAPTION_LINE_GAP;
    let mut y = (sprite.height as i64 - block_height as i64) / 2;

    for line in &lines {
        let text = glyphs::fit_text(line, max_width);
        let x = (sprite.width as i64 - glyphs::text_width(text) as i64) / 2;
        glyphs::draw_text(sprite, text, x, y, CAPTION_COLOR);
        y += (GLYPH_HEIGHT + CAPTION_LINE_GAP) as i64;
    }
}
