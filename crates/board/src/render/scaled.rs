//! Drawing at less than full resolution
//!
//! Lower pyramid levels are composed straight into the tile: grid lines by
//! their covered fraction of each output pixel, sprites by area averaging.
//! Nothing larger than one tile or one sprite is ever allocated.

use crate::constants::GRID_LINE_WIDTH;
use crate::surface::Surface;

/// Fraction of each output pixel along one axis covered by grid lines
///
/// `start..end` is the board span drawn, `len` the number of output pixels.
/// Line `k` covers the board pixels `k*cell - 1 .. k*cell + 2`, the same
/// pixels a full resolution tile fills.
pub fn line_coverage(start: f64, end: f64, cell: u32, count: u32, scale: f64, len: usize) -> Vec<f64> {
    let mut coverage = vec![0.0; len];
    let cell = cell as f64;
    let half = (GRID_LINE_WIDTH / 2.0).floor();

    let first = ((start - GRID_LINE_WIDTH) / cell).floor().max(0.0) as u64;
    let last = (((end + GRID_LINE_WIDTH) / cell).floor().max(0.0) as u64).min(count as u64);
    for k in first..=last {
        let line_start = k as f64 * cell - half;
        let a = line_start.max(start);
        let b = (line_start + GRID_LINE_WIDTH).min(end);
        if b > a {
            spread(&mut coverage, (a - start) * scale, (b - start) * scale);
        }
    }
    coverage
}

/// Add the overlap of `[u0, u1)` with each output pixel
fn spread(coverage: &mut [f64], u0: f64, u1: f64) {
    let first = u0.floor().max(0.0) as usize;
    let last = (u1.ceil().max(0.0) as usize).min(coverage.len());
    for (px, covered) in coverage.iter_mut().enumerate().take(last).skip(first) {
        let px = px as f64;
        *covered += u1.min(px + 1.0) - u0.max(px);
    }
}

/// Linear mix of two opaque colors
pub fn mix(from: [u8; 4], to: [u8; 4], amount: f64) -> [u8; 4] {
    let amount = amount.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * amount).round() as u8;
    [
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
        channel(from[3], to[3]),
    ]
}

/// Composite `sprite`, whose top-left board pixel sits at (`left`, `top`)
/// relative to the surface origin, shrunk by `scale`
///
/// Each output pixel receives the area-weighted average of the sprite pixels
/// it covers; partially covered pixels get proportionally less alpha.
pub fn composite_scaled(surface: &mut Surface, sprite: &Surface, left: f64, top: f64, scale: f64) {
    let x0 = (left * scale).floor() as i64;
    let y0 = (top * scale).floor() as i64;
    let x1 = ((left + sprite.width as f64) * scale).ceil() as i64;
    let y1 = ((top + sprite.height as f64) * scale).ceil() as i64;
    let width = (x1 - x0).max(0) as usize;
    let height = (y1 - y0).max(0) as usize;

    // Premultiplied color and coverage per output pixel
    let mut sums = vec![[0.0f64; 4]; width * height];
    for sy in 0..sprite.height {
        let v0 = (top + sy as f64) * scale;
        let v1 = (top + sy as f64 + 1.0) * scale;
        for sx in 0..sprite.width {
            let Some(pixel) = sprite.get_pixel(sx as i64, sy as i64) else {
                continue;
            };
            if pixel[3] == 0 {
                continue;
            }
            let alpha = pixel[3] as f64 / 255.0;
            let u0 = (left + sx as f64) * scale;
            let u1 = (left + sx as f64 + 1.0) * scale;

            for oy in (v0.floor() as i64)..(v1.ceil() as i64) {
                let dy = v1.min((oy + 1) as f64) - v0.max(oy as f64);
                for ox in (u0.floor() as i64)..(u1.ceil() as i64) {
                    let dx = u1.min((ox + 1) as f64) - u0.max(ox as f64);
                    let weight = alpha * dx * dy;
                    let sum = &mut sums[(oy - y0) as usize * width + (ox - x0) as usize];
                    sum[0] += pixel[0] as f64 * weight;
                    sum[1] += pixel[1] as f64 * weight;
                    sum[2] += pixel[2] as f64 * weight;
                    sum[3] += weight;
                }
            }
        }
    }

    for (index, sum) in sums.iter().enumerate() {
        if sum[3] <= 0.0 {
            continue;
        }
        let color = [
            (sum[0] / sum[3]).round() as u8,
            (sum[1] / sum[3]).round() as u8,
            (sum[2] / sum[3]).round() as u8,
            (sum[3].min(1.0) * 255.0).round() as u8,
        ];
        let x = x0 + (index % width) as i64;
        let y = y0 + (index / width) as i64;
        surface.blend_pixel(x, y, color);
    }
}
