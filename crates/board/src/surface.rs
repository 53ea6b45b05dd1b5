//! RGBA8 raster surface for tile rendering

use image::RgbaImage;

use crate::error::RenderError;
use crate::grid::PixelRect;

/// An 8-bit RGBA surface.
/// Pixels are stored row-major as [r, g, b, a].
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Surface {
    /// Create a new surface initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; pixel_count],
        }
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel, None if out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Set a pixel; out of bounds writes are dropped
    #[inline]
    pub fn set_pixel(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = color;
        }
    }

    /// Source-over composite of `color` onto a pixel
    #[inline]
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: [u8; 4]) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        self.pixels[index] = blend(self.pixels[index], color);
    }

    /// Fill the integer pixel range [x0, x1) x [y0, y1), clipped to the surface
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 4]) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width as i64);
        let y1 = y1.min(self.height as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Fill every pixel whose center lies inside the rounded rectangle
    pub fn fill_rounded_rect(&mut self, rect: PixelRect, radius: f64, color: [u8; 4]) {
        self.fill_where(rect, color, |cx, cy| inside_rounded(rect, radius, cx, cy));
    }

    /// Outline a rounded rectangle with a stroke centered on its edge
    pub fn stroke_rounded_rect(&mut self, rect: PixelRect, radius: f64, width: f64, color: [u8; 4]) {
        let half = width / 2.0;
        let outer = PixelRect::new(rect.x - half, rect.y - half, rect.width + width, rect.height + width);
        let inner = PixelRect::new(rect.x + half, rect.y + half, rect.width - width, rect.height - width);
        self.fill_where(outer, color, |cx, cy| {
            inside_rounded(outer, radius + half, cx, cy) && !inside_rounded(inner, (radius - half).max(0.0), cx, cy)
        });
    }

    fn fill_where<F>(&mut self, bounds: PixelRect, color: [u8; 4], inside: F)
    where
        F: Fn(f64, f64) -> bool,
    {
        let x0 = bounds.x.floor().max(0.0) as i64;
        let y0 = bounds.y.floor().max(0.0) as i64;
        let x1 = (bounds.right().ceil() as i64).min(self.width as i64);
        let y1 = (bounds.bottom().ceil() as i64).min(self.height as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(x as f64 + 0.5, y as f64 + 0.5) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Composite an image with its top-left corner at (x, y)
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        for (ix, iy, pixel) in image.enumerate_pixels() {
            if pixel.0[3] == 0 {
                continue;
            }
            self.blend_pixel(x + ix as i64, y + iy as i64, pixel.0);
        }
    }

    /// Get raw pixel data as RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy into an image buffer for encoding or resampling
    pub fn to_image(&self) -> Result<RgbaImage, RenderError> {
        RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec()).ok_or(RenderError::Buffer {
            width: self.width,
            height: self.height,
        })
    }
}

/// Source-over compositing in straight (non-premultiplied) alpha
#[inline]
pub fn blend(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => dst,
        255 => src,
        _ => {
            let sa = src[3] as f32 / 255.0;
            let da = dst[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let channel = |s: u8, d: u8| {
                let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
                value.round().clamp(0.0, 255.0) as u8
            };
            [
                channel(src[0], dst[0]),
                channel(src[1], dst[1]),
                channel(src[2], dst[2]),
                (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
            ]
        }
    }
}

/// Point-in-rounded-rectangle test; radius is clamped to half the short side
fn inside_rounded(rect: PixelRect, radius: f64, px: f64, py: f64) -> bool {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    if px < rect.x || px >= rect.right() || py < rect.y || py >= rect.bottom() {
        return false;
    }
    let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    let cx = px.max(rect.x + radius).min(rect.right() - radius);
    let cy = py.max(rect.y + radius).min(rect.bottom() - radius);
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy <= radius * radius
}
