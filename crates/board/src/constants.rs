/// Board background (#f5f5f7).
pub const BACKGROUND_COLOR: [u8; 4] = [0xf5, 0xf5, 0xf7, 0xff];

/// Grid separator lines and signature outlines (#e0e0e0).
pub const GRID_LINE_COLOR: [u8; 4] = [0xe0, 0xe0, 0xe0, 0xff];

/// Grid separator width in board pixels.
pub const GRID_LINE_WIDTH: f64 = 3.0;

/// Signature outline width in board pixels.
pub const OUTLINE_WIDTH: f64 = 1.0;

/// Corner radius of signature boxes.
pub const CORNER_RADIUS: f64 = 4.0;

/// Cell labels on the grid reference image (#86868b).
pub const LABEL_COLOR: [u8; 4] = [0x86, 0x86, 0x8b, 0xff];

/// Caption text on the back face of a signature (#1d1d1f).
pub const CAPTION_COLOR: [u8; 4] = [0x1d, 0x1d, 0x1f, 0xff];

/// Horizontal padding inside a signature box before caption text.
pub const CAPTION_PADDING: u32 = 3;

/// Blank pixels between caption lines.
pub const CAPTION_LINE_GAP: u32 = 3;

/// Fully transparent pixel.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
