//! Shared configuration for the signature board
//!
//! This crate provides the single source of truth for grid geometry, tile
//! size, placement strategy and server settings shared by the board core and
//! the HTTP binary.

mod loader;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use loader::{ConfigError, load};

/// Default cell width in pixels (75 px signature + 3 px grid line)
pub const DEFAULT_CELL_WIDTH: u32 = 78;

/// Default cell height in pixels (50 px signature + 3 px grid line)
pub const DEFAULT_CELL_HEIGHT: u32 = 53;

/// Minimum number of columns regardless of viewport
pub const MIN_COLS: u32 = 12;

/// Minimum number of rows regardless of viewport
pub const MIN_ROWS: u32 = 36;

/// Largest column or row count; cell indices are `i32`
pub const MAX_GRID_CELLS: u32 = i32::MAX as u32;

/// Horizontal viewport padding subtracted before sizing the grid
pub const VIEWPORT_PADDING_X: u32 = 40;

/// Vertical viewport padding (header plus margins) subtracted before sizing the grid
pub const VIEWPORT_PADDING_Y: u32 = 160;

/// Default signature box width in pixels
pub const DEFAULT_SIGNATURE_WIDTH: u32 = 75;

/// Default signature box height in pixels
pub const DEFAULT_SIGNATURE_HEIGHT: u32 = 50;

/// Default tile edge length requested by the viewer
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8787;

/// Default page size when listing signatures
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Grid geometry: how many cells and how large each one is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub cols: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: MIN_COLS,
            rows: MIN_ROWS,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
        }
    }
}

impl GridConfig {
    /// Size the grid to fill a viewport, never going below the minimum grid
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let usable_width = width.saturating_sub(VIEWPORT_PADDING_X);
        let usable_height = height.saturating_sub(VIEWPORT_PADDING_Y);

        Self {
            cols: (usable_width / DEFAULT_CELL_WIDTH).max(MIN_COLS),
            rows: (usable_height / DEFAULT_CELL_HEIGHT).max(MIN_ROWS),
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
        }
    }

    /// Total board width in pixels
    pub fn board_width(&self) -> u64 {
        self.cols as u64 * self.cell_width as u64
    }

    /// Total board height in pixels
    pub fn board_height(&self) -> u64 {
        self.rows as u64 * self.cell_height as u64
    }
}

/// Size of the box each signature occupies inside its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureStyle {
    pub width: u32,
    pub height: u32,
}

impl Default for SignatureStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIGNATURE_WIDTH,
            height: DEFAULT_SIGNATURE_HEIGHT,
        }
    }
}

/// Tile source settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileConfig {
    pub tile_size: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

/// How a new signature picks its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Fill outward from the middle of the board
    #[default]
    CenterSeeking,
    /// Fill row-major from the top-left cell
    ScanOrder,
}

impl FromStr for PlacementStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "center-seeking" => Ok(Self::CenterSeeking),
            "scan" | "scan-order" => Ok(Self::ScanOrder),
            other => Err(ConfigError::Invalid {
                key: "placement",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CenterSeeking => f.write_str("center-seeking"),
            Self::ScanOrder => f.write_str("scan-order"),
        }
    }
}

/// Everything the board core needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub grid: GridConfig,
    pub signature: SignatureStyle,
    pub tiles: TileConfig,
    pub placement: PlacementStrategy,
}

/// HTTP server and persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON file backing the signature store; `None` keeps signatures in memory
    pub store_path: Option<String>,
    /// Page size used when rebuilding the board from the store
    pub page_size: usize,
    /// Insert the example signatures into an empty store at startup
    pub seed_examples: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            store_path: Some("data/signatures.json".to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            seed_examples: false,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Reject configurations the board cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.board.grid;
        let checks: [(&'static str, u64); 7] = [
            ("cols", grid.cols as u64),
            ("rows", grid.rows as u64),
            ("cellWidth", grid.cell_width as u64),
            ("cellHeight", grid.cell_height as u64),
            ("signature.width", self.board.signature.width as u64),
            ("signature.height", self.board.signature.height as u64),
            ("tileSize", self.board.tiles.tile_size as u64),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                });
            }
        }
        // Cells are addressed with signed column and row indices
        for (key, value) in [("cols", grid.cols), ("rows", grid.rows)] {
            if value > MAX_GRID_CELLS {
                return Err(ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                });
            }
        }
        if self.server.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "pageSize",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
