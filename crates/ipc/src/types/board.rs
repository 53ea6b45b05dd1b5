//! Board geometry and occupancy summaries reported to the viewer.

use serde::{Deserialize, Serialize};

/// Cell usage across the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridUsage {
    pub total: u64,
    pub used: u64,
    pub open: u64,
    pub percentage_used: f64,
}

/// What the viewer needs to fit the whole board and request tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInfo {
    pub width: u64,
    pub height: u64,
    pub tile_size: u32,
    pub tile_overlap: u32,
    pub max_level: u32,
    pub cols: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub usage: GridUsage,
}
