//! Signature records and their grid placement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use signboard_config::{DEFAULT_SIGNATURE_HEIGHT, DEFAULT_SIGNATURE_WIDTH};

use crate::IpcError;

/// Location recorded when the submitter did not provide one.
pub const DEFAULT_LOCATION: &str = "Unknown";

/// A (col, row) grid cell address.
///
/// Signed so that coordinate math stays total for out-of-range input;
/// validity is a separate question answered by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub col: i32,
    pub row: i32,
}

impl GridPosition {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// Background color picked for a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureColor {
    Red,
    Blue,
    Yellow,
    Green,
    Pink,
    Purple,
}

impl SignatureColor {
    pub const ALL: [SignatureColor; 6] = [
        Self::Red,
        Self::Blue,
        Self::Yellow,
        Self::Green,
        Self::Pink,
        Self::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Purple => "purple",
        }
    }
}

impl FromStr for SignatureColor {
    type Err = IpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| IpcError::UnknownColor(s.to_string()))
    }
}

fn default_width() -> u32 {
    DEFAULT_SIGNATURE_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_SIGNATURE_HEIGHT
}

/// A stored signature.
///
/// Immutable once created; the flipped/face display state lives on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: String,
    pub grid_position: GridPosition,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub color: SignatureColor,
    /// ISO-8601 submission time
    pub timestamp: String,
    /// Opaque drawing payload, normally a `data:image/png;base64,` URL
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Signature {
    /// Location for display, falling back to [`DEFAULT_LOCATION`]
    pub fn location_or_default(&self) -> &str {
        match self.location.as_deref() {
            Some(location) if !location.trim().is_empty() => location,
            _ => DEFAULT_LOCATION,
        }
    }
}

/// A validated signature that has not been assigned an id or timestamp yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignature {
    pub grid_position: GridPosition,
    pub width: u32,
    pub height: u32,
    pub color: SignatureColor,
    pub data: String,
    pub location: Option<String>,
    pub device_id: Option<String>,
}

impl NewSignature {
    /// Complete the record with the identity assigned by the store
    pub fn into_signature(self, id: String, timestamp: String) -> Signature {
        Signature {
            id,
            grid_position: self.grid_position,
            width: self.width,
            height: self.height,
            color: self.color,
            timestamp,
            data: self.data,
            location: Some(self.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string())),
            device_id: self.device_id,
        }
    }
}
