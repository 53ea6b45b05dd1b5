//! Placement policy: which free cell a new signature goes into

use signboard_config::PlacementStrategy;
use signboard_ipc::GridPosition;
use thiserror::Error;
use tracing::debug;

use crate::grid::{GridCoordinates, OccupiedPositions};

/// Every cell already holds a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no free cell left on the grid")]
pub struct GridFull;

/// Interchangeable cell selection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    /// Closest free cell to the grid center; the board grows from the middle
    #[default]
    CenterSeeking,
    /// First free cell in row-major order from the top-left
    ScanOrder,
}

impl From<PlacementStrategy> for PlacementPolicy {
    fn from(strategy: PlacementStrategy) -> Self {
        match strategy {
            PlacementStrategy::CenterSeeking => Self::CenterSeeking,
            PlacementStrategy::ScanOrder => Self::ScanOrder,
        }
    }
}

impl PlacementPolicy {
    /// Pick a free, valid cell or report that the grid is full
    pub fn assign<O>(&self, grid: &GridCoordinates, occupied: &O) -> Result<GridPosition, GridFull>
    where
        O: OccupiedPositions + ?Sized,
    {
        let position = match self {
            Self::CenterSeeking => grid.find_best_position(occupied),
            Self::ScanOrder => grid.next_available_position(occupied),
        }
        .ok_or(GridFull)?;

        debug_assert!(grid.can_place_signature(position, occupied));
        debug!("{:?} placement assigned cell {}", self, position);
        Ok(position)
    }
}
