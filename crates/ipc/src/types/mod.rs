//! Type definitions for signature records and board state.

mod board;
mod signature;

pub use board::*;
pub use signature::*;
