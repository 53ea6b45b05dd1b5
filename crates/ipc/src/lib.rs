//! Wire protocol for the signature board
//!
//! Defines the signature record and every request/response body exchanged
//! between the viewer, the HTTP surface and the signature store.

mod error;
mod messages;
mod types;

pub use error::IpcError;
pub use messages::*;
pub use types::*;
