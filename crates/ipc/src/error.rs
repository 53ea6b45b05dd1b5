//! Error types for wire parsing.

/// Errors that can occur while decoding wire values.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Unknown signature color: {0}")]
    UnknownColor(String),
}
