//! Error types for experiment store operations.

use thiserror::Error;

use crate::client::ClientError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the experiment store.
///
/// Remote failures are carried through unmodified; the store does no
/// translation, retry or rollback of its own.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A frame-scoped action was invoked before the experiment loaded
    #[error("invalid operation '{action}' at this state")]
    NotLoaded {
        /// Name of the offending action
        action: &'static str,
    },

    /// No polygon exists at the given index in the current frame
    #[error("no polygon at index {index} in the current frame")]
    PolygonIndex {
        /// The out-of-range polygon index
        index: usize,
    },

    /// The polygon has never been saved and carries no server identifier
    #[error("polygon at index {index} has no server identifier yet")]
    Unsynced {
        /// Index of the polygon in the current frame
        index: usize,
    },

    /// An experiment-scoped batch response did not match the frame count
    #[error("batch response carried {got} frames, expected {expected}")]
    FrameMismatch {
        /// Number of frames in the local model
        expected: usize,
        /// Number of frames in the response
        got: usize,
    },

    /// Another experiment-scoped batch operation is still in flight
    #[error("a batch operation is already in progress")]
    Busy,

    /// Remote call failed
    #[error("remote call failed: {0}")]
    Remote(#[from] ClientError),
}
