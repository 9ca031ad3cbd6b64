//! Error types for the memexec loader.
//!
//! A single `thiserror` enum covers every failure of the load/open/close
//! sequence so callers can match on the exact step that went wrong.

use thiserror::Error;

/// Main error type for loader operations.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The image (buffer or file) has zero bytes. Raised before any syscall.
    #[error("Executable image is empty")]
    EmptyImage,

    /// Reading an image file from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image file is larger than the configured limit.
    #[error("Image size of {size} bytes exceeds the limit of {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },

    /// The kernel refused to allocate the anonymous memory object.
    #[error("memfd_create failed: {0}")]
    CreateFailed(#[source] std::io::Error),

    /// Writing the image into the memory object failed.
    #[error("Failed to write image to memory object: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The kernel accepted fewer bytes than the image length.
    #[error("Partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    /// Releasing the kernel handle reported an error. The handle is closed regardless.
    #[error("Failed to close memory object: {0}")]
    CloseFailed(#[source] std::io::Error),

    /// An operation that needs a live memory object was called on a closed handle.
    #[error("Loaded binary is not open")]
    NotOpen,

    /// The memory object name cannot be passed to the kernel.
    #[error("Invalid memfd name: {0}")]
    InvalidName(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The process launcher failed to start the command.
    #[error("Failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),

    /// A spawned command did not finish in time.
    #[error("Command timeout after {millis}ms")]
    Timeout { millis: u64 },
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

impl LoaderError {
    /// True for the two failures that leave the open sequence without a populated object.
    pub fn is_population_failure(&self) -> bool {
        matches!(
            self,
            LoaderError::WriteFailed(_) | LoaderError::PartialWrite { .. }
        )
    }
}
