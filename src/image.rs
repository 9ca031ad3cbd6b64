//! The executable image handed to the loader.

use crate::error::{LoaderError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-effort classification of an image, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    /// ELF object (`\x7fELF`).
    Elf,
    /// Interpreter script starting with `#!`.
    Script,
    /// Anything else. Still loadable; the kernel decides at exec time.
    Unknown,
}

impl ImageKind {
    pub fn sniff(data: &[u8]) -> Self {
        if infer::app::is_elf(data) {
            ImageKind::Elf
        } else if data.starts_with(b"#!") {
            ImageKind::Script
        } else {
            ImageKind::Unknown
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageKind::Elf => "elf",
            ImageKind::Script => "script",
            ImageKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// An immutable, shared, non-empty byte buffer holding an executable.
///
/// Cloning is cheap: the bytes are reference counted, so the loader can keep
/// its own handle on the image for repopulation without copying it.
#[derive(Clone, PartialEq, Eq)]
pub struct ExecutableImage {
    data: Bytes,
}

impl ExecutableImage {
    /// Wraps `data`, rejecting an empty buffer.
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(LoaderError::EmptyImage);
        }
        Ok(Self { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn kind(&self) -> ImageKind {
        ImageKind::sniff(&self.data)
    }

    /// The shared buffer backing this image.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl AsRef<[u8]> for ExecutableImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for ExecutableImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableImage")
            .field("len", &self.data.len())
            .field("kind", &self.kind())
            .finish()
    }
}
