//! Bounded reading of image files from disk.
//!
//! Images are memory-mapped read-only and copied once into an owned
//! [`Bytes`] buffer, so the loader never holds a mapping of a file that
//! might change underneath it.

use crate::config::ImageLimits;
use crate::error::{LoaderError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a whole image file, enforcing `limits`.
///
/// # Errors
///
/// - `LoaderError::Io` if the file cannot be opened, stat'ed or mapped.
/// - `LoaderError::ImageTooLarge` if the file exceeds `limits.max_image_size`.
/// - `LoaderError::EmptyImage` if the file has zero length.
pub fn read_image<P: AsRef<Path>>(path: P, limits: &ImageLimits) -> Result<Bytes> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    debug!(
        path = %path.display(),
        size = file_size,
        limit = limits.max_image_size,
        "Reading image file"
    );

    if file_size > limits.max_image_size {
        warn!(
            path = %path.display(),
            size = file_size,
            limit = limits.max_image_size,
            "Image file is too large"
        );
        return Err(LoaderError::ImageTooLarge {
            size: file_size,
            limit: limits.max_image_size,
        });
    }

    // memmap cannot map empty files.
    if file_size == 0 {
        return Err(LoaderError::EmptyImage);
    }

    // Safety: read-only map of a regular file; the contents are copied out
    // before the map is dropped.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Bytes::copy_from_slice(&mmap[..]))
}
