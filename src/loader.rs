//! The anonymous executable loader.
//!
//! [`LoadedBinary`] keeps an executable image in an unlinked memory object
//! and hands out [`Command`]s that execute it through
//! `/proc/<pid>/fd/<fd>`. The payload never reaches a filesystem, and the
//! memory object goes away when the handle is closed or dropped.

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::hashing::short_fingerprint;
use crate::image::ExecutableImage;
use crate::memfd::{self, AnonymousFileProvider, Memfd};
use bytes::Bytes;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// A live memory object holding the image.
#[derive(Debug)]
struct OpenObject {
    file: File,
    path: PathBuf,
}

#[derive(Debug)]
enum HandleState {
    Closed,
    Open(OpenObject),
}

/// An executable image materialized as an anonymous memory object.
///
/// The handle is either closed (no descriptor held) or open (one descriptor
/// whose content is exactly the image). [`open`](Self::open) always goes
/// through the closed state first, so a handle never holds more than one
/// memory object.
///
/// Not safe for concurrent use; wrap it in a mutex if it must be shared.
pub struct LoadedBinary<P: AnonymousFileProvider = Memfd> {
    image: ExecutableImage,
    fingerprint: String,
    state: HandleState,
    provider: P,
    config: LoaderConfig,
}

impl LoadedBinary<Memfd> {
    /// Loads `image` into a new memory object using the default configuration.
    ///
    /// # Errors
    ///
    /// `EmptyImage` for a zero-length buffer, or any error from [`open`](Self::open).
    pub fn new(image: impl Into<Bytes>) -> Result<Self> {
        Self::with_config(image, LoaderConfig::default())
    }

    pub fn with_config(image: impl Into<Bytes>, config: LoaderConfig) -> Result<Self> {
        Self::with_provider(image, config, Memfd)
    }

    /// Reads the file at `path` into memory and loads it.
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self> {
        Self::from_file_with_config(path, LoaderConfig::default())
    }

    pub fn from_file_with_config<T: AsRef<Path>>(path: T, config: LoaderConfig) -> Result<Self> {
        Self::from_file_with_provider(path, config, Memfd)
    }
}

impl<P: AnonymousFileProvider> LoadedBinary<P> {
    /// Loads `image` using `provider` to create memory objects.
    pub fn with_provider(image: impl Into<Bytes>, config: LoaderConfig, provider: P) -> Result<Self> {
        let image = ExecutableImage::new(image)?;
        let fingerprint = short_fingerprint(image.as_bytes());
        let mut binary = Self {
            image,
            fingerprint,
            state: HandleState::Closed,
            provider,
            config,
        };
        binary.open()?;
        Ok(binary)
    }

    pub fn from_file_with_provider<T: AsRef<Path>>(
        path: T,
        config: LoaderConfig,
        provider: P,
    ) -> Result<Self> {
        let path = path.as_ref();
        let data = crate::io::read_image(path, &config.limits)?;
        debug!(path = %path.display(), size = data.len(), "Loaded image file into memory");
        Self::with_provider(data, config, provider)
    }

    /// (Re)creates the memory object and writes the image into it.
    ///
    /// Safe to call on an open handle: the current object is closed first.
    /// A failure to release that previous object is logged at `warn` and
    /// does not stop the reopen; the new object is created regardless.
    /// On failure the handle is left closed.
    pub fn open(&mut self) -> Result<()> {
        // The state is Closed after this whatever close reports.
        if let Err(e) = self.close() {
            warn!(error = %e, "Close before reopen failed, continuing");
        }

        let name = self.config.memfd_cname()?;
        let fd = memfd::create_executable(&self.provider, &name, self.config.exec_flag)
            .map_err(|e| crate::log_error!(LoaderError::CreateFailed(e), "memfd_create"))?;
        let path = memfd::pseudo_path(std::process::id(), fd.as_raw_fd());
        let mut file = File::from(fd);

        if let Err(e) = write_image(&mut file, self.image.as_bytes()) {
            if let Err(close_err) = memfd::close_fd(OwnedFd::from(file)) {
                warn!(error = %close_err, "Failed to close memory object after write error");
            }
            return Err(crate::log_error!(e, "populate memory object"));
        }

        info!(
            path = %path.display(),
            size = self.image.len(),
            kind = %self.image.kind(),
            fingerprint = %self.fingerprint,
            "Image loaded into memory object"
        );
        self.state = HandleState::Open(OpenObject { file, path });
        Ok(())
    }

    /// Releases the memory object. A no-op on a closed handle.
    ///
    /// The handle is closed afterwards even when the release reports an error.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, HandleState::Closed) {
            HandleState::Closed => Ok(()),
            HandleState::Open(object) => {
                debug!(path = %object.path.display(), "Releasing memory object");
                memfd::close_fd(OwnedFd::from(object.file)).map_err(LoaderError::CloseFailed)
            }
        }
    }

    /// Builds a command that executes the loaded image with `args`.
    ///
    /// Nothing is spawned. The command stays valid only while this handle
    /// is open, since it names the descriptor by path.
    ///
    /// # Errors
    ///
    /// `NotOpen` if the handle is closed.
    pub fn command<I, S>(&self, args: I) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let object = self.open_object().ok_or(LoaderError::NotOpen)?;
        let mut command = Command::new(&object.path);
        command.args(args);
        Ok(command)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, HandleState::Open(_))
    }

    /// `/proc/<pid>/fd/<fd>` of the live memory object.
    pub fn pseudo_path(&self) -> Option<&Path> {
        self.open_object().map(|o| o.path.as_path())
    }

    pub fn raw_fd(&self) -> Option<RawFd> {
        self.open_object().map(|o| o.file.as_raw_fd())
    }

    pub fn image(&self) -> &ExecutableImage {
        &self.image
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Short SHA-256 fingerprint of the image, as used in log lines.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn open_object(&self) -> Option<&OpenObject> {
        match &self.state {
            HandleState::Open(object) => Some(object),
            HandleState::Closed => None,
        }
    }
}

/// Writes the whole image with a single `write` call.
fn write_image<W: Write>(writer: &mut W, image: &[u8]) -> Result<()> {
    let written = writer.write(image).map_err(LoaderError::WriteFailed)?;
    if written != image.len() {
        return Err(LoaderError::PartialWrite {
            written,
            expected: image.len(),
        });
    }
    Ok(())
}

impl<P: AnonymousFileProvider> Drop for LoadedBinary<P> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close memory object on drop");
        }
    }
}

impl<P: AnonymousFileProvider> fmt::Debug for LoadedBinary<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedBinary")
            .field("image", &self.image)
            .field("fingerprint", &self.fingerprint)
            .field("state", &self.state)
            .finish()
    }
}
