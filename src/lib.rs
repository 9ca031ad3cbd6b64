//! Run executables straight from memory.
//!
//! `memexec` copies an executable image into an anonymous, unlinked memory
//! object (`memfd_create(2)`) and builds a [`std::process::Command`] that
//! executes it through `/proc/<pid>/fd/<fd>`. The payload never touches
//! persistent storage.
//!
//! ```no_run
//! use memexec::LoadedBinary;
//!
//! let image = std::fs::read("/bin/true")?;
//! let binary = LoadedBinary::new(image)?;
//! let status = binary.command(["--version"])?.status()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Loader configuration
pub mod config;
pub mod error;
pub mod hashing;
pub mod image;
pub mod io;
pub mod loader;
pub mod logging;
/// Anonymous memory objects and the syscall binding
pub mod memfd;
pub mod timeout;

pub use config::{ExecFlagPolicy, ImageLimits, LoaderConfig};
pub use error::{LoaderError, Result};
pub use image::{ExecutableImage, ImageKind};
pub use loader::LoadedBinary;
pub use memfd::{AnonymousFileProvider, Memfd, MemfdFlags};
