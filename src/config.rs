//! Configuration for the loader.
//!
//! Provides the loader settings with sensible defaults. Settings can be
//! built in code, parsed from JSON, or partially overridden from the
//! environment.

use crate::error::{LoaderError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::CString;
use std::path::Path;

/// Environment variable overriding [`LoaderConfig::memfd_name`].
pub const MEMFD_NAME_ENV: &str = "MEMEXEC_MEMFD_NAME";

/// Default name given to the memory object. Shows up as `/memfd:<name> (deleted)`.
pub const DEFAULT_MEMFD_NAME: &str = "memexec";

/// Master configuration for [`crate::loader::LoadedBinary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Name passed to `memfd_create`. Purely diagnostic.
    pub memfd_name: String,
    /// Whether to request `MFD_EXEC` when creating the memory object.
    pub exec_flag: ExecFlagPolicy,
    /// Size limits applied to images.
    pub limits: ImageLimits,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            memfd_name: DEFAULT_MEMFD_NAME.to_string(),
            exec_flag: ExecFlagPolicy::default(),
            limits: ImageLimits::default(),
        }
    }
}

/// How the loader asks for execute permission on the memory object.
///
/// Kernels before 6.3 reject `MFD_EXEC` with `EINVAL`; on those kernels a
/// memfd is executable without it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecFlagPolicy {
    /// Request `MFD_EXEC`, retrying once without it on `EINVAL`.
    #[default]
    PreferExec,
    /// Request `MFD_EXEC` and fail if the kernel does not know it.
    RequireExec,
    /// Never request `MFD_EXEC`.
    Never,
}

/// Limits on the size of images the loader accepts from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    /// Largest image file that `from_file` will read, in bytes.
    pub max_image_size: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_image_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoaderError::Config(e.to_string()))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoaderError::Config(e.to_string()))
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(name) = std::env::var(MEMFD_NAME_ENV) {
            self.memfd_name = name;
        }
        self
    }

    /// The memfd name as a C string.
    pub fn memfd_cname(&self) -> Result<CString> {
        CString::new(self.memfd_name.as_str())
            .map_err(|_| LoaderError::InvalidName(self.memfd_name.clone()))
    }
}
