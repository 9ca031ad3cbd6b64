//! Anonymous memory objects.
//!
//! `memfd_create(2)` creates an anonymous file and returns a file descriptor
//! referring to it. The file behaves like a regular file but lives in RAM,
//! has no directory entry, and disappears once its last reference closes.
//! Because it has no path of its own, it is addressed through the owning
//! process's descriptor table: `/proc/<pid>/fd/<fd>`.

use crate::config::ExecFlagPolicy;
use bitflags::bitflags;
use std::ffi::CStr;
use std::io;
use std::os::fd::{FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::path::PathBuf;
use tracing::{debug, warn};

bitflags! {
    /// Flags accepted by `memfd_create(2)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemfdFlags: u32 {
        const CLOEXEC = 0x0001;
        const ALLOW_SEALING = 0x0002;
        const NOEXEC_SEAL = 0x0008;
        /// Linux 6.3+. Older kernels reject it with `EINVAL`.
        const EXEC = 0x0010;
    }
}

/// Source of anonymous memory objects.
pub trait AnonymousFileProvider {
    /// Create a new anonymous file called `name`. The returned descriptor is
    /// readable and writable.
    fn create(&self, name: &CStr, flags: MemfdFlags) -> io::Result<OwnedFd>;
}

impl<T: AnonymousFileProvider + ?Sized> AnonymousFileProvider for &T {
    fn create(&self, name: &CStr, flags: MemfdFlags) -> io::Result<OwnedFd> {
        (**self).create(name, flags)
    }
}

impl<T: AnonymousFileProvider + ?Sized> AnonymousFileProvider for Box<T> {
    fn create(&self, name: &CStr, flags: MemfdFlags) -> io::Result<OwnedFd> {
        (**self).create(name, flags)
    }
}

/// The kernel's `memfd_create`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Memfd;

impl AnonymousFileProvider for Memfd {
    fn create(&self, name: &CStr, flags: MemfdFlags) -> io::Result<OwnedFd> {
        // Safety: `name` is NUL-terminated and outlives the call.
        let fd = unsafe { libc::memfd_create(name.as_ptr(), flags.bits()) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // Safety: the kernel just handed us this descriptor; nothing else owns it.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }
}

/// Creates a close-on-exec memory object that may be executed, honouring `policy`.
pub fn create_executable<P: AnonymousFileProvider + ?Sized>(
    provider: &P,
    name: &CStr,
    policy: ExecFlagPolicy,
) -> io::Result<OwnedFd> {
    let base = MemfdFlags::CLOEXEC;
    match policy {
        ExecFlagPolicy::Never => provider.create(name, base),
        ExecFlagPolicy::RequireExec => provider.create(name, base | MemfdFlags::EXEC),
        ExecFlagPolicy::PreferExec => match provider.create(name, base | MemfdFlags::EXEC) {
            Err(e) if e.raw_os_error() == Some(libc::EINVAL) => {
                warn!("Kernel rejected MFD_EXEC, retrying without it");
                provider.create(name, base)
            }
            other => other,
        },
    }
}

/// Releases `fd` with an explicit `close(2)` so the result is observable.
///
/// The descriptor is gone afterwards whatever the return value; Linux never
/// leaves it open on error, so this must not be retried.
pub fn close_fd(fd: OwnedFd) -> io::Result<()> {
    let raw = fd.into_raw_fd();
    debug!(fd = raw, "Closing memory object");
    // Safety: `raw` came from an `OwnedFd`, so we are its sole owner.
    if unsafe { libc::close(raw) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Path under which process `pid` exposes its descriptor `fd`.
pub fn pseudo_path(pid: u32, fd: RawFd) -> PathBuf {
    PathBuf::from(format!("/proc/{pid}/fd/{fd}"))
}
