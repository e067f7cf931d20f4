//! Owned UNIX file descriptors and pipe creation.

use crate::io::FileDesc;
use crate::sys::cvt_r;
use crate::IntoInner;
use std::fs::File;
use std::io::{Read, Result, Write};
use std::mem::{self, ManuallyDrop};
use std::os::unix::io::{FromRawFd, IntoRawFd, RawFd};
use std::process::Stdio;

/// A wrapper around an owned UNIX file descriptor. The descriptor is
/// closed once the wrapper goes out of scope.
#[derive(Debug, PartialEq, Eq)]
pub struct RawIo {
    /// The underlying descriptor.
    fd: RawFd,
}

impl From<RawIo> for Stdio {
    fn from(raw: RawIo) -> Self {
        unsafe { Stdio::from_raw_fd(raw.into_inner()) }
    }
}

impl FromRawFd for FileDesc {
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self::new(fd)
    }
}

impl IntoRawFd for FileDesc {
    fn into_raw_fd(self) -> RawFd {
        unsafe { self.into_inner().into_inner() }
    }
}

impl From<File> for FileDesc {
    fn from(file: File) -> Self {
        unsafe { FromRawFd::from_raw_fd(file.into_raw_fd()) }
    }
}

impl RawIo {
    /// Takes ownership of and wraps an OS file descriptor.
    pub unsafe fn new(fd: RawFd) -> Self {
        RawIo { fd }
    }

    /// Unwraps the underlying file descriptor and transfers ownership to the caller.
    pub unsafe fn into_inner(self) -> RawFd {
        let fd = self.fd;
        mem::forget(self);
        fd
    }

    /// Returns the underlying file descriptor without transfering ownership.
    pub fn inner(&self) -> RawFd {
        self.fd
    }

    /// Duplicates the underlying file descriptor. The copy is created with
    /// its CLOEXEC flag set so it never leaks into unrelated children.
    pub fn duplicate(&self) -> Result<Self> {
        let min_fd = libc::STDERR_FILENO + 1;
        let fd = cvt_r(|| unsafe { libc::fcntl(self.fd, libc::F_DUPFD_CLOEXEC, min_fd) })?;
        Ok(unsafe { RawIo::new(fd) })
    }

    /// Reads from the underlying file descriptor.
    pub fn read_inner(&self, buf: &mut [u8]) -> Result<usize> {
        self.borrow_file().read(buf)
    }

    /// Writes to the underlying file descriptor.
    pub fn write_inner(&self, buf: &[u8]) -> Result<usize> {
        self.borrow_file().write(buf)
    }

    /// Reports whether the CLOEXEC flag is set on the descriptor.
    #[cfg(test)]
    pub fn is_cloexec(&self) -> Result<bool> {
        let flags = cvt_r(|| unsafe { libc::fcntl(self.fd, libc::F_GETFD) })?;
        Ok(flags & libc::FD_CLOEXEC != 0)
    }

    // Linux creates pipes with O_CLOEXEC directly.
    #[cfg_attr(
        any(target_os = "linux", target_os = "android", target_os = "emscripten"),
        allow(dead_code)
    )]
    /// Sets the `CLOEXEC` flag on the descriptor.
    fn set_cloexec(&self) -> Result<()> {
        let flags = cvt_r(|| unsafe { libc::fcntl(self.fd, libc::F_GETFD) })?;
        cvt_r(|| unsafe { libc::fcntl(self.fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) })
            .map(|_| ())
    }

    /// Lends the descriptor out as a `File` which must never close it.
    fn borrow_file(&self) -> ManuallyDrop<File> {
        ManuallyDrop::new(unsafe { File::from_raw_fd(self.fd) })
    }
}

impl Drop for RawIo {
    fn drop(&mut self) {
        // Errors are ignored: retrying a failed close could close a
        // descriptor opened by someone else in the meantime.
        let _ = unsafe { libc::close(self.fd) };
    }
}

/// Creates and returns a `(reader, writer)` pipe pair.
///
/// The CLOEXEC flag will be set on both file descriptors on creation.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
pub fn pipe() -> Result<(RawIo, RawIo)> {
    let mut fds = [0; 2];
    cvt_r(|| unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) })?;

    unsafe { Ok((RawIo::new(fds[0]), RawIo::new(fds[1]))) }
}

/// Creates and returns a `(reader, writer)` pipe pair.
///
/// The CLOEXEC flag will be set on both file descriptors, however,
/// on some UNIX systems (like BSD), setting these flags is nonatomic.
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "emscripten")))]
pub fn pipe() -> Result<(RawIo, RawIo)> {
    let mut fds = [0; 2];
    cvt_r(|| unsafe { libc::pipe(fds.as_mut_ptr()) })?;

    let (reader, writer) = unsafe { (RawIo::new(fds[0]), RawIo::new(fds[1])) };
    reader.set_cloexec()?;
    writer.set_cloexec()?;

    Ok((reader, writer))
}
