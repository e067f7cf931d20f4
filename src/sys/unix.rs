//! Extensions and implementations specific to Unix platforms.

use std::io::{Error, ErrorKind, Result};

#[path = "unix/io.rs"]
pub mod io;

/// Runs a libc call until it stops failing with `EINTR`, turning a `-1`
/// return value into the last OS error.
pub(crate) fn cvt_r<F: FnMut() -> libc::c_int>(mut f: F) -> Result<libc::c_int> {
    loop {
        let ret = f();
        if ret != -1 {
            return Ok(ret);
        }

        let err = Error::last_os_error();
        if err.kind() != ErrorKind::Interrupted {
            return Err(err);
        }
    }
}
