//! Pages through the process environment by running the fixed pipeline
//! `printenv | grep <args> | sort | $PAGER`.
//!
//! When no arguments are forwarded the filter stage becomes `cat`, and when
//! the configured pager cannot be found the presenter falls back to `less`
//! and then `more`.
//!
//! The entry point is `Pipeline`, which is built from a `Config` and the
//! forwarded arguments, and runs its stages through an
//! `ExecutableEnvironment` (usually `TokioExecEnv`).
#![deny(missing_debug_implementations)]
#![deny(rust_2018_idioms)]
#![deny(unused_import_braces)]
#![warn(missing_docs)]

#[cfg(not(unix))]
compile_error!("digenv only supports unix platforms");

pub mod config;
pub mod env;
pub mod error;
pub mod io;
pub mod path;
pub mod spawn;

mod exit_status;
#[cfg(unix)]
#[path = "sys/unix.rs"]
mod sys;

pub use self::config::{Config, Schedule};
pub use self::exit_status::{ExitStatus, EXIT_ERROR, EXIT_SUCCESS};
pub use self::spawn::{Pipeline, Stage, StageKind, Verdict};

/// A private trait for converting to inner types.
trait IntoInner: Sized {
    /// The inner type.
    type Inner;
    /// Borrow a reference to the inner type.
    fn inner(&self) -> &Self::Inner;
    /// Take ownership of the inner type.
    fn into_inner(self) -> Self::Inner;
    /// Convert an inner value to its wrapper.
    fn from_inner(inner: Self::Inner) -> Self;
}
