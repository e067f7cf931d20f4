//! A module defining the various kinds of errors that may arise
//! while running the pipeline.

use crate::spawn::StageKind;
use crate::{ExitStatus, EXIT_ERROR};
use failure_derive::Fail;
use std::fmt;
use std::io::Error as IoError;

/// Determines whether an error should be treated as "fatal".
///
/// Non-fatal errors leave room for recovery, e.g. trying the next program
/// in a fallback chain. Fatal errors abort the whole pipeline.
pub trait IsFatalError: failure::Fail {
    /// Checks whether the error should be considered a "fatal" error.
    fn is_fatal(&self) -> bool;
}

/// An error which may arise when spawning a stage's process.
#[derive(Debug, Fail)]
pub enum CommandError {
    /// Unable to find the program to execute.
    #[fail(display = "{}: command not found", _0)]
    NotFound(String),
    /// The program exists but could not be executed.
    #[fail(display = "{}: command not executable", _0)]
    NotExecutable(String),
    /// Any I/O error returned by the OS while spawning, and the
    /// program that caused the error if applicable.
    #[fail(display = "{}", _0)]
    Io(#[fail(cause)] IoError, Option<String>),
}

impl Eq for CommandError {}
impl PartialEq for CommandError {
    fn eq(&self, other: &Self) -> bool {
        use self::CommandError::*;

        match (self, other) {
            (NotFound(a), NotFound(b)) | (NotExecutable(a), NotExecutable(b)) => a == b,
            (Io(e1, a), Io(e2, b)) => e1.kind() == e2.kind() && a == b,
            _ => false,
        }
    }
}

impl IsFatalError for CommandError {
    fn is_fatal(&self) -> bool {
        match *self {
            CommandError::NotFound(_) => false,
            CommandError::NotExecutable(_) | CommandError::Io(..) => true,
        }
    }
}

/// The programs a stage tried to launch, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriedPrograms(pub Vec<String>);

impl fmt::Display for TriedPrograms {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        match iter.next() {
            Some(first) => write!(fmt, "{}", first)?,
            None => return write!(fmt, "nothing"),
        }
        for program in iter {
            write!(fmt, ", {}", program)?;
        }
        Ok(())
    }
}

/// An error which aborts the pipeline, independent of any exit code the
/// stages themselves report.
#[derive(Debug, Fail)]
pub enum PipelineError {
    /// A pipe between two stages could not be created (or duplicated).
    #[fail(display = "failed to create pipe: {}", _0)]
    Pipe(#[fail(cause)] IoError),
    /// A stage's process could not be spawned.
    #[fail(display = "failed to spawn {} stage: {}", _0, _1)]
    Spawn(StageKind, #[fail(cause)] CommandError),
    /// Waiting for a stage's process failed.
    #[fail(display = "failed to wait for {} stage: {}", _0, _1)]
    Wait(StageKind, #[fail(cause)] IoError),
    /// A stage did not terminate through a normal exit.
    #[fail(display = "{} stage terminated abnormally ({})", _0, _1)]
    Abnormal(StageKind, ExitStatus),
    /// None of a stage's candidate programs could be found.
    #[fail(display = "no {} program could be found (tried: {})", _0, _1)]
    NoProgram(StageKind, TriedPrograms),
}

impl PipelineError {
    /// The status the launching process should exit with.
    pub fn exit_status(&self) -> ExitStatus {
        EXIT_ERROR
    }
}

impl Eq for PipelineError {}
impl PartialEq for PipelineError {
    fn eq(&self, other: &Self) -> bool {
        use self::PipelineError::*;

        match (self, other) {
            (Pipe(a), Pipe(b)) => a.kind() == b.kind(),
            (Spawn(s1, a), Spawn(s2, b)) => s1 == s2 && a == b,
            (Wait(s1, a), Wait(s2, b)) => s1 == s2 && a.kind() == b.kind(),
            (Abnormal(s1, a), Abnormal(s2, b)) => s1 == s2 && a == b,
            (NoProgram(s1, a), NoProgram(s2, b)) => s1 == s2 && a == b,
            _ => false,
        }
    }
}

/// An error in the settings read from the environment.
#[derive(Debug, Fail, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting holds a value outside of the accepted set.
    #[fail(display = "{}: unknown value {:?} (expected one of: {})", _0, _1, _2)]
    InvalidValue(&'static str, String, &'static str),
    /// A setting is not valid unicode.
    #[fail(display = "{}: value is not valid unicode", _0)]
    NotUnicode(&'static str),
}
