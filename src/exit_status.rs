use std::fmt;
use std::process;

/// Exit code for stages (and pipelines) that exited successfully.
pub const EXIT_SUCCESS: ExitStatus = ExitStatus::Code(0);
/// Exit code reported for internal orchestration errors.
pub const EXIT_ERROR: ExitStatus = ExitStatus::Code(1);

/// Describes the result of a process after it has terminated.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ExitStatus {
    /// Normal termination with an exit code.
    Code(i32),

    /// Termination by signal, with the signal number.
    Signal(i32),
}

impl ExitStatus {
    /// Did the process die from writing into a pipe nobody reads anymore?
    pub fn is_broken_pipe(self) -> bool {
        self == ExitStatus::Signal(libc::SIGPIPE)
    }

    /// The code a process should exit with to report this status,
    /// following the shell convention of `128 + n` for signals.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitStatus::Code(code) => code,
            ExitStatus::Signal(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExitStatus::Code(code) => write!(f, "exit code: {}", code),
            ExitStatus::Signal(signal) => write!(f, "signal: {}", signal),
        }
    }
}

impl From<process::ExitStatus> for ExitStatus {
    fn from(exit: process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;

        match exit.code() {
            Some(code) => ExitStatus::Code(code),
            None => exit.signal().map_or(EXIT_ERROR, ExitStatus::Signal),
        }
    }
}
