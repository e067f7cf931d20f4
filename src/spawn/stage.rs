use crate::ExitStatus;
use std::ffi::OsString;
use std::fmt;

/// Program dumping the environment.
pub const PRINTENV: &str = "printenv";
/// Program filtering lines when arguments were forwarded.
pub const GREP: &str = "grep";
/// Program copying lines through when no arguments were forwarded.
pub const CAT: &str = "cat";
/// Program ordering the lines.
pub const SORT: &str = "sort";

/// Exit codes above this are failures of `printenv`.
pub const PRINTENV_FAILURE_THRESHOLD: i32 = 0;
/// Exit codes above this are failures of `grep`.
///
/// `grep` exits with 1 when nothing matched, which still counts as a
/// successful (if empty) filter.
pub const GREP_FAILURE_THRESHOLD: i32 = 1;
/// Exit codes above this are failures of `cat`.
pub const CAT_FAILURE_THRESHOLD: i32 = 0;
/// Exit codes above this are failures of `sort`.
pub const SORT_FAILURE_THRESHOLD: i32 = 1;
/// Exit codes above this are failures of the presenter.
pub const PAGER_FAILURE_THRESHOLD: i32 = 0;

/// The role a stage plays in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Dumps the environment.
    Source,
    /// Keeps the lines matching the forwarded arguments, or all of them.
    Filter,
    /// Sorts the lines.
    Order,
    /// Displays the result.
    Present,
}

impl fmt::Display for StageKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            StageKind::Source => "source",
            StageKind::Filter => "filter",
            StageKind::Order => "order",
            StageKind::Present => "present",
        };
        fmt.write_str(name)
    }
}

/// How a stage's termination affects the rest of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The stage succeeded (by its own conventions).
    Continue,
    /// The stage reported a failure; the pipeline exits with this code.
    Fail(i32),
    /// The stage did not exit normally.
    Abnormal(ExitStatus),
}

/// A description of one pipeline step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stage {
    /// The role of the stage.
    pub kind: StageKind,
    /// Programs to launch, in order of preference. Later programs are only
    /// tried when the earlier ones cannot be found.
    pub programs: Vec<OsString>,
    /// Arguments passed to the launched program.
    pub args: Vec<OsString>,
    /// Exit codes above this value are failures.
    pub failure_threshold: i32,
}

impl Stage {
    /// `printenv`, with no arguments.
    pub fn source() -> Self {
        Stage {
            kind: StageKind::Source,
            programs: vec![PRINTENV.into()],
            args: Vec::new(),
            failure_threshold: PRINTENV_FAILURE_THRESHOLD,
        }
    }

    /// `grep` with the forwarded arguments, or `cat` if there are none.
    pub fn filter(args: Vec<OsString>) -> Self {
        if args.is_empty() {
            Stage {
                kind: StageKind::Filter,
                programs: vec![CAT.into()],
                args,
                failure_threshold: CAT_FAILURE_THRESHOLD,
            }
        } else {
            Stage {
                kind: StageKind::Filter,
                programs: vec![GREP.into()],
                args,
                failure_threshold: GREP_FAILURE_THRESHOLD,
            }
        }
    }

    /// `sort`, with no arguments.
    pub fn order() -> Self {
        Stage {
            kind: StageKind::Order,
            programs: vec![SORT.into()],
            args: Vec::new(),
            failure_threshold: SORT_FAILURE_THRESHOLD,
        }
    }

    /// The first presenter of `chain` which can be found.
    pub fn present(chain: Vec<OsString>) -> Self {
        Stage {
            kind: StageKind::Present,
            programs: chain,
            args: Vec::new(),
            failure_threshold: PAGER_FAILURE_THRESHOLD,
        }
    }

    /// Judges how the stage terminated.
    pub fn judge(&self, status: ExitStatus) -> Verdict {
        match status {
            ExitStatus::Code(code) if code > self.failure_threshold => Verdict::Fail(code),
            ExitStatus::Code(_) => Verdict::Continue,
            ExitStatus::Signal(_) => Verdict::Abnormal(status),
        }
    }
}
