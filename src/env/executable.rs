use crate::error::CommandError;
use crate::io::FileDesc;
use crate::path::find_program;
use crate::ExitStatus;
use futures_core::future::BoxFuture;
use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Any data required to execute a child process.
#[derive(Debug, PartialEq, Eq)]
pub struct ExecutableData<'a> {
    /// The name of the program, also used as its argument zero.
    pub name: &'a OsStr,
    /// Arguments to be provided to the executable.
    pub args: &'a [OsString],
    /// The complete environment of the executable. Environment variables of
    /// the current process must **NOT** be inherited if they do not appear
    /// in this collection.
    pub env_vars: &'a [(OsString, OsString)],
    /// The executable's standard input will be redirected to this descriptor,
    /// or inherited from the current process if not specified.
    pub stdin: Option<FileDesc>,
    /// The executable's standard output will be redirected to this descriptor,
    /// or inherited from the current process if not specified.
    pub stdout: Option<FileDesc>,
}

/// An interface for asynchronously spawning executables.
pub trait ExecutableEnvironment {
    /// A future which will resolve to the executable's exit status.
    type ExecFuture: Future<Output = Result<ExitStatus, IoError>>;

    /// Attempt to spawn the executable command.
    ///
    /// Implementations must have released every descriptor in `data` by the
    /// time this returns, whether or not spawning succeeded.
    fn spawn_executable(&mut self, data: ExecutableData<'_>)
        -> Result<Self::ExecFuture, CommandError>;
}

impl<'a, T: ExecutableEnvironment> ExecutableEnvironment for &'a mut T {
    type ExecFuture = T::ExecFuture;

    fn spawn_executable(
        &mut self,
        data: ExecutableData<'_>,
    ) -> Result<Self::ExecFuture, CommandError> {
        (**self).spawn_executable(data)
    }
}

/// An `ExecutableEnvironment` implementation that uses `tokio`
/// to monitor when child processes have exited.
///
/// Programs are resolved against the search path given at construction,
/// not against the `PATH` (if any) of the environment handed to the child.
#[derive(Clone, Debug, Default)]
pub struct TokioExecEnv {
    search_path: Option<OsString>,
}

impl TokioExecEnv {
    /// Construct a new environment which resolves programs in `search_path`.
    pub fn new(search_path: Option<OsString>) -> Self {
        Self { search_path }
    }
}

impl ExecutableEnvironment for TokioExecEnv {
    type ExecFuture = BoxFuture<'static, Result<ExitStatus, IoError>>;

    fn spawn_executable(
        &mut self,
        data: ExecutableData<'_>,
    ) -> Result<Self::ExecFuture, CommandError> {
        let stdio = |fdes: Option<FileDesc>| fdes.map(Into::into).unwrap_or_else(Stdio::inherit);
        let name = data.name.to_string_lossy().into_owned();

        let path = match find_program(data.name, self.search_path.as_deref()) {
            Some(path) => path,
            None => return Err(CommandError::NotFound(name)),
        };

        let mut cmd = Command::new(&path);
        cmd.arg0(data.name)
            .args(data.args)
            .kill_on_drop(true) // Ensure we clean up any dropped handles
            .env_clear() // Ensure we don't inherit from the process
            .envs(data.env_vars.iter().map(|(key, val)| (key, val)))
            .stdin(stdio(data.stdin))
            .stdout(stdio(data.stdout));

        let spawned = cmd.spawn();
        // The command still owns the pipe ends it was given; close them in
        // this process before anyone waits on a reader.
        drop(cmd);

        let mut child = spawned.map_err(|err| map_io_err(err, name.clone()))?;
        debug!(program = %name, path = %path.display(), pid = ?child.id(), "spawned");

        Ok(Box::pin(async move {
            child.wait().await.map(ExitStatus::from)
        }))
    }
}

fn map_io_err(err: IoError, name: String) -> CommandError {
    if IoErrorKind::NotFound == err.kind() {
        CommandError::NotFound(name)
    } else if IoErrorKind::PermissionDenied == err.kind()
        || Some(libc::ENOEXEC) == err.raw_os_error()
    {
        CommandError::NotExecutable(name)
    } else {
        CommandError::Io(err, Some(name))
    }
}
