#![allow(dead_code)]

use digenv::env::{ExecutableData, ExecutableEnvironment};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};

// Convenience re-exports
pub use digenv::error::*;
pub use digenv::spawn::*;
pub use digenv::{Config, ExitStatus, Pipeline, Schedule, EXIT_ERROR, EXIT_SUCCESS};

/// What a mocked program does when it gets spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockProgram {
    Exits(ExitStatus),
    NotExecutable,
}

/// A record of one successful or attempted spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawned {
    pub name: String,
    pub args: Vec<String>,
    pub has_stdin: bool,
    pub has_stdout: bool,
}

/// An `ExecutableEnvironment` whose programs "exit" with a scripted status
/// as soon as they are awaited. Programs it does not know about are missing.
#[derive(Debug, Default)]
pub struct MockExecEnv {
    programs: HashMap<String, MockProgram>,
    pub attempts: Vec<Spawned>,
    finished: Arc<Mutex<Vec<String>>>,
}

impl MockExecEnv {
    /// A full set of well behaved stage programs.
    pub fn new() -> Self {
        Self::default()
            .program("printenv", MockProgram::Exits(EXIT_SUCCESS))
            .program("grep", MockProgram::Exits(EXIT_SUCCESS))
            .program("cat", MockProgram::Exits(EXIT_SUCCESS))
            .program("sort", MockProgram::Exits(EXIT_SUCCESS))
            .program("less", MockProgram::Exits(EXIT_SUCCESS))
            .program("more", MockProgram::Exits(EXIT_SUCCESS))
    }

    pub fn program(mut self, name: &str, program: MockProgram) -> Self {
        self.programs.insert(name.to_owned(), program);
        self
    }

    pub fn exits(self, name: &str, status: ExitStatus) -> Self {
        self.program(name, MockProgram::Exits(status))
    }

    pub fn without(mut self, name: &str) -> Self {
        self.programs.remove(name);
        self
    }

    /// Names of every program the pipeline tried to launch, in order.
    pub fn attempted(&self) -> Vec<&str> {
        self.attempts.iter().map(|s| &*s.name).collect()
    }

    /// Names of every program which was waited on until it exited, in order.
    /// Programs whose handles were dropped early never show up here.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl ExecutableEnvironment for MockExecEnv {
    type ExecFuture = BoxFuture<'static, io::Result<ExitStatus>>;

    fn spawn_executable(
        &mut self,
        data: ExecutableData<'_>,
    ) -> Result<Self::ExecFuture, CommandError> {
        let name = data.name.to_string_lossy().into_owned();
        self.attempts.push(Spawned {
            name: name.clone(),
            args: data
                .args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
            has_stdin: data.stdin.is_some(),
            has_stdout: data.stdout.is_some(),
        });

        match self.programs.get(&name) {
            Some(MockProgram::Exits(status)) => {
                let status = *status;
                let finished = self.finished.clone();
                Ok(async move {
                    finished.lock().unwrap().push(name);
                    Ok(status)
                }
                .boxed())
            }
            Some(MockProgram::NotExecutable) => Err(CommandError::NotExecutable(name)),
            None => Err(CommandError::NotFound(name)),
        }
    }
}

pub fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

pub async fn run_with(
    env: &mut MockExecEnv,
    config: &Config,
    args: &[&str],
) -> Result<ExitStatus, PipelineError> {
    Pipeline::new(config, os_args(args))
        .run(env, None, None)
        .await
}
