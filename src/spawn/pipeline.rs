use crate::config::{Config, Schedule};
use crate::env::{ExecutableData, ExecutableEnvironment};
use crate::error::{IsFatalError, PipelineError, TriedPrograms};
use crate::io::{FileDesc, Pipe};
use crate::spawn::{Stage, Verdict};
use crate::{ExitStatus, EXIT_SUCCESS};
use std::ffi::OsString;
use std::io;
use tracing::{debug, warn};

/// The pipeline `printenv | grep <args> | sort | $PAGER`.
///
/// The standard output of each stage is piped as standard input to the
/// next. The very first and last stages use the standard input and output
/// given to `run`, respectively (inheriting the launcher's when none are
/// given).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    stages: [Stage; 4],
    env_vars: Vec<(OsString, OsString)>,
    schedule: Schedule,
}

impl Pipeline {
    /// Describes the pipeline for the forwarded `args`.
    ///
    /// With no arguments the filter stage copies its input through with
    /// `cat`; otherwise the arguments are handed to `grep` untouched.
    pub fn new(config: &Config, args: Vec<OsString>) -> Self {
        Pipeline {
            stages: [
                Stage::source(),
                Stage::filter(args),
                Stage::order(),
                Stage::present(config.pager_chain()),
            ],
            env_vars: config.env_vars.clone(),
            schedule: config.schedule,
        }
    }

    /// The stages, in pipeline order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs every stage and resolves to the pipeline's exit status.
    ///
    /// A stage whose exit code is above its failure threshold decides the
    /// result: its code is returned as is, since the stage reports its own
    /// diagnostics. Otherwise the result is `EXIT_SUCCESS`. Under the
    /// concurrent schedule the run still waits for every stage it spawned. Any stage which
    /// could not be spawned or waited for, or which did not exit normally,
    /// aborts the pipeline with an error.
    pub async fn run<E>(
        self,
        env: &mut E,
        stdin: Option<FileDesc>,
        stdout: Option<FileDesc>,
    ) -> Result<ExitStatus, PipelineError>
    where
        E: ?Sized + ExecutableEnvironment,
    {
        debug!(schedule = %self.schedule, "running pipeline");

        match self.schedule {
            Schedule::Concurrent => self.run_concurrent(env, stdin, stdout).await,
            Schedule::Staged => self.run_staged(env, stdin, stdout).await,
        }
    }

    async fn run_concurrent<E>(
        self,
        env: &mut E,
        stdin: Option<FileDesc>,
        mut stdout: Option<FileDesc>,
    ) -> Result<ExitStatus, PipelineError>
    where
        E: ?Sized + ExecutableEnvironment,
    {
        let last = self.stages.len() - 1;
        let mut spawned = Vec::with_capacity(self.stages.len());
        let mut next_in = stdin;

        for (idx, stage) in self.stages.iter().enumerate() {
            let (output, reader) = stage_output(idx == last, &mut stdout)?;
            let future = spawn_stage(env, stage, &self.env_vars, next_in.take(), output)?;
            next_in = reader;
            spawned.push((stage, future));
        }

        // A producer killed by SIGPIPE usually just outlived a consumer which
        // failed first, so the consumer's failure is the one worth reporting.
        let mut broken_pipe = None;
        let mut decided = None;

        // Stages after a decisive one still run to completion: their inputs
        // reach EOF, and a presenter gets to restore the terminal.
        for (stage, future) in spawned {
            let status = future
                .await
                .map_err(|err| PipelineError::Wait(stage.kind, err))?;
            debug!(stage = %stage.kind, %status, "stage exited");

            if decided.is_some() {
                continue;
            }

            match stage.judge(status) {
                Verdict::Continue => {}
                Verdict::Fail(code) => decided = Some(Ok(ExitStatus::Code(code))),
                Verdict::Abnormal(status) if status.is_broken_pipe() => {
                    if broken_pipe.is_none() {
                        broken_pipe = Some(PipelineError::Abnormal(stage.kind, status));
                    }
                }
                Verdict::Abnormal(status) => {
                    decided = Some(Err(PipelineError::Abnormal(stage.kind, status)))
                }
            }
        }

        match (decided, broken_pipe) {
            (Some(result), _) => result,
            (None, Some(err)) => Err(err),
            (None, None) => Ok(EXIT_SUCCESS),
        }
    }

    async fn run_staged<E>(
        self,
        env: &mut E,
        stdin: Option<FileDesc>,
        mut stdout: Option<FileDesc>,
    ) -> Result<ExitStatus, PipelineError>
    where
        E: ?Sized + ExecutableEnvironment,
    {
        let last = self.stages.len() - 1;
        let mut next_in = stdin;

        for (idx, stage) in self.stages.iter().enumerate() {
            let (output, reader) = stage_output(idx == last, &mut stdout)?;
            let future = spawn_stage(env, stage, &self.env_vars, next_in.take(), output)?;
            next_in = reader;

            let status = future
                .await
                .map_err(|err| PipelineError::Wait(stage.kind, err))?;
            debug!(stage = %stage.kind, %status, "stage exited");

            match stage.judge(status) {
                Verdict::Continue => {}
                Verdict::Fail(code) => return Ok(ExitStatus::Code(code)),
                Verdict::Abnormal(status) => {
                    return Err(PipelineError::Abnormal(stage.kind, status))
                }
            }
        }

        Ok(EXIT_SUCCESS)
    }
}

/// Picks the output of a stage: a fresh pipe (whose reader feeds the next
/// stage), or the pipeline's own output for the last stage.
fn stage_output(
    is_last: bool,
    stdout: &mut Option<FileDesc>,
) -> Result<(Option<FileDesc>, Option<FileDesc>), PipelineError> {
    if is_last {
        Ok((stdout.take(), None))
    } else {
        let Pipe { reader, writer } = Pipe::new().map_err(PipelineError::Pipe)?;
        Ok((Some(writer), Some(reader)))
    }
}

fn duplicate(fdes: &Option<FileDesc>) -> io::Result<Option<FileDesc>> {
    fdes.as_ref().map(FileDesc::duplicate).transpose()
}

/// Launches the first program of `stage` which can be found.
///
/// Only a missing program moves on to the next candidate; any other spawn
/// failure aborts. A stage with a single program reports it missing as a
/// spawn failure.
fn spawn_stage<E>(
    env: &mut E,
    stage: &Stage,
    env_vars: &[(OsString, OsString)],
    mut stdin: Option<FileDesc>,
    mut stdout: Option<FileDesc>,
) -> Result<E::ExecFuture, PipelineError>
where
    E: ?Sized + ExecutableEnvironment,
{
    let mut tried = Vec::new();
    let mut candidates = stage.programs.iter().peekable();

    while let Some(program) = candidates.next() {
        let is_last = candidates.peek().is_none();
        let (input, output) = if is_last {
            (stdin.take(), stdout.take())
        } else {
            // Keep our own copies in case this candidate is missing.
            (
                duplicate(&stdin).map_err(PipelineError::Pipe)?,
                duplicate(&stdout).map_err(PipelineError::Pipe)?,
            )
        };

        let data = ExecutableData {
            name: program,
            args: &stage.args,
            env_vars,
            stdin: input,
            stdout: output,
        };

        match env.spawn_executable(data) {
            Ok(future) => return Ok(future),
            Err(err) => {
                if err.is_fatal() || (is_last && tried.is_empty()) {
                    return Err(PipelineError::Spawn(stage.kind, err));
                }

                if !is_last {
                    warn!(stage = %stage.kind, "{}, trying the next program", err);
                }
                tried.push(program.to_string_lossy().into_owned());
            }
        }
    }

    Err(PipelineError::NoProgram(stage.kind, TriedPrograms(tried)))
}
