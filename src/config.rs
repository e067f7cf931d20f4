//! Settings which shape a pipeline run, read from the launching process'
//! environment.

use crate::error::ConfigError;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

/// Environment variable naming the preferred presenter program.
pub const PAGER_VAR: &str = "PAGER";
/// Environment variable selecting the `Schedule`.
pub const SCHEDULE_VAR: &str = "DIGENV_SCHEDULE";
/// Environment variable holding the log filter directives.
pub const LOG_VAR: &str = "DIGENV_LOG";
/// Environment variable listing the directories searched for programs.
pub const PATH_VAR: &str = "PATH";

/// Presenter used when no pager is configured.
pub const DEFAULT_PAGER: &str = "less";
/// Presenter tried when the default one cannot be found either.
pub const FALLBACK_PAGER: &str = "more";

/// Determines when each stage is spawned relative to its predecessor exiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Spawn every stage up front, then wait on them in stage order.
    Concurrent,
    /// Spawn a stage only after its predecessor has exited successfully.
    ///
    /// Each stage's output must fit in the pipe buffer, otherwise the
    /// producer blocks forever waiting for a consumer which does not exist.
    Staged,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Concurrent
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Schedule::Concurrent => fmt.write_str("concurrent"),
            Schedule::Staged => fmt.write_str("staged"),
        }
    }
}

impl FromStr for Schedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "concurrent" => Ok(Schedule::Concurrent),
            "staged" => Ok(Schedule::Staged),
            other => Err(ConfigError::InvalidValue(
                SCHEDULE_VAR,
                other.to_owned(),
                "concurrent, staged",
            )),
        }
    }
}

/// Everything a pipeline run depends on besides the forwarded arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The preferred presenter, if any.
    pub pager: Option<OsString>,
    /// Presenters tried, in order, when the preferred one cannot be found.
    pub fallback_pagers: Vec<OsString>,
    /// The complete environment handed to every stage.
    pub env_vars: Vec<(OsString, OsString)>,
    /// Directories searched when resolving stage programs.
    ///
    /// Stages never see this value: it is read by the executor, which is
    /// built from it with `TokioExecEnv::new`.
    pub search_path: Option<OsString>,
    /// When stages get spawned.
    pub schedule: Schedule,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pager: None,
            fallback_pagers: vec![DEFAULT_PAGER.into(), FALLBACK_PAGER.into()],
            env_vars: Vec::new(),
            search_path: None,
            schedule: Schedule::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the current process' environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars_os())
    }

    /// Builds a configuration from an explicit environment block. The block
    /// becomes the environment of every stage.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let env_vars: Vec<_> = vars.into_iter().collect();
        let lookup = |name: &str| {
            env_vars
                .iter()
                .rev()
                .find(|(key, _)| key == name)
                .map(|(_, val)| val.clone())
        };

        let schedule = match lookup(SCHEDULE_VAR) {
            Some(val) => val
                .into_string()
                .map_err(|_| ConfigError::NotUnicode(SCHEDULE_VAR))?
                .parse::<Schedule>()?,
            None => Schedule::default(),
        };

        Ok(Config {
            pager: lookup(PAGER_VAR).filter(|pager| !pager.is_empty()),
            search_path: lookup(PATH_VAR),
            schedule,
            ..Config::default()
        }
        .with_env_vars(env_vars))
    }

    /// Overrides the preferred presenter.
    pub fn with_pager<S: Into<OsString>>(mut self, pager: S) -> Self {
        self.pager = Some(pager.into());
        self
    }

    /// Overrides the presenters tried when the preferred one is missing.
    pub fn with_fallback_pagers<I, S>(mut self, pagers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.fallback_pagers = pagers.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the environment handed to every stage.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env_vars = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Overrides the directories searched for stage programs.
    pub fn with_search_path<S: Into<OsString>>(mut self, search_path: S) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Overrides the schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// The presenters to try, in order: the preferred one (if any) followed
    /// by the fallbacks, without repeating a name.
    pub fn pager_chain(&self) -> Vec<OsString> {
        let mut chain: Vec<OsString> = Vec::new();
        for pager in self.pager.iter().chain(&self.fallback_pagers) {
            if !chain.contains(pager) {
                chain.push(pager.clone());
            }
        }
        chain
    }
}
