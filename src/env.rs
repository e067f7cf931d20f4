//! Interfaces through which the pipeline launches its stages.
//!
//! The pipeline never spawns processes directly; it goes through an
//! `ExecutableEnvironment`, which `TokioExecEnv` implements on top of
//! `tokio::process`.

mod executable;

pub use self::executable::{ExecutableData, ExecutableEnvironment, TokioExecEnv};
