//! The fixed four-stage pipeline and the rules for judging its stages.

mod pipeline;
mod stage;

pub use self::pipeline::Pipeline;
pub use self::stage::{
    Stage, StageKind, Verdict, CAT_FAILURE_THRESHOLD, GREP_FAILURE_THRESHOLD,
    PAGER_FAILURE_THRESHOLD, PRINTENV_FAILURE_THRESHOLD, SORT_FAILURE_THRESHOLD,
};
