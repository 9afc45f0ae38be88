//! Turns flattened items into directories and empty files on disk.
//!
//! Items are planned directories-first and executed one by one (or a bounded
//! number at a time); each gets its own result, so a failing item never
//! prevents the others from being attempted.

mod capability;
#[allow(clippy::module_inception)]
mod executor;
mod plan;

pub use capability::{CompioFs, FsCapability};
pub use executor::{
    ApplyError, ApplyRequest, DEFAULT_CALL_TIMEOUT, ExecutionReport, ExecutionResult, Executor,
    ExecutorSettings, ItemError,
};
pub use plan::{Plan, plan};
