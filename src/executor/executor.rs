use std::future::Future;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use compio::time::timeout;
use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};

use crate::executor::{FsCapability, Plan, plan};
use crate::ext::BestEffortPathExt;
use crate::tree::{EntryKind, ExecutionItem};

/// Upper bound for a single filesystem call unless configured otherwise.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Limit for every individual filesystem call.
    pub timeout: Duration,
    /// Items in flight at once within a phase; 1 runs them one after another.
    pub concurrency: NonZeroUsize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CALL_TIMEOUT,
            concurrency: NonZeroUsize::MIN,
        }
    }
}

/// Request to materialize `items` below `target_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub target_path: String,
    pub items: Vec<ExecutionItem>,
}

/// Outcome of a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// Full path below the target directory.
    pub path: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecutionResult {
    fn succeeded(path: &Path, kind: EntryKind) -> Self {
        Self {
            success: true,
            path: path.display().to_string(),
            kind,
            message: None,
        }
    }

    fn failed(path: &Path, kind: EntryKind, error: &ItemError) -> Self {
        Self {
            success: false,
            path: path.display().to_string(),
            kind,
            message: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub results: Vec<ExecutionResult>,
    /// Set when the target directory failed the pre-flight check and nothing
    /// was attempted.
    pub target_rejected: bool,
}

impl ExecutionReport {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|result| result.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn is_complete_success(&self) -> bool {
        !self.target_rejected && self.failure_count() == 0
    }
}

#[derive(Debug, Snafu)]
pub enum ItemError {
    #[snafu(display("Path '{}' escapes the target directory", path))]
    UnsafePath { path: String },
    #[snafu(display("Item has an empty path"))]
    EmptyPath,
    #[snafu(display("Failed to create directory {}: {}", path.display(), source))]
    CreateDirectory { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to create file {}: {}", path.display(), source))]
    CreateFile { path: PathBuf, source: io::Error },
    #[snafu(display("Timed out after {:?} on {}", timeout, path.display()))]
    Timeout { path: PathBuf, timeout: Duration },
}

#[derive(Debug, Snafu)]
pub enum ApplyError {
    #[snafu(display("Target path is required"))]
    MissingTargetPath,
    #[snafu(display("Target directory {} does not exist or is not accessible", target))]
    InaccessibleTarget {
        target: String,
        report: ExecutionReport,
    },
}

/// Joins a relative item path onto the target, refusing anything that could
/// land outside of it. A path made only of `.` components is the target
/// itself.
fn resolve(target: &Path, relative: &str) -> Result<PathBuf, ItemError> {
    ensure!(!relative.trim().is_empty(), EmptyPathSnafu);

    let mut resolved = target.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return UnsafePathSnafu { path: relative }.fail();
            }
        }
    }
    Ok(resolved)
}

/// Applies plans against a filesystem capability.
pub struct Executor<F> {
    fs: F,
    settings: ExecutorSettings,
}

impl<F: FsCapability> Executor<F> {
    pub fn new(fs: F, settings: ExecutorSettings) -> Self {
        Self { fs, settings }
    }

    /// Validates the request, plans its items and executes them.
    pub async fn apply(&self, request: &ApplyRequest) -> Result<ExecutionReport, ApplyError> {
        let target = request.target_path.trim();
        if target.is_empty() {
            return MissingTargetPathSnafu.fail();
        }

        let plan = plan(request.items.iter().cloned());
        let report = self.execute(Path::new(target), &plan).await;
        if report.target_rejected {
            return InaccessibleTargetSnafu { target, report }.fail();
        }
        Ok(report)
    }

    /// Runs every item of `plan` below `target_root`.
    ///
    /// Always returns one result per item, in plan order, unless the target
    /// itself is unusable; then the report holds a single failure for the
    /// target and no filesystem call was made for any item.
    pub async fn execute(&self, target_root: &Path, plan: &Plan) -> ExecutionReport {
        if !self.target_accessible(target_root).await {
            warn!(
                "Target directory {} is not accessible",
                target_root.best_effort_path_display()
            );
            return ExecutionReport {
                results: vec![ExecutionResult {
                    success: false,
                    path: target_root.display().to_string(),
                    kind: EntryKind::Directory,
                    message: Some("Target directory does not exist or is not accessible".into()),
                }],
                target_rejected: true,
            };
        }

        info!(
            "Applying {} directories and {} files below {}",
            plan.directories().len(),
            plan.files().len(),
            target_root.best_effort_path_display()
        );

        let mut results = Vec::with_capacity(plan.len());
        for phase in [plan.directories(), plan.files()] {
            // `buffered` yields in input order whatever the completion order.
            let phase_results = stream::iter(phase)
                .map(|item| self.run_item(target_root, item))
                .buffered(self.settings.concurrency.get())
                .collect::<Vec<_>>()
                .await;
            results.extend(phase_results);
        }

        let report = ExecutionReport {
            results,
            target_rejected: false,
        };
        info!(
            "Finished with {} succeeded and {} failed",
            report.success_count(),
            report.failure_count()
        );
        report
    }

    async fn target_accessible(&self, target: &Path) -> bool {
        timeout(self.settings.timeout, self.fs.exists(target))
            .await
            .unwrap_or(false)
    }

    async fn run_item(&self, target: &Path, item: &ExecutionItem) -> ExecutionResult {
        let full_path = match resolve(target, &item.path) {
            Ok(path) => path,
            Err(error) => {
                warn!("Skipping '{}': {}", item.path, error);
                return ExecutionResult::failed(&target.join(&item.path), item.kind, &error);
            }
        };

        match self.create(&full_path, item.kind).await {
            Ok(()) => {
                debug!("Created {} {}", item.kind, full_path.display());
                ExecutionResult::succeeded(&full_path, item.kind)
            }
            Err(error) => {
                warn!("Failed to create {} {}: {}", item.kind, full_path.display(), error);
                ExecutionResult::failed(&full_path, item.kind, &error)
            }
        }
    }

    async fn create(&self, path: &Path, kind: EntryKind) -> Result<(), ItemError> {
        match kind {
            EntryKind::Directory => self
                .bounded(path, self.fs.create_directory_recursive(path))
                .await?
                .context(CreateDirectorySnafu { path }),
            EntryKind::File => {
                if let Some(parent) = path.parent() {
                    self.bounded(parent, self.fs.create_directory_recursive(parent))
                        .await?
                        .context(CreateDirectorySnafu { path: parent })?;
                }
                self.bounded(path, self.fs.create_empty_file(path))
                    .await?
                    .context(CreateFileSnafu { path })
            }
        }
    }

    async fn bounded<T>(
        &self,
        path: &Path,
        call: impl Future<Output = T>,
    ) -> Result<T, ItemError> {
        timeout(self.settings.timeout, call)
            .await
            .map_err(|_| ItemError::Timeout {
                path: path.to_path_buf(),
                timeout: self.settings.timeout,
            })
    }
}
