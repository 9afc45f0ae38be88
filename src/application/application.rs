use std::path::{Path, PathBuf};
use std::time::Duration;

use compio::fs;
use compio::io::{AsyncRead, AsyncReadExt};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::data::OutputFormat;
use crate::application::output::{self, ParseSummary};
use crate::cli::{ApplyArgs, Command};
use crate::config::{Config, ConfigCreationError};
use crate::executor::{ApplyError, ApplyRequest, CompioFs, Executor, plan};
use crate::ext::BestEffortPathExt;
use crate::filesystem::{ListingError, list_directory};
use crate::parser::parse;
use crate::tree::{EditSession, NodeId, flatten, render_tree, serialize_to_text};

const STDIN_MARKER: &str = "-";

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let config = Config::read(&app_config.root)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        match app_config.command {
            Command::Parse { input, format } => {
                let format = format.unwrap_or_else(|| config.style.into());
                Self::parse(&input, format).await
            }
            Command::Apply(args) => Self::apply(&config, args).await,
            Command::Ls { path, json } => Self::list(&path, json),
        }
    }

    async fn parse(input: &Path, format: OutputFormat) -> Result<(), ApplicationError> {
        let forest = parse(&read_input(input).await?);

        match format {
            OutputFormat::Tree => output::print_text(&render_tree(&forest)),
            OutputFormat::Indent => output::print_text(&serialize_to_text(&forest)),
            OutputFormat::Paths => output::print_paths(&flatten(&forest)),
            OutputFormat::Json => {
                let items = flatten(&forest);
                let summary = ParseSummary {
                    items: &items,
                    stats: forest.stats(),
                };
                output::print_json(&serde_json::to_string_pretty(&summary).context(JsonSnafu)?);
                return Ok(());
            }
        }
        output::print_stats(&forest.stats());
        Ok(())
    }

    async fn apply(config: &Config, args: ApplyArgs) -> Result<(), ApplicationError> {
        let mut session = EditSession::new(parse(&read_input(&args.input).await?));

        for path in &args.exclude {
            let id = node_at(&session, path)?;
            info!("Excluding '{}'", path);
            session.modify(|forest| forest.set_selected(id, false));
        }
        for path in &args.retype {
            let id = node_at(&session, path)?;
            info!("Retyping '{}'", path);
            session.modify(|forest| forest.retype(id));
        }

        let request = ApplyRequest {
            target_path: args.target.display().to_string(),
            items: flatten(session.forest()),
        };

        if args.dry_run {
            output::print_plan(&plan(request.items));
            return Ok(());
        }

        let mut settings = config.execution.clone();
        if let Some(concurrency) = args.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(millis) = args.timeout_ms {
            settings.timeout = Duration::from_millis(millis);
        }

        let report = Executor::new(CompioFs, settings)
            .apply(&request)
            .await
            .context(ApplySnafu)?;

        if args.json {
            output::print_json(&serde_json::to_string_pretty(&report).context(JsonSnafu)?);
        } else {
            output::print_report(&report);
        }

        ensure!(
            report.failure_count() == 0,
            ItemsFailedSnafu {
                failed: report.failure_count(),
                total: report.results.len(),
            }
        );
        Ok(())
    }

    fn list(path: &Path, json: bool) -> Result<(), ApplicationError> {
        let listing = list_directory(path).context(ListingSnafu)?;
        if json {
            output::print_json(&serde_json::to_string_pretty(&listing).context(JsonSnafu)?);
        } else {
            output::print_listing(&listing);
        }
        Ok(())
    }
}

fn node_at(session: &EditSession, path: &str) -> Result<NodeId, ApplicationError> {
    session
        .forest()
        .find_by_path(path)
        .map(|node| node.id)
        .context(UnknownNodeSnafu { path })
}

async fn read_input(input: &Path) -> Result<String, ApplicationError> {
    if input.as_os_str() == STDIN_MARKER {
        debug!("Reading structure text from stdin");
        return read_stream(fs::stdin()).await;
    }

    debug!("Reading structure text from {}", input.best_effort_path_display());
    let bytes = fs::read(input).await.context(InputSnafu { path: input })?;
    String::from_utf8(bytes).context(InputEncodingSnafu { path: input })
}

async fn read_stream(mut reader: impl AsyncRead) -> Result<String, ApplicationError> {
    let res = reader.read_to_string(String::new()).await;
    res.0.context(StdinSnafu)?;
    Ok(res.1)
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigCreationError },
    #[snafu(display("Failed to read input file {}", path.best_effort_path_display()))]
    InputError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Input file {} is not valid UTF-8", path.best_effort_path_display()))]
    InputEncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to read structure text from stdin"))]
    StdinError { source: std::io::Error },
    #[snafu(display("No node at path '{}'", path))]
    UnknownNode { path: String },
    #[snafu(display("Could not apply the structure"))]
    ApplyError { source: ApplyError },
    #[snafu(display("{} of {} items could not be created", failed, total))]
    ItemsFailed { failed: usize, total: usize },
    #[snafu(display("Could not list directory"))]
    ListingError { source: ListingError },
    #[snafu(display("Failed to encode output as JSON"))]
    JsonError { source: serde_json::Error },
}
