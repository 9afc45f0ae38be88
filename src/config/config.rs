use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, warn};

use crate::{application::data::TextStyle, executor::ExecutorSettings, ext::BestEffortPathExt};

const CONFIG_FILE_NAME: &str = "sprout.yaml";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

type Mapping<'a> = LinkedHashMap<Yaml<'a>, Yaml<'a>>;

/// Settings read from `sprout.yaml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub execution: ExecutorSettings,
    pub style: TextStyle,
}

impl Config {
    /// Reads the config below `root`, falling back to defaults when there is
    /// no config file.
    pub async fn read(root: &Path) -> Result<Self, ConfigCreationError> {
        let path = get_config_file_path(root);
        debug!("Reading config file: {}", path.best_effort_path_display());

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_execution(&mut self, section: &Mapping<'_>) -> Result<(), ConfigCreationError> {
        for (key, value) in section {
            match key.as_str() {
                Some("timeout_ms") => {
                    let millis = positive_integer("execution.timeout_ms", value)?;
                    self.execution.timeout = Duration::from_millis(millis);
                }
                Some("concurrency") => {
                    let workers = positive_integer("execution.concurrency", value)?;
                    self.execution.concurrency = usize::try_from(workers)
                        .ok()
                        .and_then(NonZeroUsize::new)
                        .unwrap_or(NonZeroUsize::MIN);
                }
                _ => warn!("Ignoring unknown config key execution.{:?}", key),
            }
        }
        Ok(())
    }

    fn apply_output(&mut self, section: &Mapping<'_>) -> Result<(), ConfigCreationError> {
        for (key, value) in section {
            match key.as_str() {
                Some("style") => {
                    self.style = match value.as_str() {
                        Some("tree") => TextStyle::Tree,
                        Some("indent") => TextStyle::Indent,
                        _ => {
                            return InvalidValueSnafu {
                                key: "output.style",
                                expected: "one of 'tree' or 'indent'",
                            }
                            .fail();
                        }
                    }
                }
                _ => warn!("Ignoring unknown config key output.{:?}", key),
            }
        }
        Ok(())
    }
}

fn section<'a, 'y>(
    top_level: &'a Mapping<'y>,
    name: &'static str,
) -> Result<Option<&'a Mapping<'y>>, ConfigCreationError> {
    match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(name)))) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
        Some(value) => value
            .as_mapping()
            .map(Some)
            .context(SectionNotMapSnafu { section: name }),
    }
}

fn positive_integer(key: &'static str, value: &Yaml<'_>) -> Result<u64, ConfigCreationError> {
    match value {
        Yaml::Value(Scalar::Integer(n)) if *n > 0 => Ok(*n as u64),
        _ => InvalidValueSnafu {
            key,
            expected: "a positive integer",
        }
        .fail(),
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigCreationError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let mut config = Config::default();

        let top_level = match documents.first() {
            None | Some(Yaml::Value(Scalar::Null)) => return Ok(config),
            Some(document) => document
                .as_mapping()
                .ok_or(ConfigCreationError::TopLevelNotMap)?,
        };

        for key in top_level.keys() {
            match key.as_str() {
                Some("execution") | Some("output") => {}
                _ => warn!("Ignoring unknown config section {:?}", key),
            }
        }

        if let Some(execution) = section(top_level, "execution")? {
            config.apply_execution(execution)?;
        }
        if let Some(output) = section(top_level, "output")? {
            config.apply_output(output)?;
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigCreationError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", section))]
    SectionNotMap { section: String },
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: String },
}
