use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use compio::fs;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::filesystem::LocalDropOptions;

const CONFIG_FILE_NAME: &str = "logdrop.yaml";

const BATCH_SIZE_KEY: &str = "batch_size";
const SKIP_HIDDEN_KEY: &str = "skip_hidden";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Settings read from `logdrop.yaml`. Every key is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeConfig {
    pub local_drop: LocalDropOptions,
}

impl IntakeConfig {
    /// Reads `logdrop.yaml` from `root`; a missing file yields the defaults.
    pub async fn read(root: &Path) -> Result<Self, IntakeConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, IntakeConfigError> {
        debug!("Reading config file: {}", path.display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(Utf8Snafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    /// Applies a batch size given on the command line.
    pub fn with_batch_size(mut self, batch_size: Option<NonZeroUsize>) -> Self {
        if let Some(batch_size) = batch_size {
            self.local_drop.batch_size = batch_size;
        }
        self
    }

    fn parse_batch_size(value: &Yaml) -> Result<NonZeroUsize, IntakeConfigError> {
        let Yaml::Value(Scalar::Integer(raw)) = value else {
            return InvalidValueSnafu {
                key: BATCH_SIZE_KEY,
                expected: "a positive integer",
            }
            .fail();
        };
        usize::try_from(*raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .context(InvalidBatchSizeSnafu { value: *raw })
    }

    fn parse_skip_hidden(value: &Yaml) -> Result<bool, IntakeConfigError> {
        match value {
            Yaml::Value(Scalar::Boolean(flag)) => Ok(*flag),
            _ => InvalidValueSnafu {
                key: SKIP_HIDDEN_KEY,
                expected: "a boolean",
            }
            .fail(),
        }
    }
}

impl TryFrom<&str> for IntakeConfig {
    type Error = IntakeConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        };
        if matches!(document, Yaml::Value(Scalar::Null)) {
            return Ok(Self::default());
        }

        let top_level = document
            .as_mapping()
            .ok_or(IntakeConfigError::TopLevelNotMap)?;

        let mut config = Self::default();
        for (key, value) in top_level {
            match key {
                Yaml::Value(Scalar::String(name)) if name == BATCH_SIZE_KEY => {
                    config.local_drop.batch_size = Self::parse_batch_size(value)?;
                }
                Yaml::Value(Scalar::String(name)) if name == SKIP_HIDDEN_KEY => {
                    config.local_drop.skip_hidden = Self::parse_skip_hidden(value)?;
                }
                _ => debug!("Ignoring unknown config entry: {:?}", key),
            }
        }

        debug!("Parsed config: {:?}", config);
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum IntakeConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The config file {} is not valid UTF-8", file_path))]
    Utf8Error {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Batch size must be at least 1, got {}", value))]
    InvalidBatchSize { value: i64 },
}
