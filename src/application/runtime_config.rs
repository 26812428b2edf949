use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub paths: Vec<PathBuf>,
    pub root: PathBuf,
    pub batch_size: Option<NonZeroUsize>,
    pub forget: Vec<String>,
    pub digest: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            paths: cli.paths,
            root: cli.root,
            batch_size: cli.batch_size,
            forget: cli.forget,
            digest: cli.digest,
        }
    }
}
