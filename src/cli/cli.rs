use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Expand dropped files and directories into a deduplicated upload selection.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Files and directories to drop
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The directory holding logdrop.yaml
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Entries read per directory poll, overrides the config file
    #[clap(long)]
    pub batch_size: Option<NonZeroUsize>,

    /// Remove the entry with this relative path from the selection
    #[clap(long, value_name = "RELATIVE_PATH")]
    pub forget: Vec<String>,

    /// Read every selected file and print a digest of its content
    #[clap(long)]
    pub digest: bool,
}
