use std::path::PathBuf;
use std::sync::Arc;

use compio::fs;
use snafu::{ResultExt, Snafu};

/// Deferred access to the bytes of a plain file.
///
/// Nothing is read until [`ContentHandle::read_all`] is awaited, which is the
/// upload step's business and never happens during expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentHandle {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl ContentHandle {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        ContentHandle::Bytes(bytes.into())
    }

    pub async fn read_all(&self) -> Result<Vec<u8>, ContentError> {
        match self {
            ContentHandle::Path(path) => fs::read(path)
                .await
                .context(ReadContentSnafu { path: path.clone() }),
            ContentHandle::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

impl From<PathBuf> for ContentHandle {
    fn from(path: PathBuf) -> Self {
        ContentHandle::Path(path)
    }
}

#[derive(Debug, Snafu)]
pub enum ContentError {
    #[snafu(display("Failed to read content of {}", path.display()))]
    ReadContentError {
        path: PathBuf,
        source: std::io::Error,
    },
}
