use std::hash::Hasher;

use derive_more::Display;
use metrohash::MetroHash64;

use crate::ext::AsyncTryFrom;
use crate::items::ContentError;

use super::ExpandedFile;

/// MetroHash64 of a selected file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0:016x}")]
pub struct ContentDigest(pub u64);

impl ContentDigest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = MetroHash64::default();
        hasher.write(bytes);
        ContentDigest(hasher.finish())
    }
}

impl<'a> AsyncTryFrom<&'a ExpandedFile> for ContentDigest {
    type Error = ContentError;

    async fn async_try_from(file: &'a ExpandedFile) -> Result<Self, Self::Error> {
        let bytes = file.content.read_all().await?;
        Ok(Self::of_bytes(&bytes))
    }
}
