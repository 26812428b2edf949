use std::collections::HashMap;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{Report, RuntimeConfig};
use crate::config::{IntakeConfig, IntakeConfigError};
use crate::expander::{ExpansionStatus, Expander};
use crate::ext::AsyncTryFrom;
use crate::filesystem::LocalDrop;
use crate::items::ContentError;
use crate::selection::{ContentDigest, IdentityKey, SelectionSet};

pub struct Application;

impl Application {
    /// Runs one drop gesture and prints the resulting selection.
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<SelectionSet, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let config = IntakeConfig::read(&app_config.root)
            .await
            .context(IntakeConfigSnafu)?
            .with_batch_size(app_config.batch_size);
        debug!("Loaded config: {:?}", config);

        let roots = LocalDrop::new(config.local_drop)
            .gesture(&app_config.paths)
            .await;
        info!("Expanding {} dropped items", roots.len());
        let outcome = Expander::new(roots).run().await;
        let status = outcome.status();
        if status == ExpansionStatus::Partial {
            warn!("Some dropped items could not be expanded, continuing with the rest");
        }

        let mut selection = SelectionSet::new();
        let summary = selection.merge(outcome.files);
        let removed = Self::forget(&mut selection, &app_config.forget);

        let digests = if app_config.digest {
            Some(Self::digest_all(&selection).await?)
        } else {
            None
        };

        let report = Report {
            selection: &selection,
            digests: digests.as_ref(),
            summary,
            removed,
            issues: &outcome.issues,
            status,
        };
        print!("{}", report.render());

        Ok(selection)
    }

    /// Removes every entry at the given relative paths, returning how many
    /// were removed.
    fn forget(selection: &mut SelectionSet, relative_paths: &[String]) -> usize {
        let mut removed = 0;
        for relative_path in relative_paths {
            let files = selection.remove_by_relative_path(relative_path);
            match files.len() {
                0 => warn!("Nothing selected at '{}'", relative_path),
                1 => info!("Removed '{}' from the selection", relative_path),
                count => warn!(
                    "Removed {} different files selected at '{}'",
                    count, relative_path
                ),
            }
            removed += files.len();
        }
        removed
    }

    async fn digest_all(
        selection: &SelectionSet,
    ) -> Result<HashMap<IdentityKey, ContentDigest>, ApplicationError> {
        let mut digests = HashMap::with_capacity(selection.len());
        for file in selection {
            let digest = ContentDigest::async_try_from(file)
                .await
                .context(DigestSnafu {
                    relative_path: file.relative_path.clone(),
                })?;
            debug!("Digest of '{}' is {}", file.relative_path, digest);
            digests.insert(file.identity(), digest);
        }
        Ok(digests)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    IntakeConfigError { source: IntakeConfigError },
    #[snafu(display("Failed to digest selected file '{}'", relative_path))]
    DigestError {
        relative_path: String,
        source: ContentError,
    },
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::selection::ExpandedFile;

    #[fixture]
    fn drop_root() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("logs/nested")).unwrap();
        fs::write(root.join("logs/a.log"), "ERROR boom").unwrap();
        fs::write(root.join("logs/nested/b.log"), "WARN slow").unwrap();
        fs::write(root.join("logs/.hidden"), "x").unwrap();
        fs::write(root.join("logdrop.yaml"), "batch_size: 1\nskip_hidden: true\n").unwrap();
        temp_dir
    }

    fn runtime_config(root: &TempDir, paths: &[&str]) -> RuntimeConfig {
        RuntimeConfig {
            paths: paths.iter().map(|path| root.path().join(path)).collect(),
            root: root.path().to_path_buf(),
            batch_size: None,
            forget: Vec::new(),
            digest: false,
        }
    }

    fn sorted_paths(selection: &SelectionSet) -> Vec<String> {
        let mut paths = selection
            .iter()
            .map(|file| file.relative_path.clone())
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    #[rstest]
    #[compio::test]
    async fn selects_files_under_dropped_directories(drop_root: TempDir) {
        let selection = Application::run(runtime_config(&drop_root, &["logs"]))
            .await
            .unwrap();

        assert_eq!(sorted_paths(&selection), vec!["logs/a.log", "logs/nested/b.log"]);
    }

    #[rstest]
    #[compio::test]
    async fn dropping_the_same_file_twice_selects_it_once(drop_root: TempDir) {
        let selection = Application::run(runtime_config(&drop_root, &["logs", "logs/a.log"]))
            .await
            .unwrap();

        assert_eq!(selection.len(), 2);
        assert!(selection.find_by_relative_path("logs/a.log").is_some());
        assert!(selection.find_by_relative_path("a.log").is_none());
    }

    #[rstest]
    #[compio::test]
    async fn forget_removes_selected_entries(drop_root: TempDir) {
        let mut config = runtime_config(&drop_root, &["logs"]);
        config.forget = vec!["logs/nested/b.log".to_string(), "logs/none.log".to_string()];

        let selection = Application::run(config).await.unwrap();

        assert_eq!(sorted_paths(&selection), vec!["logs/a.log"]);
    }

    #[rstest]
    #[compio::test]
    async fn forget_removes_every_file_sharing_the_path(drop_root: TempDir) {
        fs::create_dir_all(drop_root.path().join("archive/logs")).unwrap();
        fs::write(drop_root.path().join("archive/logs/a.log"), "ERROR older boom").unwrap();
        let mut config = runtime_config(&drop_root, &["logs", "archive/logs"]);
        config.forget = vec!["logs/a.log".to_string()];

        let selection = Application::run(config).await.unwrap();

        assert_eq!(sorted_paths(&selection), vec!["logs/nested/b.log"]);
    }

    #[rstest]
    #[compio::test]
    async fn digest_reads_every_selected_file(drop_root: TempDir) {
        let mut config = runtime_config(&drop_root, &["logs/a.log"]);
        config.digest = true;

        let selection = Application::run(config).await.unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[rstest]
    #[compio::test]
    async fn missing_paths_do_not_fail_the_gesture(drop_root: TempDir) {
        let selection = Application::run(runtime_config(&drop_root, &["missing", "logs/a.log"]))
            .await
            .unwrap();

        assert_eq!(sorted_paths(&selection), vec!["a.log"]);
    }

    #[rstest]
    #[compio::test]
    async fn invalid_config_is_fatal(drop_root: TempDir) {
        fs::write(drop_root.path().join("logdrop.yaml"), "batch_size: 0").unwrap();

        let result = Application::run(runtime_config(&drop_root, &["logs"])).await;
        assert!(matches!(
            result,
            Err(ApplicationError::IntakeConfigError { .. })
        ));
    }

    #[compio::test]
    async fn digest_failure_names_the_file() {
        let mut selection = SelectionSet::new();
        selection.merge(vec![ExpandedFile::from_plain(
            crate::items::PlainFile::new(
                "gone.log",
                1,
                0,
                PathBuf::from("/this/path/does/not/exist.log").into(),
            ),
            "logs/",
        )]);

        let result = Application::digest_all(&selection).await;
        assert!(matches!(
            result,
            Err(ApplicationError::DigestError { ref relative_path, .. }) if relative_path == "logs/gone.log"
        ));
    }
}
