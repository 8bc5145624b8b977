//! Per-platform build step.

use super::{ArtifactKind, Platform};
use crate::bundler::{
    BuildConfig, Result,
    error::Context,
    utils::{archive::zip_dir, fs::copy_file, fs::join_all, process::run_tool},
};
use std::path::{Path, PathBuf};

/// Invokes the toolchain for one platform at a time against a prepared
/// project tree, collecting artifacts into a stable output directory.
#[derive(Debug, Clone, Copy)]
pub struct BuildStep<'a> {
    flutter: &'a Path,
    project_dir: &'a Path,
    outputs_dir: &'a Path,
}

impl<'a> BuildStep<'a> {
    /// Creates a build step for one project workspace.
    pub fn new(flutter: &'a Path, project_dir: &'a Path, outputs_dir: &'a Path) -> Self {
        Self {
            flutter,
            project_dir,
            outputs_dir,
        }
    }

    /// Builds `platform` and publishes its artifact.
    ///
    /// Returns `Ok(None)` when the command succeeded but the expected artifact
    /// is missing. A non-zero exit or a timeout is returned as an error.
    pub async fn run(&self, platform: Platform, config: &BuildConfig) -> Result<Option<PathBuf>> {
        let target = platform.target();

        run_tool(self.flutter, target.args, Some(self.project_dir), target.timeout)
            .await?
            .into_result()
            .with_context(|| format!("{} build failed", platform.display_name()))?;

        let artifact = join_all(self.project_dir, target.artifact);
        let present = match target.kind {
            ArtifactKind::File => artifact.is_file(),
            ArtifactKind::Directory => artifact.is_dir(),
        };
        if !present {
            log::warn!(
                "{} build exited cleanly but produced no artifact at {}",
                platform.display_name(),
                artifact.display()
            );
            return Ok(None);
        }

        let output = self
            .outputs_dir
            .join(format!("{}{}", config.artifact_stem(), target.output_suffix));

        match target.kind {
            ArtifactKind::File => copy_file(&artifact, &output).await?,
            ArtifactKind::Directory => {
                let files = zip_dir(&artifact, &output).await?;
                log::debug!("Archived {} files into {}", files, output.display());
            }
        }

        log::info!("{} artifact: {}", platform.display_name(), output.display());
        Ok(Some(output))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::{BuildConfigBuilder, Error};
    use std::os::unix::fs::PermissionsExt;

    fn config(platforms: &[Platform]) -> BuildConfig {
        BuildConfigBuilder::new()
            .app_name("Demo Shop")
            .description("d")
            .version("1.0.0")
            .build_number(1)
            .package_id("com.demo.shop")
            .web_url("https://demo.example.com")
            .platforms(platforms.iter().copied())
            .build()
            .unwrap()
    }

    fn fake_flutter(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("flutter");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn copies_single_file_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        let outputs = tmp.path().join("outputs");
        std::fs::create_dir_all(&project).unwrap();
        let flutter = fake_flutter(
            tmp.path(),
            "mkdir -p build/app/outputs/flutter-apk && echo apk > build/app/outputs/flutter-apk/app-release.apk",
        );

        let step = BuildStep::new(&flutter, &project, &outputs);
        let out = step
            .run(Platform::Android, &config(&[Platform::Android]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out, outputs.join("demoshop.apk"));
        assert_eq!(std::fs::read_to_string(out).unwrap().trim(), "apk");
    }

    #[tokio::test]
    async fn zips_directory_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let flutter = fake_flutter(
            tmp.path(),
            "mkdir -p build/web && echo '<html/>' > build/web/index.html",
        );

        let outputs = tmp.path().join("outputs");
        let step = BuildStep::new(&flutter, &project, &outputs);
        let out = step
            .run(Platform::Web, &config(&[Platform::Web]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.file_name().unwrap(), "demoshop_web.zip");
        assert!(out.is_file());
    }

    #[tokio::test]
    async fn missing_artifact_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let flutter = fake_flutter(tmp.path(), "exit 0");

        let outputs = tmp.path().join("outputs");
        let step = BuildStep::new(&flutter, &project, &outputs);
        let out = step.run(Platform::Linux, &config(&[Platform::Linux])).await.unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let flutter = fake_flutter(tmp.path(), "echo 'Gradle task failed' >&2; exit 1");

        let outputs = tmp.path().join("outputs");
        let step = BuildStep::new(&flutter, &project, &outputs);
        let err = step
            .run(Platform::Android, &config(&[Platform::Android]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Android APK build failed"));
        assert!(err.to_string().contains("Gradle task failed"));
        assert!(matches!(err, Error::Context(_, _)));
    }
}
