//! App naming and launcher icon stages.
//!
//! Both stages drive code generators from the project's dev dependencies.
//! Failures are logged and never abort the job.

use crate::bundler::{
    BuildConfig, Result, ToolchainSettings,
    error::{Context, ErrorExt},
    template::add_dev_dependency,
    utils::{
        fs::{copy_file, rewrite_text},
        process::run_tool,
    },
};
use std::{path::Path, time::Duration};

const RENAME_PACKAGE: (&str, &str) = ("rename", "^3.0.2");
const ICONS_PACKAGE: (&str, &str) = ("icons_launcher", "^3.0.0");

const PUB_GET_TIMEOUT: Duration = Duration::from_secs(120);
const RENAME_TIMEOUT: Duration = Duration::from_secs(60);
const ICONS_TIMEOUT: Duration = Duration::from_secs(120);

const ICONS_CONFIG: &str = r#"icons_launcher:
  image_path: "assets/icon.png"
  platforms:
    android:
      enable: true
    ios:
      enable: true
    macos:
      enable: true
    windows:
      enable: true
    linux:
      enable: true
    web:
      enable: true
"#;

/// Sets the display name and bundle id on every native project with the
/// `rename` generator. Returns whether every step succeeded.
pub async fn rename_app(toolchain: &ToolchainSettings, project_dir: &Path, config: &BuildConfig) -> bool {
    match try_rename(toolchain, project_dir, config).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("App rename step failed: {e}");
            false
        }
    }
}

async fn try_rename(toolchain: &ToolchainSettings, project_dir: &Path, config: &BuildConfig) -> Result<()> {
    add_dependency(project_dir, RENAME_PACKAGE).await?;
    pub_get(toolchain, project_dir).await?;

    for (command, value) in [
        ("setAppName", config.app_name()),
        ("setBundleId", config.package_id()),
    ] {
        run_tool(
            &toolchain.dart,
            ["run", "rename", command, "--value", value],
            Some(project_dir),
            RENAME_TIMEOUT,
        )
        .await?
        .into_result()
        .with_context(|| format!("rename {command}"))?;
    }
    Ok(())
}

/// Installs `icon` as the launcher icon on every platform with the
/// `icons_launcher` generator. Returns whether every step succeeded.
pub async fn install_icon(toolchain: &ToolchainSettings, project_dir: &Path, icon: &Path) -> bool {
    match try_install_icon(toolchain, project_dir, icon).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Icon generation failed: {e}");
            false
        }
    }
}

async fn try_install_icon(toolchain: &ToolchainSettings, project_dir: &Path, icon: &Path) -> Result<()> {
    copy_file(icon, &project_dir.join("assets").join("icon.png")).await?;

    let config_path = project_dir.join("icons_launcher.yaml");
    tokio::fs::write(&config_path, ICONS_CONFIG)
        .await
        .fs_context("writing", &config_path)?;

    add_dependency(project_dir, ICONS_PACKAGE).await?;
    pub_get(toolchain, project_dir).await?;

    run_tool(
        &toolchain.dart,
        ["run", "icons_launcher:create"],
        Some(project_dir),
        ICONS_TIMEOUT,
    )
    .await?
    .into_result()
    .context("icons_launcher")?;
    Ok(())
}

async fn add_dependency(project_dir: &Path, (package, constraint): (&str, &str)) -> Result<()> {
    rewrite_text(&project_dir.join("pubspec.yaml"), |s| {
        Ok(add_dev_dependency(s, package, constraint))
    })
    .await?
    .context("pubspec.yaml missing")?;
    Ok(())
}

async fn pub_get(toolchain: &ToolchainSettings, project_dir: &Path) -> Result<()> {
    run_tool(&toolchain.flutter, ["pub", "get"], Some(project_dir), PUB_GET_TIMEOUT)
        .await?
        .into_result()?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::{BuildConfigBuilder, Platform};
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn project(dir: &Path) -> std::path::PathBuf {
        let project = dir.join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("pubspec.yaml"), "name: x\ndev_dependencies:\n").unwrap();
        project
    }

    #[tokio::test]
    async fn rename_records_calls_and_adds_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let toolchain = ToolchainSettings {
            flutter: script(dir.path(), "flutter", "exit 0"),
            dart: script(dir.path(), "dart", &format!("echo \"$@\" >> {}", log.display())),
            keytool: "keytool".into(),
        };
        let project = project(dir.path());
        let config = BuildConfigBuilder::new()
            .app_name("Named")
            .description("d")
            .version("1.0.0")
            .build_number(1)
            .package_id("com.named.app")
            .web_url("https://example.com")
            .platforms([Platform::Web])
            .build()
            .unwrap();

        assert!(rename_app(&toolchain, &project, &config).await);

        let calls = std::fs::read_to_string(log).unwrap();
        assert!(calls.contains("run rename setAppName --value Named"));
        assert!(calls.contains("run rename setBundleId --value com.named.app"));
        let pubspec = std::fs::read_to_string(project.join("pubspec.yaml")).unwrap();
        assert!(pubspec.contains("rename: ^3.0.2"));
    }

    #[tokio::test]
    async fn icon_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = ToolchainSettings {
            flutter: script(dir.path(), "flutter", "exit 0"),
            dart: script(dir.path(), "dart", "exit 2"),
            keytool: "keytool".into(),
        };
        let project = project(dir.path());
        let icon = dir.path().join("icon.png");
        std::fs::write(&icon, [0x89, b'P', b'N', b'G']).unwrap();

        assert!(!install_icon(&toolchain, &project, &icon).await);
        assert!(project.join("assets/icon.png").is_file());
        assert!(project.join("icons_launcher.yaml").is_file());
    }
}
