//! Project templating.
//!
//! Turns a copied toolchain project tree into one app by literal placeholder
//! substitution. Every renderer is a pure `&str -> String` function; this
//! module maps them onto files and counts what changed.
//!
//! Two files are required: `lib/main.dart` and `pubspec.yaml`. Every other
//! descriptor is optional and silently skipped when the template does not
//! ship it.

mod android;
mod apple;
mod desktop;
mod source;

pub use source::add_dev_dependency;

use crate::bundler::{
    BuildConfig, Platform, Result, SigningCredential,
    error::Error,
    utils::fs::{join_all, rewrite_text},
};
use std::path::Path;

const ENTRY_POINT: &[&str] = &["lib", "main.dart"];
const PUBSPEC: &[&str] = &["pubspec.yaml"];
const GRADLE: &[&str] = &["android", "app", "build.gradle.kts"];
const MANIFEST: &[&str] = &["android", "app", "src", "main", "AndroidManifest.xml"];
const IOS_PLIST: &[&str] = &["ios", "Runner", "Info.plist"];
const PBXPROJ: &[&str] = &["ios", "Runner.xcodeproj", "project.pbxproj"];
const MACOS_PLIST: &[&str] = &["macos", "Runner", "Info.plist"];
const XCCONFIG: &[&str] = &["macos", "Runner", "Configs", "AppInfo.xcconfig"];
const WINDOWS_CMAKE: &[&str] = &["windows", "CMakeLists.txt"];
const LINUX_CMAKE: &[&str] = &["linux", "CMakeLists.txt"];

/// Applies the whole template to `project_dir` using the caller-supplied
/// credential, if it exists on disk.
///
/// Returns the number of files whose content changed.
pub async fn apply(project_dir: &Path, config: &BuildConfig) -> Result<usize> {
    let project = configure_project(project_dir, config).await?;
    let platforms = configure_platforms(project_dir, config, config.existing_credential()).await?;
    Ok(project + platforms)
}

/// Rewrites the entry point and the pubspec.
///
/// # Errors
///
/// Fails when either file is missing from the tree.
pub async fn configure_project(project_dir: &Path, config: &BuildConfig) -> Result<usize> {
    let mut changed = 0;
    changed += rewrite_required(project_dir, ENTRY_POINT, |s| {
        source::render_entry_point(s, config)
    })
    .await?;
    changed += rewrite_required(project_dir, PUBSPEC, |s| Ok(source::render_pubspec(s, config)))
        .await?;
    Ok(changed)
}

/// Rewrites the native descriptors of every requested platform.
///
/// `signing` is the credential the Android release build should use; `None`
/// switches the release build to debug signing.
pub async fn configure_platforms(
    project_dir: &Path,
    config: &BuildConfig,
    signing: Option<&SigningCredential>,
) -> Result<usize> {
    let platforms = config.platforms();
    let mut changed = 0;

    if config.wants_android() {
        changed += rewrite_optional(project_dir, GRADLE, |s| {
            android::render_gradle(s, config, signing)
        })
        .await?;
        changed += rewrite_optional(project_dir, MANIFEST, |s| android::render_manifest(s, config))
            .await?;
    }

    if platforms.contains(&Platform::Ios) {
        changed += rewrite_optional(project_dir, IOS_PLIST, |s| apple::render_ios_plist(s, config))
            .await?;
        changed += rewrite_optional(project_dir, PBXPROJ, |s| apple::render_pbxproj(s, config))
            .await?;
    }

    if platforms.contains(&Platform::Macos) {
        changed +=
            rewrite_optional(project_dir, MACOS_PLIST, |s| apple::render_macos_plist(s, config))
                .await?;
        changed += rewrite_optional(project_dir, XCCONFIG, |s| apple::render_xcconfig(s, config))
            .await?;
    }

    if platforms.contains(&Platform::Windows) {
        changed += rewrite_optional(project_dir, WINDOWS_CMAKE, |s| {
            desktop::render_windows_cmake(s, config)
        })
        .await?;
    }

    if platforms.contains(&Platform::Linux) {
        changed += rewrite_optional(project_dir, LINUX_CMAKE, |s| {
            desktop::render_linux_cmake(s, config)
        })
        .await?;
    }

    Ok(changed)
}

async fn rewrite_required<F>(root: &Path, segments: &[&str], edit: F) -> Result<usize>
where
    F: FnOnce(&str) -> Result<String>,
{
    let path = join_all(root, segments);
    match rewrite_text(&path, edit).await? {
        Some(changed) => Ok(usize::from(changed)),
        None => Err(Error::GenericError(format!(
            "required template file missing: {}",
            segments.join("/")
        ))),
    }
}

async fn rewrite_optional<F>(root: &Path, segments: &[&str], edit: F) -> Result<usize>
where
    F: FnOnce(&str) -> Result<String>,
{
    let path = join_all(root, segments);
    match rewrite_text(&path, edit).await? {
        Some(changed) => Ok(usize::from(changed)),
        None => {
            log::debug!("Skipping {}: not in template", segments.join("/"));
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::BuildConfigBuilder;
    use std::fs;

    fn write(root: &Path, segments: &[&str], content: &str) {
        let path = join_all(root, segments);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(platforms: &[Platform]) -> BuildConfig {
        BuildConfigBuilder::new()
            .app_name("Tree")
            .description("Tree app")
            .version("1.0.0")
            .build_number(2)
            .package_id("com.tree.app")
            .web_url("https://tree.example.com")
            .platforms(platforms.iter().copied())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn counts_changed_files_and_skips_missing_optional_ones() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ENTRY_POINT, "const name = '{{APP_NAME}}';");
        write(dir.path(), PUBSPEC, "name: {{APP_PACKAGE_NAME}}\ndev_dependencies:\n");
        write(dir.path(), LINUX_CMAKE, "set(BINARY_NAME \"webview_app\")\n");
        write(dir.path(), WINDOWS_CMAKE, "project(webview_app LANGUAGES CXX)\n");

        let changed = apply(dir.path(), &config(&[Platform::Linux, Platform::Ios]))
            .await
            .unwrap();

        // entry point, pubspec, linux; windows not requested, ios files absent
        assert_eq!(changed, 3);
        let windows = fs::read_to_string(join_all(dir.path(), WINDOWS_CMAKE)).unwrap();
        assert!(windows.contains("webview_app"));
        let main = fs::read_to_string(join_all(dir.path(), ENTRY_POINT)).unwrap();
        assert_eq!(main, "const name = 'Tree';");
    }

    #[tokio::test]
    async fn second_application_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ENTRY_POINT, "static const bool ALLOW_ZOOM = false;");
        write(dir.path(), PUBSPEC, "name: webview_app\nversion: 1.0.0+1\n");

        let config = config(&[Platform::Web]);
        assert_eq!(apply(dir.path(), &config).await.unwrap(), 2);
        assert_eq!(apply(dir.path(), &config).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_entry_point_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), PUBSPEC, "name: webview_app\n");

        let err = apply(dir.path(), &config(&[Platform::Web])).await.unwrap_err();
        assert!(err.to_string().contains("lib/main.dart"));
    }
}
