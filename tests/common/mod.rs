//! Shared fixtures: a throwaway installation with fake toolchain scripts.
//!
//! The fake `flutter` produces the artifact each `build` subcommand would,
//! fails the subcommands listed at creation, and logs every invocation.
//! The fake `keytool` writes whatever file `-keystore` names.

#![allow(dead_code)]

use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};
use swab::{
    SwabService,
    bundler::{Settings, SettingsBuilder},
};
use tempfile::TempDir;

pub struct Install {
    pub root: TempDir,
    pub template: PathBuf,
    pub logs: PathBuf,
    pub toolchain: PathBuf,
}

impl Install {
    /// Fresh base dir with a copy of the shipped template.
    ///
    /// `failing` names flutter subcommands (`apk`, `web`, `get`, ...) that
    /// exit non-zero.
    pub fn new(failing: &[&str]) -> Self {
        let root = TempDir::new().unwrap();
        let template = root.path().join("templates").join("webview_app");
        copy_tree(&shipped_template(), &template);

        let logs = root.path().join("logs");
        let toolchain = root.path().join("bin");
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::create_dir_all(&toolchain).unwrap();

        script(&toolchain, "flutter", &flutter_body(&logs, failing));
        script(
            &toolchain,
            "dart",
            &format!("echo \"$*\" >> \"{}/dart.log\"", logs.display()),
        );
        script(&toolchain, "keytool", &keytool_body(&logs));

        Self {
            root,
            template,
            logs,
            toolchain,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.root.path()
    }

    pub fn settings(&self) -> Settings {
        SettingsBuilder::new()
            .base_dir(self.root.path())
            .flutter(self.toolchain.join("flutter"))
            .dart(self.toolchain.join("dart"))
            .keytool(self.toolchain.join("keytool"))
            .build()
            .unwrap()
    }

    pub fn service(&self) -> SwabService {
        SwabService::new(self.settings())
    }

    /// Logged invocations of one fake tool, one per line.
    pub fn calls(&self, tool: &str) -> Vec<String> {
        std::fs::read_to_string(self.logs.join(format!("{tool}.log")))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Minimal valid submission for `platforms`.
pub fn submission(platforms: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "app_name": "Corner Shop",
        "app_description": "Corner shop storefront",
        "app_version": "2.1.0",
        "build_number": 12,
        "package_name": "com.corner.shop",
        "web_url": "https://shop.example.com",
        "platforms": platforms,
    })
}

pub fn shipped_template() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/webview_app")
}

pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn flutter_body(logs: &Path, failing: &[&str]) -> String {
    format!(
        r#"echo "$*" >> "{log}/flutter.log"
case " {failing} " in
  *" $2 "*) echo "simulated $2 failure" >&2; exit 1 ;;
esac
[ "$1" = "build" ] || exit 0
case "$2" in
  apk) mkdir -p build/app/outputs/flutter-apk && echo apk > build/app/outputs/flutter-apk/app-release.apk ;;
  appbundle) mkdir -p build/app/outputs/bundle/release && echo aab > build/app/outputs/bundle/release/app-release.aab ;;
  ios) mkdir -p build/ios/iphoneos/Runner.app && echo bin > build/ios/iphoneos/Runner.app/Runner ;;
  web) mkdir -p build/web && echo '<html/>' > build/web/index.html ;;
  macos) mkdir -p build/macos/Build/Products/Release && echo app > build/macos/Build/Products/Release/app ;;
  windows) mkdir -p build/windows/x64/runner/Release && echo exe > build/windows/x64/runner/Release/app.exe ;;
  linux) mkdir -p build/linux/x64/release/bundle && echo elf > build/linux/x64/release/bundle/app ;;
esac"#,
        log = logs.display(),
        failing = failing.join(" "),
    )
}

fn keytool_body(logs: &Path) -> String {
    format!(
        r#"echo "$*" >> "{log}/keytool.log"
while [ $# -gt 0 ]; do
  if [ "$1" = "-keystore" ]; then echo jks > "$2"; fi
  shift
done"#,
        log = logs.display(),
    )
}

fn copy_tree(from: &Path, to: &Path) {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.unwrap();
        let dest = to.join(entry.path().strip_prefix(from).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).unwrap();
        } else {
            std::fs::copy(entry.path(), &dest).unwrap();
        }
    }
}
