//! Target platforms and the per-platform build step.
//!
//! Each [`Platform`] maps to exactly one toolchain build command, a timeout,
//! and a fixed artifact location inside the toolchain's output tree. The
//! mapping lives in [`Platform::target`] so the build step itself stays
//! table-driven.

mod build;

pub use build::BuildStep;

use std::{fmt, str::FromStr, time::Duration};

/// Target platform for a build job.
///
/// The serialized names are the identifiers accepted in job submissions
/// (`android`, `android-bundle`, `ios`, `web`, `macos`, `windows`, `linux`).
///
/// # Examples
///
/// ```
/// use swab::bundler::Platform;
///
/// let platform: Platform = "android_aab".parse().unwrap();
/// assert_eq!(platform, Platform::AndroidBundle);
/// assert_eq!(platform.to_string(), "android-bundle");
/// ```
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Android APK
    Android,
    /// Android App Bundle (.aab)
    #[serde(alias = "android_aab")]
    AndroidBundle,
    /// iOS app (unsigned)
    Ios,
    /// Static web build
    Web,
    /// macOS app
    #[serde(alias = "mac")]
    Macos,
    /// Windows runner
    Windows,
    /// Linux bundle
    Linux,
}

/// Shape of the artifact a platform build produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArtifactKind {
    /// A single file copied as-is.
    File,
    /// A directory compressed to zip.
    Directory,
}

/// Static build description for one platform.
#[derive(Clone, Copy, Debug)]
pub struct BuildTarget {
    /// Arguments passed to the toolchain executable.
    pub args: &'static [&'static str],
    /// Upper bound on the build command.
    pub timeout: Duration,
    /// Artifact location relative to the project root.
    pub artifact: &'static [&'static str],
    /// Whether the artifact is a file or a directory.
    pub kind: ArtifactKind,
    /// Suffix appended to the sanitized app name for the stable output.
    pub output_suffix: &'static str,
}

const TEN_MINUTES: Duration = Duration::from_secs(600);
const FIVE_MINUTES: Duration = Duration::from_secs(300);

impl Platform {
    /// Every supported platform, in submission order.
    pub const ALL: [Platform; 7] = [
        Platform::Android,
        Platform::AndroidBundle,
        Platform::Ios,
        Platform::Web,
        Platform::Macos,
        Platform::Windows,
        Platform::Linux,
    ];

    /// Identifier used in submissions, job outputs and webhook payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::AndroidBundle => "android-bundle",
            Platform::Ios => "ios",
            Platform::Web => "web",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }

    /// Human-readable name for progress messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Android => "Android APK",
            Platform::AndroidBundle => "Android AAB",
            Platform::Ios => "iOS",
            Platform::Web => "Web",
            Platform::Macos => "macOS",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// True for platforms that need an Android signing identity.
    pub fn is_android(&self) -> bool {
        matches!(self, Platform::Android | Platform::AndroidBundle)
    }

    /// Build command, timeout and artifact location for this platform.
    pub fn target(&self) -> BuildTarget {
        match self {
            Platform::Android => BuildTarget {
                args: &["build", "apk", "--release"],
                timeout: TEN_MINUTES,
                artifact: &["build", "app", "outputs", "flutter-apk", "app-release.apk"],
                kind: ArtifactKind::File,
                output_suffix: ".apk",
            },
            Platform::AndroidBundle => BuildTarget {
                args: &["build", "appbundle", "--release"],
                timeout: TEN_MINUTES,
                artifact: &["build", "app", "outputs", "bundle", "release", "app-release.aab"],
                kind: ArtifactKind::File,
                output_suffix: ".aab",
            },
            Platform::Ios => BuildTarget {
                args: &["build", "ios", "--release", "--no-codesign"],
                timeout: TEN_MINUTES,
                artifact: &["build", "ios", "iphoneos", "Runner.app"],
                kind: ArtifactKind::Directory,
                output_suffix: "_ios.zip",
            },
            Platform::Web => BuildTarget {
                args: &["build", "web", "--release"],
                timeout: FIVE_MINUTES,
                artifact: &["build", "web"],
                kind: ArtifactKind::Directory,
                output_suffix: "_web.zip",
            },
            Platform::Macos => BuildTarget {
                args: &["build", "macos", "--release"],
                timeout: TEN_MINUTES,
                artifact: &["build", "macos", "Build", "Products", "Release"],
                kind: ArtifactKind::Directory,
                output_suffix: "_macos.zip",
            },
            Platform::Windows => BuildTarget {
                args: &["build", "windows", "--release"],
                timeout: TEN_MINUTES,
                artifact: &["build", "windows", "x64", "runner", "Release"],
                kind: ArtifactKind::Directory,
                output_suffix: "_windows.zip",
            },
            Platform::Linux => BuildTarget {
                args: &["build", "linux", "--release"],
                timeout: TEN_MINUTES,
                artifact: &["build", "linux", "x64", "release", "bundle"],
                kind: ArtifactKind::Directory,
                output_suffix: "_linux.zip",
            },
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" | "apk" => Ok(Platform::Android),
            "android-bundle" | "android_aab" | "aab" => Ok(Platform::AndroidBundle),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            "macos" | "mac" => Ok(Platform::Macos),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(format!(
                "unsupported platform '{}'; expected one of: {}",
                other,
                Platform::ALL
                    .iter()
                    .map(Platform::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
