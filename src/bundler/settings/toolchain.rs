//! External executables used by the pipeline.

use std::path::PathBuf;

/// Locations of the external tools the pipeline drives.
///
/// Bare program names are resolved on `PATH` at spawn time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainSettings {
    /// Cross-platform build toolchain (`flutter`).
    pub flutter: PathBuf,
    /// Script runner for code generators (`dart`).
    pub dart: PathBuf,
    /// Key generation executable (`keytool`).
    pub keytool: PathBuf,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            flutter: PathBuf::from("flutter"),
            dart: PathBuf::from("dart"),
            keytool: PathBuf::from("keytool"),
        }
    }
}

impl ToolchainSettings {
    /// Tool name and configured path, for diagnostics.
    pub fn entries(&self) -> [(&'static str, &PathBuf); 3] {
        [
            ("flutter", &self.flutter),
            ("dart", &self.dart),
            ("keytool", &self.keytool),
        ]
    }
}
