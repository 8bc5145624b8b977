//! Windows and Linux CMake descriptor rendering.

use crate::bundler::{BuildConfig, Result};
use regex::{NoExpand, Regex};

fn set_cmake_var(source: &str, var: &str, value: &str) -> Result<String> {
    let pattern = Regex::new(&format!(r#"set\({}\s+"[^"]*"\)"#, regex::escape(var)))?;
    Ok(pattern
        .replace_all(source, NoExpand(&format!("set({var} \"{value}\")")))
        .into_owned())
}

/// Renders `windows/CMakeLists.txt`.
pub fn render_windows_cmake(source: &str, config: &BuildConfig) -> Result<String> {
    let stem = config.artifact_stem();
    let project = Regex::new(r"project\([^)]+\)")?;
    let out = project.replace(source, NoExpand(&format!("project({stem} LANGUAGES CXX)")));
    set_cmake_var(&out, "BINARY_NAME", &stem)
}

/// Renders `linux/CMakeLists.txt`.
pub fn render_linux_cmake(source: &str, config: &BuildConfig) -> Result<String> {
    let out = set_cmake_var(source, "BINARY_NAME", &config.artifact_stem())?;
    set_cmake_var(&out, "APPLICATION_ID", config.package_id())
}
