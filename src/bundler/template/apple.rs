//! iOS and macOS descriptor rendering.

use crate::bundler::{BuildConfig, Result, escape_xml};
use regex::{Captures, NoExpand, Regex};

/// Sets the string value following `<key>{key}</key>` in a property list.
fn set_plist_string(source: &str, key: &str, value: &str) -> Result<String> {
    let pattern = Regex::new(&format!(
        r"(<key>{}</key>\s*<string>)[^<]*(</string>)",
        regex::escape(key)
    ))?;
    Ok(pattern
        .replace_all(source, |caps: &Captures<'_>| format!("{}{}{}", &caps[1], value, &caps[2]))
        .into_owned())
}

/// Renders `ios/Runner/Info.plist`.
pub fn render_ios_plist(source: &str, config: &BuildConfig) -> Result<String> {
    let name = escape_xml(config.app_name());
    let out = source.replace("{{APP_NAME}}", &name);
    let out = set_plist_string(&out, "CFBundleDisplayName", &name)?;
    set_plist_string(&out, "CFBundleName", &name)
}

/// Renders `ios/Runner.xcodeproj/project.pbxproj`.
///
/// Every build configuration gets the same bundle identifier, test targets
/// included.
pub fn render_pbxproj(source: &str, config: &BuildConfig) -> Result<String> {
    let pattern = Regex::new(r"PRODUCT_BUNDLE_IDENTIFIER\s*=\s*[^;]+;")?;
    let replacement = format!("PRODUCT_BUNDLE_IDENTIFIER = {};", config.package_id());
    Ok(pattern
        .replace_all(source, NoExpand(&replacement))
        .into_owned())
}

/// Renders `macos/Runner/Info.plist`.
pub fn render_macos_plist(source: &str, config: &BuildConfig) -> Result<String> {
    let name = escape_xml(config.app_name());
    set_plist_string(&source.replace("{{APP_NAME}}", &name), "CFBundleName", &name)
}

/// Renders `macos/Runner/Configs/AppInfo.xcconfig`.
pub fn render_xcconfig(source: &str, config: &BuildConfig) -> Result<String> {
    let product_name = Regex::new(r"(?m)^PRODUCT_NAME\s*=.*$")?;
    let bundle_id = Regex::new(r"(?m)^PRODUCT_BUNDLE_IDENTIFIER\s*=.*$")?;

    let out = product_name.replace_all(
        source,
        NoExpand(&format!("PRODUCT_NAME = {}", config.artifact_stem())),
    );
    Ok(bundle_id
        .replace_all(
            &out,
            NoExpand(&format!("PRODUCT_BUNDLE_IDENTIFIER = {}", config.package_id())),
        )
        .into_owned())
}
