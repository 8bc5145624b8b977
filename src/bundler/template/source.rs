//! Entry point and pubspec rendering.

use crate::bundler::{BuildConfig, Result, escape_dart, escape_double_quoted};
use regex::{Captures, Regex};

/// Renders `lib/main.dart`.
///
/// Replaces the identity placeholders, one `{{<TOGGLE>}}` placeholder per
/// feature toggle, and rewrites any `static const bool <TOGGLE> = ...;`
/// declaration for a known toggle.
pub fn render_entry_point(source: &str, config: &BuildConfig) -> Result<String> {
    let const_bool = Regex::new(r"static const bool ([A-Z_]+) = \w+;")?;
    let features = config.features();
    let constants = features.constants();

    let scanner_formats = features
        .scanner_formats
        .iter()
        .map(|f| format!("'{}'", escape_dart(f)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = source
        .replace("{{APP_NAME}}", &escape_dart(config.app_name()))
        .replace("{{APP_URL}}", &escape_dart(config.web_url().as_str()))
        .replace("{{BUNDLE_ID}}", config.package_id())
        .replace("{{DOWNLOAD_DIRECTORY}}", &escape_dart(&features.download_directory))
        .replace("{{SCANNER_FORMATS}}", &scanner_formats);

    for (name, value) in constants {
        out = out.replace(&format!("{{{{{name}}}}}"), dart_bool(value));
    }

    Ok(const_bool
        .replace_all(&out, |caps: &Captures<'_>| {
            match constants.iter().find(|(name, _)| *name == &caps[1]) {
                Some((name, value)) => format!("static const bool {} = {};", name, dart_bool(*value)),
                None => caps[0].to_string(),
            }
        })
        .into_owned())
}

/// Renders `pubspec.yaml`, including the legacy literal lines of older
/// templates.
pub fn render_pubspec(source: &str, config: &BuildConfig) -> String {
    let package = pubspec_name(config);
    let description = escape_double_quoted(config.description());

    source
        .replace("{{APP_PACKAGE_NAME}}", &package)
        .replace("{{APP_DESCRIPTION}}", &description)
        .replace("{{APP_VERSION}}", &config.version().to_string())
        .replace("{{APP_BUILD_NUMBER}}", &config.build_number().to_string())
        .replace("name: webview_app", &format!("name: {package}"))
        .replace(
            "description: \"A new Flutter project.\"",
            &format!("description: \"{description}\""),
        )
        .replace("version: 1.0.0+1", &format!("version: {}", config.pubspec_version()))
}

/// Adds `dependency` under `dev_dependencies:` unless the package is
/// already listed.
pub fn add_dev_dependency(pubspec: &str, package: &str, constraint: &str) -> String {
    if pubspec.contains(&format!("{package}:")) {
        return pubspec.to_string();
    }
    pubspec.replacen(
        "dev_dependencies:",
        &format!("dev_dependencies:\n  {package}: {constraint}"),
        1,
    )
}

/// Package name used in the pubspec: the sanitized app name with dots
/// folded to underscores.
fn pubspec_name(config: &BuildConfig) -> String {
    config.artifact_stem().replace('.', "_")
}

fn dart_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildConfigBuilder, FeatureToggles, Platform};

    fn config() -> BuildConfig {
        let features = FeatureToggles {
            allow_zoom: false,
            enable_media_autoplay: true,
            scanner_formats: vec!["qr".into(), "ean13".into()],
            ..Default::default()
        };
        BuildConfigBuilder::new()
            .app_name("Tom's Shop")
            .description("Say \"hi\"")
            .version("2.0.1")
            .build_number(42)
            .package_id("com.toms.shop")
            .web_url("https://shop.example.com/")
            .platforms([Platform::Web])
            .features(features)
            .build()
            .unwrap()
    }

    #[test]
    fn entry_point_placeholders_and_constants() {
        let src = "\
const String APP_NAME = '{{APP_NAME}}';
const String APP_URL = '{{APP_URL}}';
const List<String> SCANNER_FORMATS = [{{SCANNER_FORMATS}}];
const bool QR = {{ENABLE_QR_SCANNER}};
static const bool ALLOW_ZOOM = true;
static const bool ENABLE_MEDIA_AUTOPLAY = false;
static const bool SOMETHING_ELSE = true;
";
        let out = render_entry_point(src, &config()).unwrap();
        assert!(out.contains("APP_NAME = 'Tom\\'s Shop';"));
        assert!(out.contains("APP_URL = 'https://shop.example.com/';"));
        assert!(out.contains("SCANNER_FORMATS = ['qr', 'ean13'];"));
        assert!(out.contains("const bool QR = true;"));
        assert!(out.contains("static const bool ALLOW_ZOOM = false;"));
        assert!(out.contains("static const bool ENABLE_MEDIA_AUTOPLAY = true;"));
        assert!(out.contains("static const bool SOMETHING_ELSE = true;"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let src = "static const bool ALLOW_ZOOM = true;\nname: '{{APP_NAME}}'\n";
        let once = render_entry_point(src, &config()).unwrap();
        assert_eq!(render_entry_point(&once, &config()).unwrap(), once);
    }

    #[test]
    fn pubspec_placeholders_and_legacy_lines() {
        let templated = "name: {{APP_PACKAGE_NAME}}\ndescription: \"{{APP_DESCRIPTION}}\"\nversion: {{APP_VERSION}}+{{APP_BUILD_NUMBER}}\n";
        let legacy = "name: webview_app\ndescription: \"A new Flutter project.\"\nversion: 1.0.0+1\n";
        let expected = "name: tomsshop\ndescription: \"Say \\\"hi\\\"\"\nversion: 2.0.1+42\n";

        assert_eq!(render_pubspec(templated, &config()), expected);
        assert_eq!(render_pubspec(legacy, &config()), expected);
    }

    #[test]
    fn dev_dependency_added_once() {
        let pubspec = "dev_dependencies:\n  flutter_test:\n    sdk: flutter\n";
        let once = add_dev_dependency(pubspec, "rename", "^3.0.2");
        assert!(once.starts_with("dev_dependencies:\n  rename: ^3.0.2\n"));
        assert_eq!(add_dev_dependency(&once, "rename", "^3.0.2"), once);
    }
}
