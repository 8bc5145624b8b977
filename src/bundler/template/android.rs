//! Android build descriptor and manifest rendering.

use crate::bundler::{BuildConfig, Result, SigningCredential, escape_double_quoted, escape_xml};
use regex::{NoExpand, Regex};

/// Renders `android/app/build.gradle.kts`.
///
/// With a credential the signing placeholders are filled in; without one
/// the release signing block is removed and the release build type falls
/// back to the debug signing identity.
pub fn render_gradle(
    source: &str,
    config: &BuildConfig,
    signing: Option<&SigningCredential>,
) -> Result<String> {
    let package_id = config.package_id();
    let mut out = source
        .replace("{{APP_PACKAGE_NAME}}", package_id)
        .replace("{{APP_VERSION}}", &config.version().to_string())
        .replace("{{APP_BUILD_NUMBER}}", &config.build_number().to_string());

    match signing {
        Some(credential) => {
            let keystore = credential.keystore_path.to_string_lossy();
            out = out
                .replace("{{KEYSTORE_PATH}}", &escape_double_quoted(&keystore))
                .replace("{{KEYSTORE_PASSWORD}}", &escape_double_quoted(&credential.store_password))
                .replace("{{KEY_ALIAS}}", &escape_double_quoted(&credential.key_alias))
                .replace("{{KEY_PASSWORD}}", &escape_double_quoted(&credential.key_password));
        }
        None => {
            let release_ref =
                Regex::new(r#"signingConfig\s*=\s*signingConfigs\.getByName\("release"\)"#)?;
            out = strip_release_signing(&out)?;
            out = release_ref
                .replace_all(&out, r#"signingConfig = signingConfigs.getByName("debug")"#)
                .into_owned();
        }
    }

    let namespace = Regex::new(r#"namespace\s*=\s*"[^"]*""#)?;
    let application_id = Regex::new(r#"applicationId\s*=\s*"[^"]*""#)?;
    let out = namespace.replace_all(&out, NoExpand(&format!("namespace = \"{package_id}\"")));
    let out = application_id.replace_all(&out, NoExpand(&format!("applicationId = \"{package_id}\"")));

    Ok(out.into_owned())
}

/// Removes every `signingConfigs { ... }` block that declares a release
/// config. Braces are matched, so placeholders inside the block are fine.
fn strip_release_signing(source: &str) -> Result<String> {
    let head = Regex::new(r"signingConfigs\s*\{")?;
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(m) = head.find(rest) {
        let Some(len) = closing_brace(&rest[m.end()..]) else {
            break;
        };
        let end = m.end() + len;
        let block = &rest[m.start()..end];
        out.push_str(&rest[..m.start()]);
        if !block.contains("create(\"release\")") {
            out.push_str(block);
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Byte length up to and including the brace that closes an open block.
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Renders `android/app/src/main/AndroidManifest.xml`.
pub fn render_manifest(source: &str, config: &BuildConfig) -> Result<String> {
    let name = escape_xml(config.app_name());
    let label = Regex::new(r#"android:label="[^"]*""#)?;
    let out = source.replace("{{APP_NAME}}", &name);
    Ok(label
        .replace_all(&out, NoExpand(&format!("android:label=\"{name}\"")))
        .into_owned())
}
