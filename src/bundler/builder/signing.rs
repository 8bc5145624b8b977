//! Release signing credential generation.
//!
//! Android release builds need a keystore. When the caller did not supply
//! one, a self-signed keystore is generated with the JDK `keytool` and a
//! plaintext record of its credentials is written next to it. Every failure
//! here is soft: the caller falls back to debug signing.

use crate::bundler::{
    BuildConfig, Result, SigningCredential,
    error::{Context, ErrorExt},
    utils::process::run_tool,
};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Generated keystore file name.
pub const KEYSTORE_FILE: &str = "release-keystore.jks";

/// Companion credential record file name.
pub const INFO_FILE: &str = "keystore-info.txt";

const KEY_ALIAS: &str = "release";
const PASSWORD_LEN: usize = 16;
const VALIDITY_DAYS: &str = "10000";
const KEYTOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Random alphanumeric password from the operating system's CSPRNG.
pub fn generate_password(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Certificate subject for the generated key.
///
/// The organisation is the second segment of the package id, capitalised.
pub fn distinguished_name(config: &BuildConfig) -> String {
    let mut org = config.organization().chars();
    let org = match org.next() {
        Some(first) => first.to_uppercase().chain(org).collect::<String>(),
        None => String::new(),
    };
    format!(
        "CN={}, OU=Mobile, O={}, L=Unknown, ST=Unknown, C=US",
        escape_rdn(config.app_name()),
        escape_rdn(&org)
    )
}

fn escape_rdn(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Generates a keystore in `keystore_dir`.
///
/// Returns `None` when `keytool` is missing, times out, exits non-zero or
/// does not produce the keystore; the reason is logged.
pub async fn generate_keystore(
    keytool: &Path,
    keystore_dir: &Path,
    config: &BuildConfig,
) -> Option<SigningCredential> {
    match try_generate(keytool, keystore_dir, config).await {
        Ok(credential) => {
            log::info!("Generated signing keystore at {}", credential.keystore_path.display());
            Some(credential)
        }
        Err(e) => {
            log::warn!("Keystore generation failed, release builds fall back to debug signing: {e}");
            None
        }
    }
}

async fn try_generate(
    keytool: &Path,
    keystore_dir: &Path,
    config: &BuildConfig,
) -> Result<SigningCredential> {
    tokio::fs::create_dir_all(keystore_dir)
        .await
        .fs_context("creating directory", keystore_dir)?;

    let keystore_path = keystore_dir.join(KEYSTORE_FILE);
    let password = generate_password(PASSWORD_LEN);
    let dname = distinguished_name(config);
    let keystore_arg = keystore_path.to_string_lossy().into_owned();

    let args = [
        "-genkeypair",
        "-v",
        "-keystore",
        keystore_arg.as_str(),
        "-keyalg",
        "RSA",
        "-keysize",
        "2048",
        "-validity",
        VALIDITY_DAYS,
        "-alias",
        KEY_ALIAS,
        "-storepass",
        password.as_str(),
        "-keypass",
        password.as_str(),
        "-dname",
        dname.as_str(),
    ];

    run_tool(keytool, args, None, KEYTOOL_TIMEOUT)
        .await?
        .into_result()
        .context("keytool failed")?;

    if !keystore_path.is_file() {
        crate::bail!(
            "keytool exited successfully but {} was not created",
            keystore_path.display()
        );
    }

    let credential = SigningCredential {
        keystore_path,
        store_password: password.clone(),
        key_alias: KEY_ALIAS.to_string(),
        key_password: password,
        info_path: Some(keystore_dir.join(INFO_FILE)),
    };
    write_info(&credential, config).await?;
    Ok(credential)
}

async fn write_info(credential: &SigningCredential, config: &BuildConfig) -> Result<PathBuf> {
    let path = credential
        .info_path
        .clone()
        .context("credential has no info path")?;

    let body = format!(
        "=== Android Keystore Information ===\n\n\
         IMPORTANT: Save this information securely!\n\
         You will need these credentials to publish updates to your app.\n\
         If they are lost, future release builds cannot update the installed app.\n\n\
         Keystore File: {KEYSTORE_FILE}\n\
         Keystore Password: {}\n\
         Key Alias: {}\n\
         Key Password: {}\n\n\
         Generated for: {} ({})\n",
        credential.store_password,
        credential.key_alias,
        credential.key_password,
        config.app_name(),
        config.package_id(),
    );

    tokio::fs::write(&path, body)
        .await
        .fs_context("writing", &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildConfigBuilder, Platform};

    fn config(name: &str, package: &str) -> BuildConfig {
        BuildConfigBuilder::new()
            .app_name(name)
            .description("d")
            .version("1.0.0")
            .build_number(1)
            .package_id(package)
            .web_url("https://example.com")
            .platforms([Platform::Android])
            .build()
            .unwrap()
    }

    #[test]
    fn passwords_are_alphanumeric_and_distinct() {
        let a = generate_password(16);
        let b = generate_password(16);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn dname_uses_capitalised_org_and_escapes_commas() {
        let dname = distinguished_name(&config("Shop, Inc", "com.acme.shop"));
        assert_eq!(
            dname,
            "CN=Shop\\, Inc, OU=Mobile, O=Acme, L=Unknown, ST=Unknown, C=US"
        );
    }

    #[test]
    fn dname_org_defaults_when_package_has_one_segment() {
        let dname = distinguished_name(&config("Solo", "solo"));
        assert!(dname.contains("O=Example,"));
    }

    #[tokio::test]
    async fn missing_keytool_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let credential = generate_keystore(
            Path::new("/nonexistent/keytool"),
            &dir.path().join("keystore"),
            &config("App", "com.app.x"),
        )
        .await;
        assert!(credential.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn writes_keystore_and_info_record() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let keytool = dir.path().join("keytool");
        // Creates the file named after -keystore.
        std::fs::write(
            &keytool,
            "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-keystore\" ]; then echo key > \"$2\"; fi\n  shift\ndone\n",
        )
        .unwrap();
        std::fs::set_permissions(&keytool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let credential = generate_keystore(&keytool, &dir.path().join("keystore"), &config("App", "com.app.x"))
            .await
            .unwrap();

        assert!(credential.keystore_path.is_file());
        assert_eq!(credential.key_alias, "release");
        assert_eq!(credential.store_password, credential.key_password);
        let info = std::fs::read_to_string(credential.info_path.unwrap()).unwrap();
        assert!(info.contains(&format!("Keystore Password: {}", credential.store_password)));
        assert!(info.contains("IMPORTANT"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn keytool_failure_is_soft() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let keytool = dir.path().join("keytool");
        std::fs::write(&keytool, "#!/bin/sh\necho 'bad dname' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&keytool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let credential =
            generate_keystore(&keytool, &dir.path().join("keystore"), &config("App", "com.app.x")).await;
        assert!(credential.is_none());
    }
}
