//! Command line argument parsing.
//!
//! Every setting has a flag with an environment fallback so the same binary
//! works from a shell and from a service unit.

use crate::{
    bundler::{Settings, SettingsBuilder},
    error::{CliError, Result},
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::{Map, Value};
use std::{path::PathBuf, time::Duration};

/// WebView app builder
#[derive(Parser, Debug)]
#[command(
    name = "swab",
    version,
    about = "Builds WebView wrapper apps for several platforms from one configuration",
    long_about = "Builds WebView wrapper apps for several platforms from one configuration.

Usage:
  swab build --app-name Shop --app-description 'Shop app' --app-version 1.0.0 \\
             --build-number 1 --package-name com.shop.app --web-url https://shop.example.com \\
             --platforms android,web
  swab save --config shop.json --icon icon.png
  swab open Shop_v1.0.0_1.swab
  swab doctor

Exit code 0 = build completed, 1 = build or command failed, 3 = project file from another machine."
)]
pub struct Args {
    /// Installation directory holding uploads, builds and templates
    #[arg(long, env = "SWAB_BASE_DIR", value_name = "DIR", default_value = ".", global = true)]
    pub base_dir: PathBuf,

    /// Project template copied into every build
    #[arg(long, env = "SWAB_TEMPLATE_DIR", value_name = "DIR", global = true)]
    pub template_dir: Option<PathBuf>,

    /// Flutter executable
    #[arg(long, env = "SWAB_FLUTTER", value_name = "PATH", global = true)]
    pub flutter: Option<PathBuf>,

    /// Dart executable
    #[arg(long, env = "SWAB_DART", value_name = "PATH", global = true)]
    pub dart: Option<PathBuf>,

    /// JDK keytool executable
    #[arg(long, env = "SWAB_KEYTOOL", value_name = "PATH", global = true)]
    pub keytool: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the app and wait for the result
    Build(BuildArgs),
    /// Save a configuration as an encrypted project file
    Save(SaveArgs),
    /// Open a project file and print its configuration
    Open(OpenArgs),
    /// Report which external tools resolve
    Doctor,
}

#[derive(ClapArgs, Debug, Default)]
pub struct BuildArgs {
    /// JSON configuration; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub app_name: Option<String>,

    #[arg(long)]
    pub app_description: Option<String>,

    #[arg(long)]
    pub app_version: Option<String>,

    #[arg(long)]
    pub build_number: Option<u64>,

    #[arg(long)]
    pub package_name: Option<String>,

    #[arg(long)]
    pub web_url: Option<String>,

    /// Target platforms: android, android-bundle, ios, web, macos, windows, linux
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub platforms: Vec<String>,

    /// Launcher icon
    #[arg(long, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// Existing release keystore
    #[arg(long, value_name = "FILE")]
    pub keystore: Option<PathBuf>,

    #[arg(long, requires = "keystore")]
    pub keystore_password: Option<String>,

    #[arg(long, requires = "keystore")]
    pub key_alias: Option<String>,

    #[arg(long, requires = "keystore")]
    pub key_password: Option<String>,

    /// URL notified when the build finishes
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Status poll interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,
}

#[derive(ClapArgs, Debug)]
pub struct SaveArgs {
    /// JSON configuration to save
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Icon to embed
    #[arg(long, value_name = "FILE")]
    pub icon: Option<PathBuf>,

    /// Keystore to embed
    #[arg(long, value_name = "FILE")]
    pub keystore: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct OpenArgs {
    /// Project file (.swab)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write the configuration here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Service settings from the global flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut builder = SettingsBuilder::new().base_dir(&self.base_dir);
        if let Some(dir) = &self.template_dir {
            builder = builder.template_dir(dir);
        }
        if let Some(flutter) = &self.flutter {
            builder = builder.flutter(flutter);
        }
        if let Some(dart) = &self.dart {
            builder = builder.dart(dart);
        }
        if let Some(keytool) = &self.keytool {
            builder = builder.keytool(keytool);
        }
        Ok(builder.build()?)
    }
}

impl BuildArgs {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(50))
    }

    /// Submission document: the config file, overridden by flags.
    pub fn to_payload(&self) -> Result<Value> {
        let mut map = match &self.config {
            Some(path) => read_object(path)?,
            None => Map::new(),
        };

        let strings = [
            ("app_name", &self.app_name),
            ("app_description", &self.app_description),
            ("app_version", &self.app_version),
            ("package_name", &self.package_name),
            ("web_url", &self.web_url),
            ("keystore_password", &self.keystore_password),
            ("key_alias", &self.key_alias),
            ("key_password", &self.key_password),
            ("webhook_url", &self.webhook_url),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                map.insert(key.into(), Value::String(value.clone()));
            }
        }
        if let Some(build_number) = self.build_number {
            map.insert("build_number".into(), build_number.into());
        }
        if !self.platforms.is_empty() {
            map.insert("platforms".into(), self.platforms.clone().into());
        }
        for (key, path) in [("icon_path", &self.icon), ("keystore_path", &self.keystore)] {
            if let Some(path) = path {
                map.insert(key.into(), Value::String(path.display().to_string()));
            }
        }

        Ok(Value::Object(map))
    }
}

impl SaveArgs {
    pub fn to_payload(&self) -> Result<Value> {
        let mut map = read_object(&self.config)?;
        for (key, path) in [("icon_path", &self.icon), ("keystore_path", &self.keystore)] {
            if let Some(path) = path {
                map.insert(key.into(), Value::String(path.display().to_string()));
            }
        }
        Ok(Value::Object(map))
    }
}

fn read_object(path: &std::path::Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str(&text)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::InvalidArguments {
            reason: format!("{} must contain a JSON object", path.display()),
        }
        .into()),
    }
}
