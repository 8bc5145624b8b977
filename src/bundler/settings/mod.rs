//! Runtime configuration for the build service.
//!
//! Directory layout, size limits and the external toolchain, constructed
//! with [`SettingsBuilder`].

mod builder;
mod core;
mod toolchain;

pub use builder::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_WEBHOOK_TIMEOUT, SettingsBuilder};
pub use core::Settings;
pub use toolchain::ToolchainSettings;
