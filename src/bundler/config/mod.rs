//! Build job configuration.
//!
//! A submission arrives as a [`BuildRequest`], is validated into an
//! immutable [`BuildConfig`], and is never mutated afterwards. Identifiers
//! derived from user input go through [`sanitize_identifier`] first.

mod build_config;
mod builder;
mod features;
mod request;
mod sanitize;

pub use build_config::{BuildConfig, SigningCredential};
pub use builder::BuildConfigBuilder;
pub use features::FeatureToggles;
pub use request::{BuildRequest, ValidationError};
pub use sanitize::{
    escape_dart, escape_double_quoted, escape_xml, sanitize_file_stem, sanitize_identifier,
};
