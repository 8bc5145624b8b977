//! Subcommand implementations.

pub mod build;
pub mod doctor;
pub mod project;
