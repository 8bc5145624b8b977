//! Shared helpers for the build pipeline.

pub mod archive;
pub mod fs;
pub mod http;
pub mod process;
