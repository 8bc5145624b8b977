//! SWAB - WebView app builder.
//!
//! This binary submits builds, saves and opens project files and checks the
//! external toolchain.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging; LOG_LEVEL applies when RUST_LOG is unset
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_lowercase()))
        .init();

    // Run CLI and get exit code
    let exit_code = match swab::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
