//! `swab doctor`: external tool resolution report.

use crate::service::SwabService;

/// Prints one line per tool. Exit code 1 when any tool is missing.
pub fn execute(service: &SwabService) -> i32 {
    let statuses = service.doctor();
    for status in &statuses {
        match &status.resolved {
            Some(path) => println!("✓ {:<8} {}", status.name, path.display()),
            None => println!(
                "✗ {:<8} not found ({})",
                status.name,
                status.configured.display()
            ),
        }
    }

    let template = service.settings().template_dir();
    if template.is_dir() {
        println!("✓ template {}", template.display());
    } else {
        println!("✗ template missing ({})", template.display());
    }

    if statuses.iter().all(|s| s.is_available()) && template.is_dir() {
        0
    } else {
        1
    }
}
