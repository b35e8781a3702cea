//! OCR backend availability report.

use console::style;

use crate::config::Settings;
use crate::ocr::all_backends;

pub fn cmd_ocr_check(settings: &Settings) -> anyhow::Result<()> {
    println!("{} OCR backends", style("→").cyan());

    for backend in all_backends(&settings.ocr) {
        let backend_type = backend.backend_type();
        let marker = if backend_type == settings.ocr.backend {
            " (configured)"
        } else {
            ""
        };
        if backend.is_available() {
            println!("  {} {}{}", style("✓").green(), backend_type, marker);
        } else {
            println!(
                "  {} {}{}: {}",
                style("✗").red(),
                backend_type,
                marker,
                backend.availability_hint()
            );
        }
    }

    Ok(())
}
