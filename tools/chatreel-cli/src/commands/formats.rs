//! List export format presets.

use chatreel_script_model::format::{ExportFormat, DEFAULT_PRESET};

pub fn run() -> anyhow::Result<()> {
    println!("Export format presets:");
    println!();
    for (key, format) in ExportFormat::presets() {
        let marker = if key == DEFAULT_PRESET { " (default)" } else { "" };
        println!(
            "  {key:<16} {:<24} {}x{} .{}{marker}",
            format.name,
            format.width,
            format.height,
            format.container.file_extension()
        );
    }
    println!();
    println!("Use: chatreel export --format <PRESET> [--width W --height H]");
    Ok(())
}
