//! Write a starter conversation script.

use std::path::PathBuf;

use chatreel_script_model::templates;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    if path.exists() {
        return Err(anyhow::anyhow!(
            "Refusing to overwrite existing file: {}",
            path.display()
        ));
    }

    let conversation = templates::starter();
    conversation
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write script: {e}"))?;

    println!("[OK] Starter conversation written to {}", path.display());
    println!(
        "     Edit the script, then run: chatreel export {}",
        path.display()
    );
    Ok(())
}
