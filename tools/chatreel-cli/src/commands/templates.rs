//! List built-in conversation templates.

use chatreel_script_model::templates;

pub fn run() -> anyhow::Result<()> {
    println!("Built-in conversation templates:");
    println!();
    for (name, description) in templates::TEMPLATE_KEYS.iter().copied() {
        let conversation = templates::by_name(name)
            .ok_or_else(|| anyhow::anyhow!("Template table is out of sync for: {name}"))?;
        println!(
            "  {name:<10} {description} ({} messages)",
            conversation.messages.len()
        );
    }
    println!();
    println!("Use: chatreel export --template <NAME>");
    Ok(())
}
