use crate::services::lifecycle::content_types_with_slug;
use crate::Config;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let types = content_types_with_slug(&config.schema);

    if types.is_empty() {
        println!("No content types with a slug field");
        return Ok(());
    }

    println!("\n  {:<36} {:<24} {:<8} {:<8} {}", "UID", "Name", "title", "name", "Slugs");
    println!("  {}", "-".repeat(88));
    for ct in types {
        let generation = if !config.slugs.enabled {
            "off"
        } else if config.slugs.is_enabled_for(&ct.uid) {
            "on"
        } else {
            "off (type)"
        };
        println!(
            "  {:<36} {:<24} {:<8} {:<8} {}",
            ct.uid,
            ct.display_name,
            yes_no(ct.has_title_field),
            yes_no(ct.has_name_field),
            generation
        );
    }
    println!();

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
