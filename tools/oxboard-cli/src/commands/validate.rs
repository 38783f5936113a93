//! Validate a mapping profile.

use std::path::PathBuf;

use anyhow::Context;
use oxboard_gesture_model::MappingProfile;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating profile at: {}", path.display());

    let content = std::fs::read_to_string(&path).context("Failed to read profile")?;
    let profile = MappingProfile::from_json(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse profile: {e}"))?;

    println!("  Name: {}", profile.name);
    println!("  Mappings: {}", profile.mappings.len());
    for mapping in &profile.mappings {
        println!(
            "    {} -> {} ({}, priority {}{})",
            mapping.gesture_type.as_str(),
            mapping.control_type.as_str(),
            mapping.id,
            mapping.priority,
            if mapping.enabled { "" } else { ", disabled" }
        );
    }

    let invalid = profile.validate();
    if invalid.is_empty() {
        println!("\nProfile is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    let mut count = 0;
    for (id, issues) in &invalid {
        for issue in issues {
            println!("  - {id}: {issue}");
            count += 1;
        }
    }
    println!(
        "\n{count} issue(s) in {} mapping(s). Invalid mappings will be rejected.",
        invalid.len()
    );

    Ok(())
}
