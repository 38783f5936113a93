//! Replay a landmark recording through the gesture engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use oxboard_common::{AppConfig, OxboardError};
use oxboard_gesture_core::{EngineConfig, GestureEngine};
use oxboard_gesture_model::{parse_frames, MappingProfile};

pub fn run(
    frames_path: PathBuf,
    profile_path: PathBuf,
    app_config: &AppConfig,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&profile_path).context("Failed to read profile")?;
    let profile = MappingProfile::from_json(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse profile: {e}"))?;

    let content = std::fs::read_to_string(&frames_path).context("Failed to read frames")?;
    let frames = parse_frames(&content)
        .map_err(|e| OxboardError::frame(e.to_string()))
        .with_context(|| format!("Failed to parse {}", frames_path.display()))?;

    let mut engine = GestureEngine::new(EngineConfig::from_defaults(&app_config.engine));
    let registered = engine
        .registry_mut()
        .register_profile(&profile)
        .with_context(|| format!("Profile '{}' rejected", profile.id))?;

    if !json {
        println!(
            "Replaying {} frame(s) from {} with profile '{}' ({} mapping(s))",
            frames.len(),
            frames_path.display(),
            profile.name,
            registered
        );
        println!();
    }

    // Frames in which each mapping drove its control.
    let mut driven: BTreeMap<String, usize> = BTreeMap::new();

    for frame in &frames {
        let output = engine.process(frame)?;
        for active in &output.active {
            *driven.entry(active.mapping_id.clone()).or_default() += 1;
        }

        if json {
            println!("{}", serde_json::to_string(&output)?);
            continue;
        }
        if output.skipped || output.active.is_empty() {
            continue;
        }
        let controls = output
            .active
            .iter()
            .map(|a| {
                format!(
                    "{}={:.3}{}",
                    a.control_type.as_str(),
                    a.mapped_value,
                    if a.is_held { "" } else { "*" }
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("  t={:>6}ms  {}", output.timestamp_ms, controls);
    }

    let stats = engine.governor_stats();
    if json {
        tracing::info!(
            frames = stats.frames_seen,
            skipped = stats.frames_skipped,
            cache_hit_rate = stats.cache_hit_rate(),
            "Replay finished"
        );
        return Ok(());
    }

    println!();
    println!("Mappings:");
    for mapping in engine.registry().mappings() {
        println!(
            "  {:<20} active in {} frame(s)",
            mapping.id,
            driven.get(&mapping.id).copied().unwrap_or(0)
        );
    }
    println!();
    println!("Governor:");
    println!(
        "  Frames: {} seen, {} skipped, {} processed",
        stats.frames_seen, stats.frames_skipped, stats.frames_processed
    );
    println!(
        "  Cache: {} hit(s), {} miss(es) ({:.1}%)",
        stats.cache_hits,
        stats.cache_misses,
        stats.cache_hit_rate() * 100.0
    );
    println!("  Pool fallbacks: {}", stats.pool_fallbacks);
    println!("  Avg processing: {:.3}ms", stats.avg_processing_ms);
    println!(
        "  Confidence threshold: {:.2}, skip threshold: {:.2}ms",
        stats.confidence_threshold, stats.skip_threshold_ms
    );

    Ok(())
}
