//! Generate synthetic landmark frames.

use std::path::PathBuf;

use anyhow::Context;
use oxboard_gesture_core::synthetic::{self, Pose, SequenceSpec};
use oxboard_gesture_model::{serialize_frames, Point};

pub fn run(
    pose: Pose,
    frames: usize,
    output: PathBuf,
    interval_ms: u64,
    both_hands: bool,
    step_x: f64,
    step_y: f64,
) -> anyhow::Result<()> {
    let mut spec = SequenceSpec::new(pose, frames);
    spec.interval_ms = interval_ms;
    spec.both_hands = both_hands;
    spec.step = Point::new(step_x, step_y);

    let sequence = synthetic::sequence(&spec);
    let jsonl = serialize_frames(&sequence).context("Failed to serialize frames")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    std::fs::write(&output, jsonl).context("Failed to write frames")?;

    tracing::debug!(pose = %pose, frames, "Synthetic frames written");
    println!(
        "Wrote {} {} frame(s) to {}",
        sequence.len(),
        pose,
        output.display()
    );
    println!(
        "  Interval: {interval_ms}ms, hands: {}",
        if both_hands { 2 } else { 1 }
    );

    Ok(())
}
