//! Animation dump command

use anyhow::{Context, Result};
use owpack::Animation;
use std::path::Path;

pub fn handle(input: &Path, output: Option<&Path>, keyframes_only: bool) -> Result<()> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    // Keyframes alone never touch the bone list
    if keyframes_only {
        let keyframes = owpack::decode_animation(&data)
            .with_context(|| format!("Failed to decode animation {}", input.display()))?;
        tracing::info!(keyframes = keyframes.len(), "Decoded {}", input.display());
        return super::write_json(&keyframes, output);
    }

    let animation = Animation::parse(&data)
        .with_context(|| format!("Failed to decode animation {}", input.display()))?;

    tracing::info!(
        fps = animation.header.fps,
        bones = animation.header.bone_count,
        keyframes = animation.keyframes.len(),
        "Decoded {}",
        input.display()
    );

    super::write_json(&animation, output)
}
