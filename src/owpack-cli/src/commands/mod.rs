//! Command implementations

pub mod anim;
pub mod chunk;
pub mod configure;
pub mod extract;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Pretty-print `value` as JSON to `output`, or stdout when none is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
