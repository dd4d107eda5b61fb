//! `glean latest`: find the newest artifact and describe it.

use anyhow::{Context, Result};
use std::path::Path;

use glean::export::{self, OutputFormat};

pub fn execute(output_dir: &Path, format: &str) -> Result<u8> {
    let format: OutputFormat = format.parse()?;

    let latest = export::latest_artifact(output_dir, format)
        .with_context(|| format!("Failed to scan {}", output_dir.display()))?;

    let Some(path) = latest else {
        println!(
            "❌ No {} artifacts under {}",
            format,
            output_dir.display()
        );
        return Ok(1);
    };

    println!("📄 {}", path.display());

    if format == OutputFormat::Json {
        let issues = export::load_snapshot(&path)?;
        let comments: usize = issues.iter().map(|i| i.comments.len()).sum();
        println!("  Issues: {}", issues.len());
        println!("  Comments: {}", comments);
    }

    Ok(0)
}
