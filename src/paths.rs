//! Single source of truth for the output layout.
//!
//! This module defines WHERE artifacts land. It has no I/O, no validation,
//! no business logic.
//!
//! ```text
//! {output-dir}/
//! ├── json/       {prefix}-{YYYY-MM-DD}.json
//! ├── csv/        {prefix}-{YYYY-MM-DD}.csv
//! ├── markdown/   {prefix}-{YYYY-MM-DD}.md
//! └── summary/    {prefix}-{YYYY-MM-DD}.md
//! ```
//!
//! Names depend on the run date and prefix only, so a second run on the
//! same day with the same prefix overwrites the first.

use std::path::{Path, PathBuf};

use crate::export::OutputFormat;

/// Output root when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Artifact prefix when none is configured.
pub const DEFAULT_PREFIX: &str = "gitlab-issues";

/// Directory holding one format's artifacts: `{output_dir}/{format}/`
pub fn format_dir(output_dir: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format.dir_name())
}

/// File name: `{prefix-or-default}-{date}.{ext}`
pub fn artifact_name(format: OutputFormat, prefix: Option<&str>, date: &str) -> String {
    format!(
        "{}-{}.{}",
        prefix.unwrap_or(DEFAULT_PREFIX),
        date,
        format.extension()
    )
}

/// Full artifact path for one format.
pub fn artifact_path(
    output_dir: &Path,
    format: OutputFormat,
    prefix: Option<&str>,
    date: &str,
) -> PathBuf {
    format_dir(output_dir, format).join(artifact_name(format, prefix, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let path = artifact_path(Path::new("reports"), OutputFormat::Json, None, "2024-05-01");
        assert_eq!(path, PathBuf::from("reports/json/gitlab-issues-2024-05-01.json"));
    }

    #[test]
    fn test_markdown_formats_share_extension_not_directory() {
        let detailed = artifact_path(Path::new("out"), OutputFormat::Markdown, Some("q2"), "2024-05-01");
        let summary = artifact_path(Path::new("out"), OutputFormat::Summary, Some("q2"), "2024-05-01");
        assert_eq!(detailed, PathBuf::from("out/markdown/q2-2024-05-01.md"));
        assert_eq!(summary, PathBuf::from("out/summary/q2-2024-05-01.md"));
    }
}
