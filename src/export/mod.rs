//! Output artifacts for one run.
//!
//! "Do X": Turn the accumulated issue sequence into files.
//!
//! Four independent renderers (JSON, CSV, detailed Markdown, summary
//! Markdown). Each is a pure function of the issues plus `ExportOptions`;
//! `write_all` writes the selected ones and keeps going when one fails.
//! A file is either fully written (temp file + rename) or reported failed.
//!
//! # Example
//!
//! ```ignore
//! use glean::export::{self, ExportOptions, OutputFormat, RunStamp};
//!
//! let opts = ExportOptions { stamp: RunStamp::now(), prefix: None, preview_len: 200 };
//! for result in export::write_all(&OutputFormat::ALL, &issues, &opts, Path::new("reports")) {
//!     println!("{:?}: {:?}", result.format, result.outcome);
//! }
//! ```

mod json;
mod markdown;
mod summary;
mod tabular;

pub use summary::Stats;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use log::{error, info};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::model::Issue;
use crate::paths;

/// One artifact kind. Each gets its own directory under the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Csv,
    Markdown,
    Summary,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Json,
        OutputFormat::Csv,
        OutputFormat::Markdown,
        OutputFormat::Summary,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Summary => "summary",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown | OutputFormat::Summary => "md",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Local wall-clock time a run started. Artifact names use its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp(NaiveDateTime);

impl RunStamp {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    pub fn at(time: NaiveDateTime) -> Self {
        Self(time)
    }

    /// `YYYY-MM-DD`, used in file names.
    pub fn date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM-DD HH:MM:SS`, used in report headers.
    pub fn display(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Inputs every renderer shares besides the issues.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions<'a> {
    pub stamp: RunStamp,
    pub prefix: Option<&'a str>,
    /// CSV description preview bound, in characters.
    pub preview_len: usize,
}

impl<'a> ExportOptions<'a> {
    pub fn for_run(config: &'a RunConfig, stamp: RunStamp) -> Self {
        Self {
            stamp,
            prefix: config.prefix.as_deref(),
            preview_len: config.preview_len,
        }
    }
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("failed to encode JSON")]
    Json(#[source] serde_json::Error),

    #[error("failed to encode CSV")]
    Csv(#[source] csv::Error),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read snapshot {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {} is not an issue list", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of one exporter within `write_all`.
#[derive(Debug)]
pub struct ExportResult {
    pub format: OutputFormat,
    pub outcome: Result<PathBuf, SerializationError>,
}

/// Render one artifact in memory.
pub fn render(
    format: OutputFormat,
    issues: &[Issue],
    opts: &ExportOptions,
) -> Result<Vec<u8>, SerializationError> {
    match format {
        OutputFormat::Json => json::render(issues).map_err(SerializationError::Json),
        OutputFormat::Csv => tabular::render(issues, opts.preview_len).map_err(SerializationError::Csv),
        OutputFormat::Markdown => Ok(markdown::render(issues, &opts.stamp).into_bytes()),
        OutputFormat::Summary => Ok(summary::render(issues, &opts.stamp).into_bytes()),
    }
}

/// Render and write one artifact, creating its directory if needed.
pub fn write(
    format: OutputFormat,
    issues: &[Issue],
    opts: &ExportOptions,
    output_dir: &Path,
) -> Result<PathBuf, SerializationError> {
    let bytes = render(format, issues, opts)?;
    let path = paths::artifact_path(output_dir, format, opts.prefix, &opts.stamp.date());
    write_whole(&path, &bytes)?;
    Ok(path)
}

/// Write every selected format. One failure never stops the others.
pub fn write_all(
    formats: &[OutputFormat],
    issues: &[Issue],
    opts: &ExportOptions,
    output_dir: &Path,
) -> Vec<ExportResult> {
    formats
        .iter()
        .map(|&format| {
            let outcome = write(format, issues, opts, output_dir);
            match &outcome {
                Ok(path) => info!("Saved {} to {}", format, path.display()),
                Err(e) => error!("Failed to save {}: {}", format, e),
            }
            ExportResult { format, outcome }
        })
        .collect()
}

/// Write to a sibling temp file, then rename over the target.
fn write_whole(path: &Path, bytes: &[u8]) -> Result<(), SerializationError> {
    let wrap = |source| SerializationError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    // A failed write or rename never leaves the temp file behind.
    if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(wrap(e));
    }
    Ok(())
}

/// Most recently modified artifact of `format` under `output_dir`.
pub fn latest_artifact(output_dir: &Path, format: OutputFormat) -> io::Result<Option<PathBuf>> {
    let dir = paths::format_dir(output_dir, format);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Load a JSON artifact back into issues.
pub fn load_snapshot(path: &Path) -> Result<Vec<Issue>, SerializationError> {
    let contents = fs::read_to_string(path).map_err(|source| SerializationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SerializationError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// RFC 3339 or `-` when absent.
fn timestamp(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
}

/// Collapse whitespace runs and cut at `limit` characters with `...`.
fn condense(text: &str, limit: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > limit {
        let mut cut: String = flat.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;
    use chrono::NaiveDate;
    use serde_json::json;

    fn stamp() -> RunStamp {
        RunStamp::at(
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    fn issues() -> Vec<Issue> {
        vec![normalize::issue(&json!({
            "id": 1, "iid": 1, "title": "Ação necessária", "state": "opened",
            "labels": ["bug"], "author": { "name": "Zoë", "username": "zoe" }
        }))]
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_stamp_formats() {
        assert_eq!(stamp().date(), "2024-05-01");
        assert_eq!(stamp().display(), "2024-05-01 09:30:00");
    }

    #[test]
    fn test_write_all_reports_each_exporter() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExportOptions {
            stamp: stamp(),
            prefix: Some("demo"),
            preview_len: 200,
        };

        let results = write_all(&OutputFormat::ALL, &issues(), &opts, dir.path());
        assert_eq!(results.len(), 4);
        for result in &results {
            let path = result.outcome.as_ref().unwrap();
            assert!(path.exists(), "{} missing", path.display());
            assert!(path.starts_with(dir.path().join(result.format.dir_name())));
        }
        assert!(dir.path().join("csv/demo-2024-05-01.csv").exists());
        assert!(!dir.path().join("csv/demo-2024-05-01.csv.tmp").exists());
    }

    #[test]
    fn test_one_failing_exporter_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the csv/ directory should be makes that exporter fail.
        fs::write(dir.path().join("csv"), b"in the way").unwrap();
        let opts = ExportOptions {
            stamp: stamp(),
            prefix: None,
            preview_len: 200,
        };

        let results = write_all(&OutputFormat::ALL, &issues(), &opts, dir.path());
        let failed: Vec<OutputFormat> = results
            .iter()
            .filter(|r| r.outcome.is_err())
            .map(|r| r.format)
            .collect();
        assert_eq!(failed, vec![OutputFormat::Csv]);
        assert!(dir.path().join("json/gitlab-issues-2024-05-01.json").exists());
        assert!(dir.path().join("summary/gitlab-issues-2024-05-01.md").exists());
    }

    #[test]
    fn test_same_day_same_prefix_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExportOptions {
            stamp: stamp(),
            prefix: None,
            preview_len: 200,
        };
        write(OutputFormat::Json, &issues(), &opts, dir.path()).unwrap();
        write(OutputFormat::Json, &[], &opts, dir.path()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path().join("json")).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = dir.path().join("json/gitlab-issues-2024-05-01.json");
        assert!(load_snapshot(&path).unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExportOptions {
            stamp: stamp(),
            prefix: None,
            preview_len: 200,
        };
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("json/gitlab-issues-2024-05-01.json");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let err = write(OutputFormat::Json, &issues(), &opts, dir.path()).unwrap_err();
        assert!(matches!(err, SerializationError::Write { .. }));
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("json"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("gitlab-issues-2024-05-01.json")]);
    }

    #[test]
    fn test_latest_artifact_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_artifact(dir.path(), OutputFormat::Json).unwrap(), None);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_issues() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExportOptions {
            stamp: stamp(),
            prefix: None,
            preview_len: 200,
        };
        let path = write(OutputFormat::Json, &issues(), &opts, dir.path()).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), issues());
        assert_eq!(
            latest_artifact(dir.path(), OutputFormat::Json).unwrap(),
            Some(path)
        );
    }

    #[test]
    fn test_condense() {
        assert_eq!(condense("a\n\n b  c", 10), "a b c");
        assert_eq!(condense("abcdef", 3), "abc...");
    }
}
