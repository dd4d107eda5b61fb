//! Internal implementation for config module
//!
//! Handles glean.toml. Every section is optional and falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{
    delay_from_secs, parse_formats, ConfigError, RunConfig, StateFilter, DEFAULT_FORMATS,
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_SECS, DEFAULT_PREVIEW_LEN,
};
use crate::client::DEFAULT_BASE_URL;
use crate::comments::CommentPolicy;
use crate::filter::LabelFilter;
use crate::paths;

// =============================================================================
// Config Types
// =============================================================================

/// Contents of glean.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub walk: WalkSection,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub comments: CommentsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Instance root
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Project path (group/project)
    #[serde(default)]
    pub project: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalkSection {
    #[serde(default)]
    pub state: StateFilter,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Seconds between page requests
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
    /// Server-side label names
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}
fn default_delay_secs() -> f64 {
    DEFAULT_PAGE_DELAY_SECS
}

impl Default for WalkSection {
    fn default() -> Self {
        Self {
            state: StateFilter::default(),
            max_pages: default_max_pages(),
            delay_secs: default_delay_secs(),
            labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub include_labels: Vec<String>,
    #[serde(default)]
    pub exclude_labels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Format names, same vocabulary as --output
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
}

fn default_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_OUTPUT_DIR)
}
fn default_formats() -> Vec<String> {
    super::split_list(DEFAULT_FORMATS)
}
fn default_preview_len() -> usize {
    DEFAULT_PREVIEW_LEN
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            formats: default_formats(),
            prefix: None,
            preview_len: default_preview_len(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsSection {
    #[serde(default)]
    pub enabled: bool,
}

// =============================================================================
// Conversion
// =============================================================================

impl FileConfig {
    /// Resolve into a run configuration. The project may still be empty;
    /// `RunConfig::validate` checks that once CLI flags are applied.
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let formats = parse_formats(&self.output.formats.join(","))?;

        Ok(RunConfig {
            base_url: self.source.base_url,
            project: self.source.project.unwrap_or_default(),
            state: self.walk.state,
            max_pages: self.walk.max_pages,
            page_delay: delay_from_secs(self.walk.delay_secs)?,
            labels: LabelFilter {
                server: clean(self.walk.labels),
                include: clean(self.filter.include_labels),
                exclude: clean(self.filter.exclude_labels),
            },
            comments: if self.comments.enabled {
                CommentPolicy::FetchAll
            } else {
                CommentPolicy::SkipAll
            },
            formats,
            output_dir: self.output.dir,
            prefix: self.output.prefix.filter(|p| !p.trim().is_empty()),
            preview_len: self.output.preview_len,
        })
    }
}

fn clean(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub(super) fn read(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
