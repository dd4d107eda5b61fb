//! Run configuration.
//!
//! One immutable `RunConfig` is built before a run starts and passed by
//! reference to every stage. Nothing in the pipeline stores settings on
//! shared objects.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `glean.toml`, then CLI flags (applied by the command layer).
//!
//! # Example
//!
//! ```no_run
//! use glean::config;
//! use std::path::Path;
//!
//! let file = config::load_file(Some(Path::new("glean.toml")))?;
//! let mut run = file.into_run_config()?;
//! run.project = "group/project".to_string();
//! run.validate()?;
//! # Ok::<(), glean::config::ConfigError>(())
//! ```

mod internal;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::client::DEFAULT_BASE_URL;
use crate::comments::CommentPolicy;
use crate::export::OutputFormat;
use crate::filter::LabelFilter;
use crate::paths;

pub use internal::{
    CommentsSection, FileConfig, FilterSection, OutputSection, SourceSection, WalkSection,
};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "glean.toml";

pub const DEFAULT_MAX_PAGES: u32 = 5;
pub const DEFAULT_PAGE_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_PREVIEW_LEN: usize = 200;
pub const DEFAULT_FORMATS: &str = "json,summary";

/// Which issues to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    Opened,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Opened => "opened",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

impl FromStr for StateFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opened" => Ok(StateFilter::Opened),
            "closed" => Ok(StateFilter::Closed),
            "all" => Ok(StateFilter::All),
            other => Err(ConfigError::UnknownState(other.to_string())),
        }
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one run needs, fixed before the first request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Instance root, e.g. `https://gitlab.com`.
    pub base_url: String,
    /// Full project path, e.g. `group/subgroup/project`.
    pub project: String,
    pub state: StateFilter,
    /// Upper bound on pages fetched. 0 fetches nothing.
    pub max_pages: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    pub labels: LabelFilter,
    pub comments: CommentPolicy,
    pub formats: Vec<OutputFormat>,
    pub output_dir: PathBuf,
    /// Artifact name prefix; `gitlab-issues` when unset.
    pub prefix: Option<String>,
    /// CSV description preview bound, in characters.
    pub preview_len: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: String::new(),
            state: StateFilter::default(),
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: Duration::from_secs_f64(DEFAULT_PAGE_DELAY_SECS),
            labels: LabelFilter::default(),
            comments: CommentPolicy::SkipAll,
            formats: vec![OutputFormat::Json, OutputFormat::Summary],
            output_dir: PathBuf::from(paths::DEFAULT_OUTPUT_DIR),
            prefix: None,
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl RunConfig {
    /// Checks that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::MissingProject);
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no project path given (use --project or [source] project)")]
    MissingProject,

    #[error("base URL is empty")]
    MissingBaseUrl,

    #[error("unknown output format `{0}` (expected json, csv, markdown, summary or all)")]
    UnknownFormat(String),

    #[error("unknown issue state `{0}` (expected opened, closed or all)")]
    UnknownState(String),

    #[error("invalid delay `{0}` seconds")]
    InvalidDelay(f64),

    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Split a comma-separated flag value, trimming and dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `json,csv,...`; `all` expands to every format. Order is kept,
/// duplicates are dropped.
pub fn parse_formats(value: &str) -> Result<Vec<OutputFormat>, ConfigError> {
    let mut formats = Vec::new();
    for name in split_list(value) {
        if name.eq_ignore_ascii_case("all") {
            return Ok(OutputFormat::ALL.to_vec());
        }
        let format: OutputFormat = name.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Non-negative, finite seconds -> `Duration`.
pub fn delay_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDelay(secs))
}

/// Load the config file.
///
/// With an explicit path the file must exist. Without one, `./glean.toml`
/// is used when present and defaults otherwise.
pub fn load_file(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    match path {
        Some(path) => internal::read(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                internal::read(default)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}
