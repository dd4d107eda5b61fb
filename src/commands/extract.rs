//! `glean extract`: run one extraction and write reports.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use glean::comments::CommentPolicy;
use glean::config::{self, ConfigError, RunConfig};
use glean::export::Stats;
use glean::extract::{self, RunReport, RunStatus};

const CONSOLE_TOP: usize = 5;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Project path, e.g. group/subgroup/project
    #[arg(short, long)]
    project: Option<String>,

    /// Instance root (default: https://gitlab.com)
    #[arg(long)]
    base_url: Option<String>,

    /// Issue state: opened, closed or all
    #[arg(short, long)]
    state: Option<String>,

    /// Maximum number of pages to fetch
    #[arg(short = 'n', long)]
    pages: Option<u32>,

    /// Seconds to wait between page requests
    #[arg(short, long)]
    delay: Option<f64>,

    /// Exact labels sent to the API (comma-separated, any match)
    #[arg(long)]
    labels: Option<String>,

    /// Keep issues with a label containing one of these (comma-separated)
    #[arg(long)]
    include_labels: Option<String>,

    /// Drop issues with a label containing one of these (comma-separated)
    #[arg(long)]
    exclude_labels: Option<String>,

    /// Output formats: json, csv, markdown, summary or all (comma-separated)
    #[arg(short, long)]
    output: Option<String>,

    /// Root directory for reports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File name prefix (default: gitlab-issues)
    #[arg(short, long)]
    filename: Option<String>,

    /// Fetch discussion threads for issues that have notes
    #[arg(long)]
    include_comments: bool,

    /// Never fetch discussion threads (wins over --include-comments)
    #[arg(long)]
    no_comments: bool,

    /// CSV description preview length in characters
    #[arg(long)]
    preview_len: Option<usize>,

    /// Exit with status 2 when the walk aborted on a network error
    #[arg(long)]
    strict: bool,

    /// Config file (default: ./glean.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ExtractArgs {
    /// Layer flags over a config built from defaults and the config file.
    pub fn apply(&self, mut run: RunConfig) -> Result<RunConfig, ConfigError> {
        if let Some(project) = &self.project {
            run.project = project.trim().to_string();
        }
        if let Some(base_url) = &self.base_url {
            run.base_url = base_url.trim().to_string();
        }
        if let Some(state) = &self.state {
            run.state = state.parse()?;
        }
        if let Some(pages) = self.pages {
            run.max_pages = pages;
        }
        if let Some(delay) = self.delay {
            run.page_delay = config::delay_from_secs(delay)?;
        }
        if let Some(labels) = &self.labels {
            run.labels.server = config::split_list(labels);
        }
        if let Some(include) = &self.include_labels {
            run.labels.include = config::split_list(include);
        }
        if let Some(exclude) = &self.exclude_labels {
            run.labels.exclude = config::split_list(exclude);
        }
        if let Some(output) = &self.output {
            run.formats = config::parse_formats(output)?;
        }
        if let Some(dir) = &self.output_dir {
            run.output_dir = dir.clone();
        }
        if let Some(prefix) = self.filename.as_deref().map(str::trim) {
            run.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        }
        if self.include_comments {
            run.comments = CommentPolicy::FetchAll;
        }
        if self.no_comments {
            run.comments = CommentPolicy::SkipAll;
        }
        if let Some(len) = self.preview_len {
            run.preview_len = len;
        }
        Ok(run)
    }
}

pub fn execute(args: ExtractArgs) -> Result<u8> {
    let file = config::load_file(args.config.as_deref())?;
    let run = args.apply(file.into_run_config()?)?;
    run.validate()?;

    log_settings(&run);
    println!("🚀 Extracting issues from {} ...", run.project);

    let report = extract::execute(&run).context("Failed to set up the HTTP client")?;
    print_report(&report);

    Ok(report.exit_code(args.strict))
}

fn log_settings(run: &RunConfig) {
    log::info!("Project: {} @ {}", run.project, run.base_url);
    log::info!(
        "State: {} | pages: {} | delay: {:?}",
        run.state,
        run.max_pages,
        run.page_delay
    );
    log::info!("Comments: {:?}", run.comments);
    log::info!(
        "Formats: {} -> {}",
        run.formats
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        run.output_dir.display()
    );
    if let Some(labels) = run.labels.server_param() {
        log::info!("API labels: {}", labels);
    }
    if run.labels.is_local_active() {
        log::info!(
            "Include: {:?} | exclude: {:?}",
            run.labels.include,
            run.labels.exclude
        );
    }
}

fn print_report(report: &RunReport) {
    let outcome = &report.outcome;

    if let Some(error) = outcome.abort_error() {
        println!("⚠️  Walk stopped early: {}", error);
    }

    if report.status() == RunStatus::Empty {
        println!("❌ No issues extracted.");
        return;
    }

    let stats = Stats::collect(&outcome.issues);

    println!("\n📊 Extraction summary");
    println!("  Total issues: {}", stats.total);
    println!("  By state: {}", join_counts(&stats.by_state));
    println!(
        "  Top {} authors: {}",
        CONSOLE_TOP,
        join_counts(stats.top_authors(CONSOLE_TOP))
    );
    if !stats.labels.is_empty() {
        println!(
            "  Top {} labels: {}",
            CONSOLE_TOP,
            join_counts(stats.top_labels(CONSOLE_TOP))
        );
    }
    println!("  Pages fetched: {}", outcome.pages_fetched);
    match outcome.stop_reason() {
        Some(reason) => println!("  Stopped: {}", reason),
        None => println!("  Stopped: aborted"),
    }
    if outcome.filtered_out > 0 {
        println!("  Filtered out: {}", outcome.filtered_out);
    }
    if !outcome.duplicates.is_empty() {
        println!("  Duplicates skipped: {:?}", outcome.duplicates);
    }
    if !outcome.comment_failures.is_empty() {
        let iids: Vec<u64> = outcome.comment_failures.iter().map(|f| f.iid).collect();
        println!("  Comment fetch failures: {:?}", iids);
    }

    println!("\n📁 Files written:");
    for path in report.artifacts() {
        println!("  • {}", path.display());
    }
    for failed in report.export_failures() {
        if let Err(e) = &failed.outcome {
            println!("  ❌ {}: {}", failed.format, e);
        }
    }

    match report.status() {
        RunStatus::Partial => println!("\n⚠️  Partial extraction: {} issues", stats.total),
        _ => println!("\n✅ Extraction complete: {} issues", stats.total),
    }
}

fn join_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}
