use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Extract issues from a public GitLab project into reports", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch issues and write reports
    Extract {
        #[command(flatten)]
        args: commands::extract::ExtractArgs,
    },

    /// Show the newest report of one format
    Latest {
        /// Root directory for reports
        #[arg(long, default_value = glean::paths::DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Report format: json, csv, markdown or summary
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Extract { args } => commands::extract::execute(args)?,
        Commands::Latest { output_dir, format } => commands::latest::execute(&output_dir, &format)?,
    };

    Ok(ExitCode::from(code))
}
