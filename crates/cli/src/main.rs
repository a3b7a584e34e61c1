use anyhow::Result;
use clap::{Parser, Subcommand};
use kernel_survey::commands::{
    init_project_command, project_info_command, report_command, scan_command, ReportOptions,
};
use tracing_subscriber::EnvFilter;

/// Kernel signature survey and benchmark report CLI.
///
/// This CLI is a thin wrapper around `survey-core` (exposed in code as `survey_core`).
/// It discovers source files and benchmark logs, hands them to the core, and
/// writes the resulting report artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "kernel-survey",
    version,
    about = "Extract tagged kernel signatures and correlate them with benchmark logs",
    long_about = None
)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new survey project at the given root.
    ///
    /// This will:
    /// - Create a `.kernel-survey` metadata directory.
    /// - Create `logs` and `reports` directories.
    /// - Write a `.kernel-survey/survey.json` config file.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing survey project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Extract tagged kernel signatures and print the registry.
    Scan {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Source file or directory to scan (repeatable). Overrides the config.
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan sources and logs, then write the summary, CSV and JSON reports.
    Report {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Explicit config file (YAML or JSON). Defaults to the project config.
        #[arg(long)]
        config: Option<String>,

        /// Source file or directory to scan (repeatable). Overrides the config.
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Log artifact as SOURCE:PRECISION:PATH (repeatable). Disables log discovery.
        #[arg(long = "log")]
        logs: Vec<String>,

        /// Print the report as JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Initialize the tracing subscriber on stderr.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Scan { root, sources, json } => scan_command(&root, &sources, json)?,
        Command::Report { root, config, sources, logs, json } => {
            report_command(&ReportOptions { root, config, sources, logs, json })?;
        }
    }

    Ok(())
}
