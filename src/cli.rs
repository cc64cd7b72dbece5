use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "deps-analyzer",
    about = "Inspect repositories and list Maven dependencies and their licenses",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.deps-analyzer/config.toml, fallback ~/.config/deps-analyzer/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maven installation root
    #[arg(long, env = "MAVEN_HOME", global = true, value_name = "DIR")]
    pub maven_home: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT", global = true)]
    pub report: ReportFormat,

    /// Debug logging and full result tables
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print the status line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List Maven dependencies of a project in a directory
    ListDependenciesDir {
        #[arg(long)]
        directory: PathBuf,
    },

    /// List Maven dependencies of a zipped project
    ListDependenciesZip {
        #[arg(long)]
        zipfile: PathBuf,
        /// Extraction and output directory
        #[arg(long)]
        directory: PathBuf,
    },

    /// Collect third-party license reports of a zipped project
    ListLicensesZip {
        #[arg(long)]
        zipfile: PathBuf,
        /// Extraction and output directory
        #[arg(long)]
        directory: PathBuf,
    },

    /// Clone a git repository
    Clone {
        #[arg(long)]
        url: String,
        #[arg(long)]
        directory: PathBuf,
    },

    /// List the branches of a local repository
    ListBranches {
        #[arg(long)]
        directory: PathBuf,
    },

    /// List the commit messages of a branch
    ListCommits {
        #[arg(long)]
        directory: PathBuf,
        #[arg(long)]
        branch: String,
    },
}

impl Command {
    /// Whether the command drives Maven (and so shows progress).
    pub fn runs_maven(&self) -> bool {
        matches!(
            self,
            Command::ListDependenciesDir { .. }
                | Command::ListDependenciesZip { .. }
                | Command::ListLicensesZip { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
