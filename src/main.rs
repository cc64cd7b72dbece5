//! `deps-analyzer`: unpack Maven project archives, list their dependency
//! trees and collect the third-party license files the build generates.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]); `MAVEN_HOME` is read here and nowhere else.
//! 2. Initialise logging ([`logging`]) and load config ([`config::load_config`]).
//! 3. Run the requested command ([`commands`]): the archive pipelines live in
//!    [`pipeline`], built from [`archive`], [`descriptor`], [`invoker`],
//!    [`scraper`] and [`materializer`]; repository commands use [`git`].
//! 4. Render the result ([`report`]) and exit `0` on success, `1` otherwise.

mod archive;
mod cli;
mod commands;
mod config;
mod descriptor;
mod error;
mod git;
mod invoker;
mod logging;
mod materializer;
mod models;
mod pipeline;
mod report;
mod scraper;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, Command, ReportFormat};
use commands::CommandResult;
use config::load_config;
use logging::{init_logging, level_for};
use pipeline::Pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_json, level_for(cli.verbose, cli.quiet));

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let maven_home = config.maven_home(cli.maven_home.as_deref());

    let result = run(&cli, &config, maven_home).await?;

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&result, cli.verbose, cli.quiet),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}

async fn run(
    cli: &Cli,
    config: &config::Config,
    maven_home: Option<std::path::PathBuf>,
) -> Result<CommandResult> {
    let pipeline = Pipeline::from_config(config, maven_home)?;
    let hidden = cli.quiet || cli.report == ReportFormat::Json || !cli.command.runs_maven();
    let spinner = spinner(hidden)?;
    let mut on_line = |line: &str| {
        if let Some(pb) = &spinner {
            pb.set_message(line.to_string());
        }
    };

    let result = match &cli.command {
        Command::ListDependenciesDir { directory } => {
            commands::list_dependencies_dir(&pipeline, directory, &mut on_line).await
        }
        Command::ListDependenciesZip { zipfile, directory } => {
            commands::list_dependencies_zip(&pipeline, zipfile, directory, &mut on_line).await
        }
        Command::ListLicensesZip { zipfile, directory } => {
            commands::list_licenses_zip(&pipeline, zipfile, directory, &mut on_line).await
        }
        Command::Clone { url, directory } => commands::clone(url, directory),
        Command::ListBranches { directory } => commands::list_branches(directory),
        Command::ListCommits { directory, branch } => commands::list_commits(directory, branch),
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(result)
}

/// Spinner showing the latest Maven output line.
fn spinner(hidden: bool) -> Result<Option<ProgressBar>> {
    if hidden {
        return Ok(None);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")?,
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Ok(Some(pb))
}
