//! Top-level operations. Each one returns a [`CommandResult`] whose message is
//! what the operator reads; no error escapes this layer.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use crate::git;
use crate::materializer::FailedCopy;
use crate::models::{MaterializedFile, ProjectCoordinates};
use crate::pipeline::{DependencyOutcome, LicenseOutcome, Pipeline};

#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<MaterializedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedCopy>,
}

impl CommandResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            lines: Vec::new(),
            files: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }
}

pub async fn list_dependencies_dir(
    pipeline: &Pipeline,
    directory: &Path,
    on_line: &mut dyn FnMut(&str),
) -> CommandResult {
    match pipeline.dependencies_from_directory(directory, on_line).await {
        Ok(outcome) => dependency_result(outcome),
        Err(e) => {
            error!(error = %e, "Error retrieving Maven dependencies");
            CommandResult::failed(format!("Error retrieving Maven dependencies: {}", e))
        }
    }
}

pub async fn list_dependencies_zip(
    pipeline: &Pipeline,
    zipfile: &Path,
    directory: &Path,
    on_line: &mut dyn FnMut(&str),
) -> CommandResult {
    match pipeline
        .dependencies_from_archive(zipfile, directory, on_line)
        .await
    {
        Ok(outcome) => dependency_result(outcome),
        Err(e) => {
            error!(error = %e, "Error processing the ZIP file");
            CommandResult::failed(format!("Error processing the ZIP file: {}", e))
        }
    }
}

pub async fn list_licenses_zip(
    pipeline: &Pipeline,
    zipfile: &Path,
    directory: &Path,
    on_line: &mut dyn FnMut(&str),
) -> CommandResult {
    match pipeline
        .licenses_from_archive(zipfile, directory, on_line)
        .await
    {
        Ok(outcome) => license_result(outcome, directory),
        Err(e) => {
            error!(error = %e, "Error retrieving Maven dependency licenses");
            CommandResult::failed(format!("Error retrieving Maven dependency licenses: {}", e))
        }
    }
}

pub fn clone(url: &str, directory: &Path) -> CommandResult {
    match git::clone(url, directory) {
        Ok(()) => CommandResult::ok(format!(
            "Repository successfully cloned to: {}",
            directory.display()
        )),
        Err(e) => {
            error!(error = %e, "Error cloning the repository");
            CommandResult::failed(format!("Error cloning the repository: {}", e))
        }
    }
}

pub fn list_branches(directory: &Path) -> CommandResult {
    match git::list_branches(directory) {
        Ok(branches) => CommandResult {
            lines: branches,
            ..CommandResult::ok(format!("Branches of {}", directory.display()))
        },
        Err(e) => {
            error!(error = %e, "Error listing branches");
            CommandResult::failed(format!("Error listing branches: {}", e))
        }
    }
}

pub fn list_commits(directory: &Path, branch: &str) -> CommandResult {
    match git::list_commits(directory, branch) {
        Ok(commits) => CommandResult {
            lines: commits,
            ..CommandResult::ok(format!("Commits of {}", branch))
        },
        Err(e) => {
            error!(error = %e, "Error listing commits");
            CommandResult::failed(format!("Error listing commits: {}", e))
        }
    }
}

fn dependency_result(outcome: DependencyOutcome) -> CommandResult {
    match outcome {
        DependencyOutcome::NoDescriptor { searched } => {
            CommandResult::failed(format!("No pom.xml found in {}", searched.display()))
        }
        DependencyOutcome::ToolFailed {
            descriptor,
            exit_code,
            dump,
        } => {
            let mut message = format!(
                "Error retrieving Maven dependencies (exit code {}) for {}.",
                exit_label(exit_code),
                descriptor.path.display()
            );
            if let Some(dump) = dump {
                message.push_str(&format!(" Maven output saved to: {}", dump.display()));
            }
            CommandResult::failed(message)
        }
        DependencyOutcome::Listed {
            descriptor,
            coordinates,
            dump,
        } => {
            let mut message = format!(
                "Maven dependencies successfully listed{} from {}.",
                project_label(coordinates.as_ref()),
                descriptor.path.display()
            );
            if let Some(dump) = dump {
                message.push_str(&format!(" Dependency tree saved to: {}", dump.display()));
            }
            CommandResult::ok(message)
        }
    }
}

fn license_result(outcome: LicenseOutcome, directory: &Path) -> CommandResult {
    match outcome {
        LicenseOutcome::NoDescriptor { searched } => {
            CommandResult::failed(format!("No pom.xml found in {}", searched.display()))
        }
        LicenseOutcome::ToolFailed {
            descriptor,
            exit_code,
            dump,
        } => CommandResult::failed(format!(
            "Error retrieving Maven dependency licenses (exit code {}) for {}. Maven output saved to: {}",
            exit_label(exit_code),
            descriptor.path.display(),
            dump.display()
        )),
        LicenseOutcome::Collected {
            descriptor,
            coordinates,
            dump,
            artifacts,
            report,
        } => {
            info!(
                descriptor = %descriptor.path.display(),
                dump = %dump.display(),
                artifacts = artifacts.len(),
                "License report collected"
            );
            let files = report.files();
            let failures = report.failures();
            let project = project_label(coordinates.as_ref());

            if failures.is_empty() {
                return CommandResult {
                    files,
                    ..CommandResult::ok(format!(
                        "Licenses successfully listed{} and saved {} files to: {}",
                        project,
                        report.written(),
                        directory.display()
                    ))
                };
            }

            let failed: Vec<&str> = failures.iter().map(|f| f.source.as_str()).collect();
            let message = format!(
                "Licenses listed{}; copied {} of {} files to: {}; failed: {}",
                project,
                report.written(),
                report.total(),
                directory.display(),
                failed.join(", ")
            );
            CommandResult {
                files,
                failures,
                ..CommandResult::failed(message)
            }
        }
    }
}

fn project_label(coordinates: Option<&ProjectCoordinates>) -> String {
    coordinates
        .filter(|c| c.artifact_id.is_some())
        .map(|c| format!(" for {}", c))
        .unwrap_or_default()
}

fn exit_label(exit_code: Option<i32>) -> String {
    exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}
