//! The two archive pipelines.
//!
//! Dependencies: extract → locate descriptor → `dependency:tree`.
//! Licenses: extract → locate descriptor → `license:add-third-party` →
//! scrape generated file paths → copy them under stable names.
//!
//! Every stage runs to completion before the next one starts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{archive_base_name, extract};
use crate::config::Config;
use crate::descriptor::{read_coordinates, DescriptorLocator};
use crate::error::{PipelineError, Result};
use crate::invoker::MavenInvoker;
use crate::materializer::{MaterializeReport, Materializer};
use crate::models::{ArtifactReference, Descriptor, ProjectCoordinates};
use crate::scraper::OutputScraper;

/// Result of a dependency-tree run.
#[derive(Debug)]
pub enum DependencyOutcome {
    NoDescriptor {
        searched: PathBuf,
    },
    ToolFailed {
        descriptor: Descriptor,
        exit_code: Option<i32>,
        dump: Option<PathBuf>,
    },
    Listed {
        descriptor: Descriptor,
        coordinates: Option<ProjectCoordinates>,
        dump: Option<PathBuf>,
    },
}

/// Result of a license-report run.
#[derive(Debug)]
pub enum LicenseOutcome {
    NoDescriptor {
        searched: PathBuf,
    },
    ToolFailed {
        descriptor: Descriptor,
        exit_code: Option<i32>,
        dump: PathBuf,
    },
    Collected {
        descriptor: Descriptor,
        coordinates: Option<ProjectCoordinates>,
        dump: PathBuf,
        artifacts: Vec<ArtifactReference>,
        report: MaterializeReport,
    },
}

pub struct Pipeline {
    locator: DescriptorLocator,
    invoker: MavenInvoker,
    scraper: OutputScraper,
    materializer: Materializer,
    dependency_goal: String,
    license_goal: String,
}

impl Pipeline {
    /// `maven_home` is the already-resolved installation root.
    pub fn from_config(config: &Config, maven_home: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            locator: DescriptorLocator::new(config.maven.descriptor.clone()),
            invoker: MavenInvoker::new(maven_home)
                .batch_mode(config.maven.batch_mode)
                .extra_args(config.maven.extra_args.clone()),
            scraper: OutputScraper::new(config.scraper.markers.as_slice())?,
            materializer: Materializer::new(config.output.build_dir.clone()),
            dependency_goal: config.maven.dependency_goal.clone(),
            license_goal: config.maven.license_goal.clone(),
        })
    }

    /// Dependency tree of an already extracted project; no dump is written.
    pub async fn dependencies_from_directory(
        &self,
        directory: &Path,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<DependencyOutcome> {
        info!(directory = %directory.display(), "Listing dependencies for project");
        self.dependency_tree(directory, None, on_line).await
    }

    /// Extract `archive` into `directory` and run the dependency tree.
    ///
    /// The captured output is saved as `{base}.txt` in `directory`.
    pub async fn dependencies_from_archive(
        &self,
        archive: &Path,
        directory: &Path,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<DependencyOutcome> {
        info!(
            archive = %archive.display(),
            directory = %directory.display(),
            "Listing dependencies from archive"
        );
        let (base, root) = unpack(archive, directory)?;
        let dump = directory.join(format!("{}.txt", base));
        self.dependency_tree(&root, Some(dump), on_line).await
    }

    /// Extract `archive`, run the license report and collect its files.
    ///
    /// The captured output is saved as `{base}-maven.txt`, each generated file
    /// as `{base}-licenses-{module}.txt`, all in `directory`.
    pub async fn licenses_from_archive(
        &self,
        archive: &Path,
        directory: &Path,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<LicenseOutcome> {
        info!(
            archive = %archive.display(),
            directory = %directory.display(),
            "Listing licenses from archive"
        );
        let (base, root) = unpack(archive, directory)?;

        let Some(descriptor) = self.locator.locate(&root) else {
            warn!(root = %root.display(), "No descriptor found");
            return Ok(LicenseOutcome::NoDescriptor { searched: root });
        };

        let result = self
            .invoker
            .invoke(&descriptor, &self.license_goal, on_line)
            .await?;

        let dump = directory.join(format!("{}-maven.txt", base));
        save_output(&dump, &result.output)?;
        info!(dump = %dump.display(), "Maven output saved");

        if !result.success() {
            return Ok(LicenseOutcome::ToolFailed {
                descriptor,
                exit_code: result.exit_code,
                dump,
            });
        }

        let artifacts = self.scraper.extract_artifact_paths(&result.output);
        info!(count = artifacts.len(), "Found generated license files");

        let report = self.materializer.materialize(&artifacts, &base, directory);
        let coordinates = coordinates_of(&descriptor);

        Ok(LicenseOutcome::Collected {
            descriptor,
            coordinates,
            dump,
            artifacts,
            report,
        })
    }

    async fn dependency_tree(
        &self,
        root: &Path,
        dump: Option<PathBuf>,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<DependencyOutcome> {
        let Some(descriptor) = self.locator.locate(root) else {
            warn!(root = %root.display(), "No descriptor found");
            return Ok(DependencyOutcome::NoDescriptor {
                searched: root.to_path_buf(),
            });
        };

        let result = self
            .invoker
            .invoke(&descriptor, &self.dependency_goal, on_line)
            .await?;

        if let Some(path) = &dump {
            save_output(path, &result.output)?;
            info!(dump = %path.display(), "Maven output saved");
        }

        if !result.success() {
            return Ok(DependencyOutcome::ToolFailed {
                descriptor,
                exit_code: result.exit_code,
                dump,
            });
        }

        let coordinates = coordinates_of(&descriptor);
        Ok(DependencyOutcome::Listed {
            descriptor,
            coordinates,
            dump,
        })
    }
}

/// Extract the archive; the project root is `directory/{base}` when the
/// archive contains such a top-level folder, else `directory` itself.
fn unpack(archive: &Path, directory: &Path) -> Result<(String, PathBuf)> {
    let base = archive_base_name(archive)?;
    extract(archive, directory)?;

    let nested = directory.join(&base);
    let root = if nested.is_dir() {
        nested
    } else {
        directory.to_path_buf()
    };
    debug!(base = %base, root = %root.display(), "Archive unpacked");
    Ok((base, root))
}

fn save_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| PipelineError::Dump {
        path: path.to_path_buf(),
        source,
    })
}

fn coordinates_of(descriptor: &Descriptor) -> Option<ProjectCoordinates> {
    match read_coordinates(descriptor) {
        Ok(coords) => Some(coords),
        Err(e) => {
            debug!(descriptor = %descriptor.path.display(), error = %e, "Cannot read coordinates");
            None
        }
    }
}
