//! Error taxonomy for the extraction / build / collection pipeline.
//!
//! A missing descriptor, a non-zero build exit and an empty scrape are normal
//! outcomes and are modelled in [`crate::pipeline`], not here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The archive could not be read or its contents could not be written out.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read archive {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive entry {name:?} escapes the destination directory")]
    UnsafeEntry { name: String },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot derive a base name from archive path {0}")]
    BaseName(PathBuf),
}

/// The external build tool could not be resolved or started.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("build tool is not configured: {0}")]
    ToolNotConfigured(String),

    #[error("failed to start {program}: {source}")]
    Start {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read output of {program}: {source}")]
    Capture {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single generated artifact could not be copied into the output directory.
#[derive(Debug, Error)]
#[error("cannot copy {source_path}: {reason}")]
pub struct MaterializationError {
    pub source_path: String,
    pub reason: io::Error,
}

/// Stage failure surfaced by one of the pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("cannot save build output to {path}: {source}")]
    Dump {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid output marker: {0}")]
    Marker(#[from] regex::Error),
}

/// Version-control pass-through failure.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
