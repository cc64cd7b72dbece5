use std::path::{Path, PathBuf};

use serde::Serialize;

/// A located build descriptor (`pom.xml`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub path: PathBuf,
}

impl Descriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory the build tool runs in.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// `groupId:artifactId:version` of a descriptor, as far as it declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectCoordinates {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

impl std::fmt::Display for ProjectCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or("?"),
            self.artifact_id.as_deref().unwrap_or("?"),
            self.version.as_deref().unwrap_or("?")
        )
    }
}

/// Exit status and captured standard output of one build tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_code: Option<i32>,
    pub output: String,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Path of a generated file, as announced in the build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference(pub String);

impl ArtifactReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A generated file copied into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedFile {
    /// 1-based position of the artifact in discovery order.
    pub index: usize,
    pub source: String,
    pub destination: PathBuf,
}
