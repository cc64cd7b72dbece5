use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::MaterializationError;
use crate::models::{ArtifactReference, MaterializedFile};

/// Per-artifact outcome of a [`Materializer::materialize`] run, in discovery order.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub outcomes: Vec<Result<MaterializedFile, MaterializationError>>,
}

/// Serializable view of a failed copy.
#[derive(Debug, Clone, Serialize)]
pub struct FailedCopy {
    pub source: String,
    pub reason: String,
}

impl MaterializeReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn files(&self) -> Vec<MaterializedFile> {
        self.outcomes
            .iter()
            .filter_map(|o| o.as_ref().ok().cloned())
            .collect()
    }

    pub fn failures(&self) -> Vec<FailedCopy> {
        self.outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .map(|e| FailedCopy {
                source: e.source_path.clone(),
                reason: e.reason.to_string(),
            })
            .collect()
    }
}

/// Copies generated license files next to the extracted project under
/// `{base}-licenses-{module}.txt`.
pub struct Materializer {
    /// Build output directory name (`target` for Maven).
    build_dir: String,
}

impl Materializer {
    pub fn new(build_dir: impl Into<String>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Copy every artifact, continuing past failures.
    pub fn materialize(
        &self,
        artifacts: &[ArtifactReference],
        base_name: &str,
        output_dir: &Path,
    ) -> MaterializeReport {
        let mut used: HashSet<String> = HashSet::new();
        let mut report = MaterializeReport::default();

        for (i, artifact) in artifacts.iter().enumerate() {
            let index = i + 1;
            let base_segment = self
                .module_segment(artifact.as_str())
                .unwrap_or_else(|| index.to_string());
            let segment = unique_segment(&mut used, base_segment, index);

            let destination = output_dir.join(format!("{}-licenses-{}.txt", base_name, segment));
            report.outcomes.push(copy_artifact(artifact, index, destination));
        }

        report
    }

    /// Directory name just above the innermost build output directory.
    ///
    /// `.../module-1.0.0/target/generated-sources/license/THIRD-PARTY.txt`
    /// yields `module-1.0.0`.
    pub fn module_segment(&self, path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split(['/', '\\']).collect();
        // last segment is the file itself
        let dirs = &segments[..segments.len().saturating_sub(1)];
        let pos = dirs.iter().rposition(|s| *s == self.build_dir)?;
        let module = dirs[..pos].last()?;
        (!module.is_empty()).then(|| module.to_string())
    }
}

/// First free name among `segment`, `segment-{index}`, `segment-{index}-2`, ...
fn unique_segment(used: &mut HashSet<String>, segment: String, index: usize) -> String {
    if used.insert(segment.clone()) {
        return segment;
    }

    let suffixed = format!("{}-{}", segment, index);
    let mut candidate = suffixed.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}-{}", suffixed, n);
        n += 1;
    }
    candidate
}

fn copy_artifact(
    artifact: &ArtifactReference,
    index: usize,
    destination: PathBuf,
) -> Result<MaterializedFile, MaterializationError> {
    match fs::copy(artifact.as_str(), &destination) {
        Ok(_) => {
            info!(
                from = artifact.as_str(),
                to = %destination.display(),
                "Result file copied"
            );
            Ok(MaterializedFile {
                index,
                source: artifact.0.clone(),
                destination,
            })
        }
        Err(reason) => {
            warn!(from = artifact.as_str(), error = %reason, "Cannot copy result file");
            Err(MaterializationError {
                source_path: artifact.0.clone(),
                reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn maven() -> Materializer {
        Materializer::new("target")
    }

    fn artifact(root: &Path, rel: &str, content: &str) -> ArtifactReference {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        ArtifactReference(path.to_string_lossy().into_owned())
    }

    #[test]
    fn test_module_segment() {
        let m = maven();
        assert_eq!(
            m.module_segment(
                "/Users/x/project-1.0.0/module-1.0.0/target/generated-sources/license/THIRD-PARTY.txt"
            ),
            Some("module-1.0.0".to_string())
        );
        assert_eq!(
            m.module_segment("C:\\work\\app\\target\\generated-sources\\license\\THIRD-PARTY.txt"),
            Some("app".to_string())
        );
        // innermost build dir wins
        assert_eq!(
            m.module_segment("/target/outer/target/THIRD-PARTY.txt"),
            Some("outer".to_string())
        );
        assert_eq!(m.module_segment("/tmp/THIRD-PARTY.txt"), None);
        assert_eq!(m.module_segment("/target/THIRD-PARTY.txt"), None);
        assert_eq!(m.module_segment("target"), None);
    }

    #[test]
    fn test_destination_name_from_module() {
        let tmp = TempDir::new().unwrap();
        let a = artifact(
            tmp.path(),
            "project-1.0.0/module-1.0.0/target/generated-sources/license/THIRD-PARTY.txt",
            "lic",
        );
        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let report = maven().materialize(&[a], "myproject", &out);

        assert_eq!(report.written(), 1);
        let files = report.files();
        assert_eq!(files[0].index, 1);
        assert_eq!(files[0].destination, out.join("myproject-licenses-module-1.0.0.txt"));
        assert_eq!(fs::read_to_string(&files[0].destination).unwrap(), "lic");
    }

    #[test]
    fn test_partial_failure_copies_the_rest() {
        let tmp = TempDir::new().unwrap();
        let a = artifact(tmp.path(), "a/target/THIRD-PARTY.txt", "a");
        let missing = ArtifactReference(
            tmp.path().join("b/target/THIRD-PARTY.txt").to_string_lossy().into_owned(),
        );
        let c = artifact(tmp.path(), "c/target/THIRD-PARTY.txt", "c");

        let report = maven().materialize(&[a, missing.clone(), c], "repo", tmp.path());

        assert_eq!(report.total(), 3);
        assert_eq!(report.written(), 2);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].source, missing.0);
        assert!(tmp.path().join("repo-licenses-a.txt").exists());
        assert!(tmp.path().join("repo-licenses-c.txt").exists());
    }

    #[test]
    fn test_same_basename_never_collides() {
        let tmp = TempDir::new().unwrap();
        let first = artifact(tmp.path(), "x/THIRD-PARTY.txt", "first");
        let second = artifact(tmp.path(), "y/THIRD-PARTY.txt", "second");
        let dup = artifact(tmp.path(), "m/target/THIRD-PARTY.txt", "m");

        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let report = maven().materialize(&[first, second, dup.clone(), dup], "repo", &out);

        let names: Vec<String> = report
            .files()
            .iter()
            .map(|f| f.destination.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "repo-licenses-1.txt",
                "repo-licenses-2.txt",
                "repo-licenses-m.txt",
                "repo-licenses-m-4.txt",
            ]
        );
        assert_eq!(fs::read_to_string(out.join("repo-licenses-2.txt")).unwrap(), "second");
    }

    #[test]
    fn test_suffix_skips_names_taken_by_other_modules() {
        let tmp = TempDir::new().unwrap();
        let first = artifact(tmp.path(), "a/target/THIRD-PARTY.txt", "first-a");
        let a3 = artifact(tmp.path(), "a-3/target/THIRD-PARTY.txt", "module-a-3");

        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let report = maven().materialize(&[first.clone(), a3, first], "repo", &out);

        let names: Vec<String> = report
            .files()
            .iter()
            .map(|f| f.destination.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "repo-licenses-a.txt",
                "repo-licenses-a-3.txt",
                "repo-licenses-a-3-2.txt",
            ]
        );
        assert_eq!(
            fs::read_to_string(out.join("repo-licenses-a-3.txt")).unwrap(),
            "module-a-3"
        );
        assert_eq!(
            fs::read_to_string(out.join("repo-licenses-a-3-2.txt")).unwrap(),
            "first-a"
        );
    }

    #[test]
    fn test_overwrites_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let a = artifact(tmp.path(), "a/target/THIRD-PARTY.txt", "fresh");
        fs::write(tmp.path().join("repo-licenses-a.txt"), "stale and longer").unwrap();

        maven().materialize(&[a], "repo", tmp.path());

        assert_eq!(
            fs::read_to_string(tmp.path().join("repo-licenses-a.txt")).unwrap(),
            "fresh"
        );
    }
}
