use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::models::{Descriptor, ProjectCoordinates};

/// Finds the build descriptor of an extracted project tree.
///
/// Archives usually stage the real project under a `build*` directory, so
/// those are checked first in every directory the depth-first search enters.
/// Entries are sorted by name.
pub struct DescriptorLocator {
    file_name: String,
}

enum Step {
    Visit(PathBuf),
    Check(PathBuf),
}

impl DescriptorLocator {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Descriptor directly in `project_root`, else [`Self::find_descriptor`].
    pub fn locate(&self, project_root: &Path) -> Option<Descriptor> {
        let direct = project_root.join(&self.file_name);
        if direct.is_file() {
            return Some(Descriptor::new(direct));
        }
        self.find_descriptor(project_root)
    }

    /// Depth-first search below `root` with the `build*` bias. `None` is a normal result.
    pub fn find_descriptor(&self, root: &Path) -> Option<Descriptor> {
        self.find_depth_first(root).map(Descriptor::new)
    }

    /// Immediate subdirectories named `build*` (any case), descriptor directly inside.
    fn find_in_build_dirs(&self, dir: &Path) -> Option<PathBuf> {
        sorted_subdirs(dir)
            .into_iter()
            .filter(|dir| {
                dir.file_name()
                    .map(|name| name.to_string_lossy().to_lowercase().starts_with("build"))
                    .unwrap_or(false)
            })
            .map(|dir| dir.join(&self.file_name))
            .find(|candidate| candidate.is_file())
    }

    /// At every level the `build*` children are checked first, then the
    /// subdirectories are exhausted before the parent's own descriptor.
    fn find_depth_first(&self, root: &Path) -> Option<PathBuf> {
        let mut stack = vec![Step::Visit(root.to_path_buf())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(dir) => {
                    if let Some(found) = self.find_in_build_dirs(&dir) {
                        return Some(found);
                    }
                    stack.push(Step::Check(dir.clone()));
                    stack.extend(sorted_subdirs(&dir).into_iter().rev().map(Step::Visit));
                }
                Step::Check(dir) => {
                    let candidate = dir.join(&self.file_name);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }
        }

        None
    }
}

/// Subdirectories of `dir` sorted by name. Symlinks are not followed;
/// unreadable directories count as empty.
fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

/// Read the project's own coordinates, inheriting group and version from `<parent>`.
pub fn read_coordinates(descriptor: &Descriptor) -> Result<ProjectCoordinates> {
    let content = fs::read_to_string(&descriptor.path)?;
    Ok(parse_coordinates(&content))
}

fn parse_coordinates(xml: &str) -> ProjectCoordinates {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut own = ProjectCoordinates::default();
    let mut parent = ProjectCoordinates::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                let slot = match path.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
                    ["project", field] => pick(&mut own, field),
                    ["project", "parent", field] => pick(&mut parent, field),
                    _ => None,
                };
                if let Some(slot) = slot {
                    *slot = Some(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    ProjectCoordinates {
        group_id: own.group_id.or(parent.group_id),
        artifact_id: own.artifact_id,
        version: own.version.or(parent.version),
    }
}

fn pick<'a>(coords: &'a mut ProjectCoordinates, field: &str) -> Option<&'a mut Option<String>> {
    match field {
        "groupId" => Some(&mut coords.group_id),
        "artifactId" => Some(&mut coords.artifact_id),
        "version" => Some(&mut coords.version),
        _ => None,
    }
}
