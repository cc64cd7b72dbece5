use regex::Regex;

use crate::models::ArtifactReference;

/// Marker the license plugin prints before each generated third-party file.
pub const THIRD_PARTY_MARKER: &str = "Writing third-party file to";

/// Pulls generated file paths out of captured build output.
///
/// Each marker may be followed by a colon; older plugin versions print
/// `to: <path>`, current ones `to <path>`. Both are accepted.
#[derive(Debug, Clone)]
pub struct OutputScraper {
    pattern: Option<Regex>,
}

impl OutputScraper {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        if markers.is_empty() {
            return Ok(Self { pattern: None });
        }

        let alternatives: Vec<String> = markers
            .iter()
            .map(|m| regex::escape(m.as_ref()))
            .collect();
        let pattern = Regex::new(&format!(
            r"(?:{})(?::[ \t]*|[ \t]+)([^\n]*)",
            alternatives.join("|")
        ))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Every announced path, in order of appearance. Duplicates are kept.
    pub fn extract_artifact_paths(&self, text: &str) -> Vec<ArtifactReference> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let path = caps.get(1)?.as_str().trim();
                (!path.is_empty()).then(|| ArtifactReference(path.to_string()))
            })
            .collect()
    }
}

impl Default for OutputScraper {
    fn default() -> Self {
        Self::new(&[THIRD_PARTY_MARKER]).unwrap_or(Self { pattern: None })
    }
}
