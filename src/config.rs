use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::scraper::THIRD_PARTY_MARKER;

/// Root configuration structure, deserialized from `.deps-analyzer/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub maven: MavenConfig,
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
}

/// How Maven is located and which goals it runs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MavenConfig {
    /// Installation root; `--maven-home` and `MAVEN_HOME` take precedence.
    pub home: Option<PathBuf>,
    /// Descriptor file name searched for in extracted projects.
    pub descriptor: String,
    pub dependency_goal: String,
    pub license_goal: String,
    /// Pass `-B` so the log carries no colour codes or download progress.
    pub batch_mode: bool,
    /// Extra arguments placed before the goal, e.g. `["-o"]`.
    pub extra_args: Vec<String>,
}

impl Default for MavenConfig {
    fn default() -> Self {
        Self {
            home: None,
            descriptor: "pom.xml".to_string(),
            dependency_goal: "dependency:tree".to_string(),
            license_goal: "license:add-third-party".to_string(),
            batch_mode: true,
            extra_args: Vec::new(),
        }
    }
}

/// Marker phrases announcing generated files in the build log.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub markers: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            markers: vec![THIRD_PARTY_MARKER.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Build output directory name used to tell modules apart.
    pub build_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            build_dir: "target".to_string(),
        }
    }
}

impl Config {
    /// Maven home from the command line / environment, else from the file.
    pub fn maven_home(&self, cli_or_env: Option<&Path>) -> Option<PathBuf> {
        cli_or_env
            .map(Path::to_path_buf)
            .or_else(|| self.maven.home.clone())
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<working_dir>/.deps-analyzer/config.toml`
/// 3. `~/.config/deps-analyzer/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = working_dir.join(".deps-analyzer").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("deps-analyzer")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.maven.descriptor, "pom.xml");
        assert_eq!(cfg.maven.dependency_goal, "dependency:tree");
        assert_eq!(cfg.maven.license_goal, "license:add-third-party");
        assert!(cfg.maven.batch_mode);
        assert_eq!(cfg.scraper.markers, vec![THIRD_PARTY_MARKER.to_string()]);
        assert_eq!(cfg.output.build_dir, "target");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[maven]
home = "/opt/maven"
extra_args = ["-o"]

[scraper]
markers = ["Writing third-party file to", "Generated report at"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.maven.home, Some(PathBuf::from("/opt/maven")));
        assert_eq!(cfg.maven.extra_args, vec!["-o"]);
        assert_eq!(cfg.maven.license_goal, "license:add-third-party");
        assert_eq!(cfg.scraper.markers.len(), 2);
        assert_eq!(cfg.output.build_dir, "target");
    }

    #[test]
    fn test_maven_home_precedence() {
        let mut cfg = Config::default();
        assert_eq!(cfg.maven_home(None), None);

        cfg.maven.home = Some(PathBuf::from("/from/file"));
        assert_eq!(cfg.maven_home(None), Some(PathBuf::from("/from/file")));
        assert_eq!(
            cfg.maven_home(Some(Path::new("/from/env"))),
            Some(PathBuf::from("/from/env"))
        );
    }

    #[test]
    fn test_load_project_config() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".deps-analyzer");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[output]\nbuild_dir = \"build\"\n").unwrap();

        let cfg = load_config(tmp.path(), None).unwrap();
        assert_eq!(cfg.output.build_dir, "build");
    }

    #[test]
    fn test_load_override_errors_on_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[maven\n").unwrap();

        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }
}
