//! Runs Maven goals against a located descriptor.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::InvocationError;
use crate::models::{Descriptor, InvocationResult};

/// Launches `<maven_home>/bin/mvn` and captures its standard output line by line.
#[derive(Debug, Clone)]
pub struct MavenInvoker {
    maven_home: Option<PathBuf>,
    batch_mode: bool,
    extra_args: Vec<String>,
}

impl MavenInvoker {
    pub fn new(maven_home: Option<PathBuf>) -> Self {
        Self {
            maven_home,
            batch_mode: true,
            extra_args: Vec::new(),
        }
    }

    pub fn batch_mode(mut self, enabled: bool) -> Self {
        self.batch_mode = enabled;
        self
    }

    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Path of the `mvn` launcher inside the configured installation.
    pub fn executable(&self) -> Result<PathBuf, InvocationError> {
        let home = self.maven_home.as_deref().ok_or_else(|| {
            InvocationError::ToolNotConfigured(
                "MAVEN_HOME is not set and no Maven home was configured".to_string(),
            )
        })?;
        if !home.is_dir() {
            return Err(InvocationError::ToolNotConfigured(format!(
                "Maven home {} is not a directory",
                home.display()
            )));
        }
        Ok(launcher(home))
    }

    /// Run `goal` in the descriptor's directory.
    ///
    /// A non-zero exit is reported through [`InvocationResult`], not as an
    /// error. `on_line` sees every stdout line as it arrives.
    pub async fn invoke(
        &self,
        descriptor: &Descriptor,
        goal: &str,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<InvocationResult, InvocationError> {
        let program = self.executable()?;
        let working_dir = descriptor.directory();

        info!(
            goal,
            directory = %working_dir.display(),
            "Executing Maven"
        );

        let mut command = Command::new(&program);
        if self.batch_mode {
            command.arg("-B");
        }
        command
            .arg("-f")
            .arg(&descriptor.path)
            .args(&self.extra_args)
            .arg(goal)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| InvocationError::Start {
            program: program.clone(),
            source,
        })?;

        let capture_err = |source| InvocationError::Capture {
            program: program.clone(),
            source,
        };

        // Drain stderr alongside stdout so the child never blocks on a full pipe.
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                while let Ok(Some(line)) = next_line(&mut reader, &mut buf).await {
                    warn!(target: "maven", "{}", line);
                }
            })
        });

        let mut output = String::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                match next_line(&mut reader, &mut buf).await {
                    Ok(Some(line)) => {
                        debug!(target: "maven", "{}", line);
                        on_line(&line);
                        output.push_str(&line);
                        output.push('\n');
                    }
                    Ok(None) => break,
                    Err(source) => {
                        if let Err(e) = child.kill().await {
                            debug!(error = %e, "Cannot stop Maven after a read error");
                        }
                        return Err(capture_err(source));
                    }
                }
            }
        }

        let status = child.wait().await.map_err(capture_err)?;
        if let Some(task) = stderr_task {
            if let Err(e) = task.await {
                debug!(error = %e, "stderr drain task failed");
            }
        }

        info!(goal, exit_code = ?status.code(), "Maven finished");

        Ok(InvocationResult {
            exit_code: status.code(),
            output,
        })
    }
}

/// Next line without its `\n` / `\r\n` ending. Invalid UTF-8 is replaced, never an error.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn launcher(home: &Path) -> PathBuf {
    let name = if cfg!(windows) { "mvn.cmd" } else { "mvn" };
    home.join("bin").join(name)
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Install a fake `bin/mvn` that runs `script` with `sh`.
    pub(crate) fn fake_maven(home: &Path, script: &str) {
        let bin = home.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let mvn = bin.join("mvn");
        fs::write(&mvn, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&mvn, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn project(root: &Path) -> Descriptor {
        let project = root.join("project");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("pom.xml"), "<project/>").unwrap();
        Descriptor::new(project.join("pom.xml"))
    }

    #[test]
    fn test_not_configured() {
        let err = MavenInvoker::new(None).executable().unwrap_err();
        assert!(matches!(err, InvocationError::ToolNotConfigured(_)));

        let tmp = TempDir::new().unwrap();
        let err = MavenInvoker::new(Some(tmp.path().join("missing")))
            .executable()
            .unwrap_err();
        assert!(matches!(err, InvocationError::ToolNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_captures_lines_in_order() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("maven");
        fake_maven(&home, "echo \"[INFO] args: $*\"\necho \"[INFO] cwd: $(pwd)\"\necho oops >&2");
        let descriptor = project(tmp.path());

        let mut seen = Vec::new();
        let result = MavenInvoker::new(Some(home))
            .invoke(&descriptor, "dependency:tree", &mut |line: &str| seen.push(line.to_string()))
            .await
            .unwrap();

        assert!(result.success());
        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[INFO] args: -B -f "));
        assert!(lines[0].ends_with("pom.xml dependency:tree"));
        let cwd = fs::canonicalize(descriptor.directory()).unwrap();
        assert_eq!(lines[1], format!("[INFO] cwd: {}", cwd.display()));
        assert_eq!(seen.len(), 2);
        assert!(!result.output.contains("oops"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("maven");
        fake_maven(&home, "echo '[ERROR] BUILD FAILURE'\nexit 3");
        let descriptor = project(tmp.path());

        let result = MavenInvoker::new(Some(home))
            .batch_mode(false)
            .invoke(&descriptor, "license:add-third-party", &mut |_: &str| {})
            .await
            .unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.output, "[ERROR] BUILD FAILURE\n");
    }

    #[tokio::test]
    async fn test_non_utf8_output_is_decoded_lossily() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("maven");
        fake_maven(
            &home,
            "printf 'Lizenz: \\374ber\\r\\n'\necho '[INFO] Writing third-party file to /tmp/T.txt'",
        );
        let descriptor = project(tmp.path());

        let mut seen = Vec::new();
        let result = MavenInvoker::new(Some(home))
            .invoke(&descriptor, "license:add-third-party", &mut |line: &str| {
                seen.push(line.to_string())
            })
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(
            seen,
            vec![
                "Lizenz: \u{FFFD}ber".to_string(),
                "[INFO] Writing third-party file to /tmp/T.txt".to_string(),
            ]
        );
        assert_eq!(
            result.output,
            "Lizenz: \u{FFFD}ber\n[INFO] Writing third-party file to /tmp/T.txt\n"
        );
    }

    #[tokio::test]
    async fn test_missing_launcher_fails_to_start() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("maven");
        fs::create_dir_all(&home).unwrap();
        let descriptor = project(tmp.path());

        let err = MavenInvoker::new(Some(home))
            .invoke(&descriptor, "dependency:tree", &mut |_: &str| {})
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Start { .. }));
    }
}
