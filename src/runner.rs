//! Engine invocation.
//!
//! A [`Mumax3Runner`] turns a script path into one blocking child process.
//! The runner is an explicit strategy object: select it once (usually via
//! [`autoselect_runner`]) and pass it by reference to every drive call.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Mumax3Error, Result};

/// Captured outcome of one engine invocation.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Strategy for running the engine on a script.
pub trait Mumax3Runner {
    /// Spawns the engine on `script` with `cwd` as working directory and
    /// blocks until it exits, capturing stdout and stderr.
    fn invoke(&self, script: &Path, cwd: &Path) -> Result<EngineOutput>;

    /// Human-readable command line, used in error reports.
    fn command_line(&self, script: &Path) -> String;

    /// Runs the engine and turns a nonzero exit into an error carrying the
    /// captured output verbatim.
    fn call(&self, script: &Path, cwd: &Path) -> Result<EngineOutput> {
        let output = self.invoke(script, cwd)?;
        if !output.success {
            return Err(Mumax3Error::EngineRun {
                command: self.command_line(script),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

/// Runs the engine through an executable (optionally prefixed, e.g. by
/// `optirun`) found on the host.
#[derive(Debug, Clone)]
pub struct ExeMumax3Runner {
    argv: Vec<String>,
}

impl ExeMumax3Runner {
    /// Creates a runner calling `exe` directly.
    pub fn new(exe: impl Into<String>) -> Self {
        Self {
            argv: vec![exe.into()],
        }
    }

    /// Creates a runner from a full argument vector, e.g.
    /// `["optirun", "mumax3"]`. Empty vectors fall back to `mumax3`.
    pub fn from_argv(argv: Vec<String>) -> Self {
        if argv.is_empty() {
            Self::new("mumax3")
        } else {
            Self { argv }
        }
    }
}

impl Mumax3Runner for ExeMumax3Runner {
    fn invoke(&self, script: &Path, cwd: &Path) -> Result<EngineOutput> {
        debug!(command = %self.command_line(script), "running mumax3");
        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .arg(script)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(EngineOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn command_line(&self, script: &Path) -> String {
        format!("{} {}", self.argv.join(" "), script.display())
    }
}

/// Finds the best available way to run the engine: `optirun mumax3` when
/// `optirun` is on the path, plain `mumax3` otherwise. Fails when `mumax3`
/// cannot be found at all.
pub fn autoselect_runner() -> Result<ExeMumax3Runner> {
    autoselect("mumax3", "optirun")
}

/// Same as [`autoselect_runner`] with configurable executable names.
pub fn autoselect(mumax3_exe: &str, optirun_exe: &str) -> Result<ExeMumax3Runner> {
    debug!(mumax3_exe, optirun_exe, "autoselecting mumax3 runner");

    let mut argv = Vec::new();
    if let Some(path) = find_executable(optirun_exe) {
        debug!(path = %path.display(), "found optirun");
        argv.push(optirun_exe.to_string());
    }
    match find_executable(mumax3_exe) {
        Some(path) => {
            debug!(path = %path.display(), "found mumax3");
            argv.push(mumax3_exe.to_string());
            Ok(ExeMumax3Runner::from_argv(argv))
        }
        None => Err(Mumax3Error::EngineNotFound),
    }
}

fn find_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(name))
            .find(|p| p.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_autoselect_missing_engine() {
        let err = autoselect("definitely-not-a-real-binary", "also-missing").unwrap_err();
        assert!(matches!(err, Mumax3Error::EngineNotFound));
    }

    #[test]
    fn test_call_surfaces_nonzero_exit() {
        let dir = tempdir().unwrap();
        let runner = ExeMumax3Runner::new("false");
        let err = runner
            .call(Path::new("script.mx3"), dir.path())
            .unwrap_err();
        assert!(matches!(err, Mumax3Error::EngineRun { .. }));
    }

    #[test]
    fn test_call_successful_exit() {
        let dir = tempdir().unwrap();
        let runner = ExeMumax3Runner::new("true");
        let output = runner.call(Path::new("script.mx3"), dir.path()).unwrap();
        assert!(output.success);
        assert_eq!(output.code, Some(0));
    }

    #[test]
    fn test_command_line() {
        let runner = ExeMumax3Runner::from_argv(vec![
            "optirun".to_string(),
            "mumax3".to_string(),
        ]);
        assert_eq!(
            runner.command_line(Path::new("a.mx3")),
            "optirun mumax3 a.mx3"
        );
    }
}
