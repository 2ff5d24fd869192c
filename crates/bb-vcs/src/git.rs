use crate::backend::{VcsBackend, VcsError};
use crate::commit::Sha;
use crate::commits::CommitCollection;
use crate::history::{COMMIT_FORMAT, parse_log};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A bare mirror clone driven through the git CLI.
#[derive(Debug, Clone)]
pub struct GitMirror {
    path: PathBuf,
}

impl GitMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the mirror at `path`, cloning `url` into it first when the
    /// directory does not exist yet.
    pub fn open_or_clone(url: &str, path: &Path) -> Result<Self, VcsError> {
        if !path.exists() {
            info!(url, path = %path.display(), "cloning mirror");
            let path_arg = path.to_string_lossy();
            run(
                Command::new("git").args([
                    "clone",
                    "--filter=blob:none",
                    "--mirror",
                    url,
                    path_arg.as_ref(),
                ]),
                "clone",
            )?;
            // Objects for unmerged pull requests are needed long after they
            // become unreachable.
            run(
                Command::new("git")
                    .arg("-C")
                    .arg(path)
                    .args(["config", "gc.auto", "0"]),
                "config",
            )?;
        }
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn capture(&self, args: &[&str]) -> Result<String, VcsError> {
        let command = args.first().copied().unwrap_or("git");
        debug!(path = %self.path.display(), ?args, "git");
        run(Command::new("git").arg("-C").arg(&self.path).args(args), command)
    }
}

impl VcsBackend for GitMirror {
    fn fetch(&self) -> Result<(), VcsError> {
        self.capture(&["fetch", "--tags"]).map(|_| ())
    }

    fn load_history(&self, constraints: &[&str]) -> Result<CommitCollection, VcsError> {
        let format = format!("--format=format:{COMMIT_FORMAT}");
        let mut args = vec!["log", "--topo-order", format.as_str()];
        args.extend_from_slice(constraints);
        // Keep revisions from being read as paths.
        args.push("--");
        let output = self.capture(&args)?;
        parse_log(&output)
    }

    fn merge_base(&self, left: &str, right: &str) -> Result<Sha, VcsError> {
        let output = self.capture(&["merge-base", left, right])?;
        Sha::parse(&output)
    }

    fn list_branches(&self, pattern: &str) -> Result<Vec<String>, VcsError> {
        let output = self.capture(&["branch", "--list", pattern])?;
        let mut branches: Vec<String> = output
            .lines()
            .map(|line| line.trim_start_matches(['*', '+']).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        branches.sort_unstable_by(|a, b| b.cmp(a));
        Ok(branches)
    }
}

fn run(command: &mut Command, name: &str) -> Result<String, VcsError> {
    let output = command.output().map_err(|err| VcsError::Spawn {
        reason: format!("git {name}: {err}"),
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_missing_revision(&stderr) {
            return Err(VcsError::MissingRef { reason: stderr });
        }
        return Err(VcsError::CommandFailed {
            command: name.to_string(),
            stderr,
        });
    }
    String::from_utf8(output.stdout).map_err(|err| VcsError::Parse {
        reason: format!("git {name} output is not utf-8: {err}"),
    })
}

fn is_missing_revision(stderr: &str) -> bool {
    stderr.contains("unknown revision")
        || stderr.contains("bad revision")
        || stderr.contains("not a valid object name")
}
