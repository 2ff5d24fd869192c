use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Scratch git repository on `master` with a fixed identity.
pub struct GitTestRepo {
    dir: TempDir,
}

impl GitTestRepo {
    pub fn new() -> Result<Self, String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let repo = Self { dir };
        repo.git(&["init", "-q"])?;
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/master"])?;
        repo.git(&["config", "user.email", "dev@example.com"])?;
        repo.git(&["config", "user.name", "Dev"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        repo.git(&["config", "tag.gpgsign", "false"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> Result<String, String> {
        self.git_with_env(&[], args)
    }

    /// Runs git with extra environment, e.g. a pinned `GIT_COMMITTER_DATE`
    /// so a cherry-pick made in the same second still gets its own sha.
    pub fn git_with_env(&self, env: &[(&str, &str)], args: &[&str]) -> Result<String, String> {
        let output = Command::new("git")
            .args(args)
            .envs(env.iter().copied())
            .current_dir(self.path())
            .output()
            .map_err(|err| err.to_string())?;
        if !output.status.success() {
            return Err(format!(
                "git {args:?} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Writes `file` and commits it with `message`, returning the full sha.
    pub fn commit_file(&self, file: &str, message: &str) -> Result<String, String> {
        std::fs::write(self.path().join(file), message).map_err(|err| err.to_string())?;
        self.git(&["add", file])?;
        self.git(&["commit", "-q", "-m", message])?;
        self.git(&["rev-parse", "HEAD"])
    }
}
