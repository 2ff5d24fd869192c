use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "BACKBOARD_CONFIG";
pub const DB_PATH_ENV: &str = "BACKBOARD_DB_PATH";
pub const PORT_ENV: &str = "BACKBOARD_PORT";
pub const DEFAULT_CONFIG_PATH: &str = "backboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: PathBuf,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(flatten)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default, rename = "repo")]
    pub repos: Vec<RepoConfig>,
}

/// How branches and labels are recognised in every tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_primary_branch")]
    pub primary_branch: String,
    /// A `git branch --list` pattern.
    #[serde(default = "default_release_branch_pattern")]
    pub release_branch_pattern: String,
    #[serde(default = "default_backport_label_prefix")]
    pub backport_label_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Name of the environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoConfig {
    pub owner: String,
    pub name: String,
}

impl RepoConfig {
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("backboard.db")
}

fn default_mirror_dir() -> PathBuf {
    PathBuf::from("mirrors")
}

fn default_listen_port() -> u16 {
    8080
}

fn default_sync_interval_secs() -> u64 {
    60
}

fn default_primary_branch() -> String {
    "master".to_string()
}

fn default_release_branch_pattern() -> String {
    "release-*".to_string()
}

fn default_backport_label_prefix() -> String {
    "backport-".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            primary_branch: default_primary_branch(),
            release_branch_pattern: default_release_branch_pattern(),
            backport_label_prefix: default_backport_label_prefix(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Applies `BACKBOARD_DB_PATH` and `BACKBOARD_PORT` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup(DB_PATH_ENV) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.listen_port = port.parse().map_err(|_| ConfigError::Invalid {
                message: format!("{PORT_ENV} is not a port: {port}"),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.primary_branch.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "primary_branch must not be empty".to_string(),
            });
        }
        if self.tracking.backport_label_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                message: "backport_label_prefix must not be empty".to_string(),
            });
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "sync_interval_secs must be positive".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for repo in &self.repos {
            if repo.owner.is_empty() || repo.name.is_empty() {
                return Err(ConfigError::Invalid {
                    message: "repo owner and name must not be empty".to_string(),
                });
            }
            if !seen.insert((repo.owner.as_str(), repo.name.as_str())) {
                return Err(ConfigError::Invalid {
                    message: format!("duplicate repo {}/{}", repo.owner, repo.name),
                });
            }
        }
        Ok(())
    }

    /// Where the bare mirror of `repo` lives.
    pub fn mirror_path(&self, repo: &RepoConfig) -> PathBuf {
        self.mirror_dir.join(&repo.owner).join(&repo.name)
    }
}
