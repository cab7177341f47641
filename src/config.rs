use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file structure for pipewatch.
///
/// Describes which GitLab group and projects to watch and how often the
/// cached dashboard data is refreshed. Configuration files are loaded from
/// the current directory or a specified path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitLab connection and query settings
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Cache refresh intervals
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab API base URL, including the version prefix
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GitLab private token
    pub token: Option<String>,

    /// GitLab group id used for milestone and issue queries
    pub group_id: Option<u64>,

    /// Projects shown on the dashboard
    #[serde(default)]
    pub projects: Vec<ProjectRef>,

    /// Title filter for milestone queries (sprint naming convention)
    #[serde(default = "default_milestone_filter")]
    pub milestone_filter: String,
}

/// A watched project: id plus the branch its pipelines run on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectRef {
    pub id: u64,

    #[serde(default = "default_ref_name")]
    pub ref_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RefreshConfig {
    /// TTL for pipeline/commit/deployment data, in seconds
    #[serde(default = "default_short_ttl_secs")]
    pub short_ttl_secs: u64,

    /// TTL for milestone data, in seconds
    #[serde(default = "default_hourly_ttl_secs")]
    pub hourly_ttl_secs: u64,

    /// Redraw interval for `pipewatch watch`, in seconds
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Per-request timeout, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            group_id: None,
            projects: Vec::new(),
            milestone_filter: default_milestone_filter(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            short_ttl_secs: default_short_ttl_secs(),
            hourly_ttl_secs: default_hourly_ttl_secs(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://gitlab.com/api/v4".to_string()
}

fn default_milestone_filter() -> String {
    "Sprint".to_string()
}

fn default_ref_name() -> String {
    "master".to_string()
}

fn default_short_ttl_secs() -> u64 {
    600
}

fn default_hourly_ttl_secs() -> u64 {
    3600
}

fn default_status_interval_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipewatch.toml
    /// 3. ./pipewatch.json
    /// 4. ./pipewatch.yaml
    /// 5. ./pipewatch.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "pipewatch.toml",
            "pipewatch.json",
            "pipewatch.yaml",
            "pipewatch.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Validate the watched-project configuration.
    ///
    /// An empty project list or a missing group id is a configuration error,
    /// not a runtime one: the dashboard has nothing to show, so startup aborts.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.gitlab.projects.is_empty() {
            return Err(crate::error::PipewatchError::Config(
                "No GitLab projects configured".to_string(),
            ));
        }
        if self.gitlab.group_id.is_none() {
            return Err(crate::error::PipewatchError::Config(
                "No GitLab group id configured".to_string(),
            ));
        }
        Ok(())
    }
}
