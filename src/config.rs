//! Configuration management for the competency survey

use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub artifacts: ArtifactConfig,
    pub dashboard: DashboardConfig,
    pub embeddings: EmbeddingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: PathBuf,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    /// Environment variable holding the access token
    pub token_env: String,
    pub commit_message: String,
    pub user_agent: String,
    pub max_conflict_retries: u32,
    pub base_backoff_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSourceKind {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub source: ArtifactSourceKind,
    pub local_root: PathBuf,
    pub raw_base_url: String,
    pub competency_scores: String,
    pub block_scores: String,
    pub job_scores: String,
    pub summary: String,
    pub competency_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub threshold: f64,
    pub default_top_n: usize,
    pub min_top_n: usize,
    pub max_top_n: usize,
    pub top_jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_path: PathBuf::from("responses.csv"),
                github: GitHubConfig {
                    api_base: "https://api.github.com".to_string(),
                    owner: "Amik24".to_string(),
                    repo: "semantic-analysis-project".to_string(),
                    path: "responses.csv".to_string(),
                    branch: "main".to_string(),
                    token_env: "GITHUB_TOKEN".to_string(),
                    commit_message: "Add survey response".to_string(),
                    user_agent: format!("competency-survey/{}", env!("CARGO_PKG_VERSION")),
                    max_conflict_retries: 3,
                    base_backoff_ms: 200,
                    timeout_secs: 30,
                },
            },
            artifacts: ArtifactConfig {
                source: ArtifactSourceKind::Local,
                local_root: PathBuf::from("."),
                raw_base_url: "https://raw.githubusercontent.com/Amik24/semantic-analysis-project/main"
                    .to_string(),
                competency_scores: "outputs/competency_scores.csv".to_string(),
                block_scores: "outputs/block_scores.csv".to_string(),
                job_scores: "outputs/job_scores.csv".to_string(),
                summary: "outputs/results/summary.json".to_string(),
                competency_reference: "data/competencies.csv".to_string(),
            },
            dashboard: DashboardConfig {
                threshold: 0.70,
                default_top_n: 10,
                min_top_n: 5,
                max_top_n: 35,
                top_jobs: 5,
            },
            embeddings: EmbeddingConfig {
                default_model: "minishlab/potion-base-8M".to_string(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                pretty_json: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load an explicit configuration file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SurveyError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SurveyError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SurveyError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("competency-survey")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        let d = &self.dashboard;
        if d.min_top_n == 0 || d.min_top_n > d.max_top_n {
            return Err(SurveyError::Configuration(format!(
                "dashboard.min_top_n ({}) must be between 1 and dashboard.max_top_n ({})",
                d.min_top_n, d.max_top_n
            )));
        }
        if !(0.0..=1.0).contains(&d.threshold) {
            return Err(SurveyError::Configuration(format!(
                "dashboard.threshold must be within [0, 1], got {}",
                d.threshold
            )));
        }
        Ok(())
    }

    /// Read the remote API token from the configured environment variable.
    pub fn github_token(&self) -> Result<String> {
        let var = &self.storage.github.token_env;
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(SurveyError::Configuration(format!(
                "Remote storage requires an access token in ${}",
                var
            ))),
        }
    }
}
