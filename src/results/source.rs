//! Where the engine's artifacts are fetched from

use crate::error::Result;
use log::{debug, warn};
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

pub trait ArtifactSource {
    /// Text of the artifact at `relative_path`, or `None` when it is absent.
    fn fetch(&self, relative_path: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn describe(&self) -> String;
}

/// Artifacts in a local directory tree.
pub struct LocalArtifactSource {
    root: PathBuf,
}

impl LocalArtifactSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSource for LocalArtifactSource {
    async fn fetch(&self, relative_path: &str) -> Result<Option<String>> {
        let path = self.root.join(relative_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Artifact not found: {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Artifacts served as raw files over HTTP, e.g. `raw.githubusercontent.com`.
pub struct RemoteArtifactSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteArtifactSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }
}

impl ArtifactSource for RemoteArtifactSource {
    /// Any failure reads as absence; the loader decides whether that matters.
    async fn fetch(&self, relative_path: &str) -> Result<Option<String>> {
        let url = self.url_for(relative_path);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not fetch {}: {}", url, e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!("{} returned {}", url, response.status());
            return Ok(None);
        }

        match response.text().await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!("Could not read body of {}: {}", url, e);
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
