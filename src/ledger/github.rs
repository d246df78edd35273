//! Ledger kept as a single file in a GitHub repository
//!
//! Appends use the REST `contents` endpoint: read the blob and its `sha`,
//! append locally, then write the whole file back. The `sha` makes the write
//! conflict-checked, so a concurrent writer causes a 409 instead of a lost
//! update. Conflicts are retried with exponential backoff.

use crate::config::GitHubConfig;
use crate::error::{Result, SurveyError};
use crate::ledger::record::{ResponseLedger, ResponseRecord};
use crate::ledger::store::{AppendReceipt, ResponseStore};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Current content of the remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    /// Version token required to update the file
    pub sha: String,
}

/// Read and write access to one remote file.
pub trait ContentApi {
    /// `None` when the file does not exist yet.
    fn get_file(&self) -> impl Future<Output = Result<Option<RemoteFile>>> + Send;

    /// Create (no `sha`) or update (with `sha`) the file. Returns the new version token.
    fn put_file(
        &self,
        content: &str,
        sha: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    fn location(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: Option<CommittedContent>,
}

#[derive(Debug, Deserialize)]
struct CommittedContent {
    sha: String,
}

pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a `contents` payload. GitHub wraps the base64 text at 60 columns.
pub fn decode_content(payload: &str) -> Result<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SurveyError::Decode(format!("Invalid base64 content: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| SurveyError::Decode(format!("Remote ledger is not UTF-8: {}", e)))
}

/// `ContentApi` over the GitHub REST API.
pub struct GitHubContentsApi {
    client: reqwest::Client,
    settings: GitHubConfig,
}

impl GitHubContentsApi {
    pub fn new(settings: GitHubConfig, token: &str) -> Result<Self> {
        Self::with_builder(settings, token, reqwest::Client::builder())
    }

    fn with_builder(
        settings: GitHubConfig,
        token: &str,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| SurveyError::Configuration(format!("Invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| SurveyError::Configuration(format!("Invalid user agent: {}", e)))?,
        );

        let client = builder
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.owner,
            self.settings.repo,
            self.settings.path.trim_start_matches('/')
        )
    }
}

async fn api_error(response: reqwest::Response) -> SurveyError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SurveyError::RemoteApi { status, body }
}

impl ContentApi for GitHubContentsApi {
    async fn get_file(&self) -> Result<Option<RemoteFile>> {
        let url = self.contents_url();
        debug!("GET {} (ref {})", url, self.settings.branch);

        let response = self
            .client
            .get(&url)
            .query(&[("ref", self.settings.branch.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let body: ContentsResponse = response.json().await?;
                if let Some(encoding) = body.encoding.as_deref() {
                    if encoding != "base64" {
                        return Err(SurveyError::Decode(format!(
                            "Unsupported content encoding '{}' for {}",
                            encoding, self.settings.path
                        )));
                    }
                }
                Ok(Some(RemoteFile {
                    content: decode_content(&body.content)?,
                    sha: body.sha,
                }))
            }
            _ => Err(api_error(response).await),
        }
    }

    async fn put_file(&self, content: &str, sha: Option<&str>) -> Result<Option<String>> {
        let url = self.contents_url();
        let request = PutContentsRequest {
            message: &self.settings.commit_message,
            content: encode_content(content),
            branch: &self.settings.branch,
            sha,
        };
        debug!("PUT {} ({})", url, if sha.is_some() { "update" } else { "create" });

        let response = self.client.put(&url).json(&request).send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let body: PutContentsResponse = response.json().await?;
                Ok(body.content.map(|c| c.sha))
            }
            _ => Err(api_error(response).await),
        }
    }

    fn location(&self) -> String {
        format!(
            "github:{}/{}@{}:{}",
            self.settings.owner, self.settings.repo, self.settings.branch, self.settings.path
        )
    }
}

/// Read-modify-write ledger over any `ContentApi`.
pub struct RemoteLedgerStore<A> {
    api: A,
    max_conflict_retries: u32,
    base_backoff_ms: u64,
}

impl<A: ContentApi> RemoteLedgerStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            max_conflict_retries: 3,
            base_backoff_ms: 200,
        }
    }

    pub fn with_retry(mut self, max_conflict_retries: u32, base_backoff_ms: u64) -> Self {
        self.max_conflict_retries = max_conflict_retries;
        self.base_backoff_ms = base_backoff_ms;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }
}

impl RemoteLedgerStore<GitHubContentsApi> {
    pub fn github(settings: GitHubConfig, token: &str) -> Result<Self> {
        let retries = settings.max_conflict_retries;
        let backoff = settings.base_backoff_ms;
        Ok(Self::new(GitHubContentsApi::new(settings, token)?).with_retry(retries, backoff))
    }
}

impl<A: ContentApi + Sync> ResponseStore for RemoteLedgerStore<A> {
    async fn load(&self) -> Result<ResponseLedger> {
        match self.api.get_file().await? {
            Some(file) => ResponseLedger::from_csv(&file.content),
            None => Ok(ResponseLedger::new()),
        }
    }

    async fn append(&self, record: ResponseRecord) -> Result<AppendReceipt> {
        let mut attempt = 0u32;

        loop {
            let (mut ledger, sha) = match self.api.get_file().await? {
                Some(file) => (ResponseLedger::from_csv(&file.content)?, Some(file.sha)),
                None => (ResponseLedger::new(), None),
            };
            ledger.append(record.clone());
            let content = ledger.to_csv()?;

            match self.api.put_file(&content, sha.as_deref()).await {
                Ok(version) => {
                    info!("Committed response {} to {}", ledger.len(), self.api.location());
                    return Ok(AppendReceipt {
                        records: ledger.len(),
                        location: self.api.location(),
                        version,
                        attempts: attempt + 1,
                    });
                }
                Err(e)
                    if attempt < self.max_conflict_retries
                        && e.is_version_conflict(sha.is_some()) =>
                {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "Ledger changed remotely ({}), retrying in {:?} ({}/{})",
                        e,
                        delay,
                        attempt + 1,
                        self.max_conflict_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn location(&self) -> String {
        self.api.location()
    }
}
