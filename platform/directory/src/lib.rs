//! Clients for the employee-directory collaborator.
//!
//! The directory owns employee records; this crate only lists them. Two
//! sources exist: the HTTP directory used in deployments and a fixture file
//! used for local development and the `roster` command.

use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use products_roster::EmployeeRecord;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("employee directory is not configured; set DIRECTORY_URL or DIRECTORY_FIXTURE")]
    NotConfigured,
    #[error("invalid directory setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("employee directory request failed")]
    Request(#[from] reqwest::Error),
    #[error("employee directory answered with status {0}")]
    Status(u16),
    #[error("employee directory returned malformed data")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read employee fixture {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[async_trait]
pub trait EmployeeSource: Send + Sync {
    async fn list_employees(&self) -> DirectoryResult<Vec<EmployeeRecord>>;
}

/// Where to find employees, read from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectorySettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
    pub fixture: Option<PathBuf>,
}

impl DirectorySettings {
    pub fn from_env() -> DirectoryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DirectoryResult<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let timeout = match non_empty("DIRECTORY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|err| DirectoryError::InvalidSetting {
                    key: "DIRECTORY_TIMEOUT_SECS",
                    reason: err.to_string(),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: non_empty("DIRECTORY_URL").map(|url| url.trim_end_matches('/').to_string()),
            token: non_empty("DIRECTORY_TOKEN"),
            timeout: Duration::from_secs(timeout),
            fixture: non_empty("DIRECTORY_FIXTURE").map(PathBuf::from),
        })
    }

    /// Builds the configured source. A fixture takes precedence over a URL.
    pub fn build(&self) -> DirectoryResult<Arc<dyn EmployeeSource>> {
        if let Some(path) = &self.fixture {
            return Ok(Arc::new(FixtureDirectory::new(path.clone())));
        }
        let Some(base_url) = &self.base_url else {
            return Err(DirectoryError::NotConfigured);
        };
        Ok(Arc::new(HttpDirectory::new(
            base_url.clone(),
            self.token.clone(),
            self.timeout,
        )?))
    }
}

/// Either a bare array or the first page of a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Page { results: Vec<EmployeeRecord> },
    Bare(Vec<EmployeeRecord>),
}

impl Listing {
    fn into_records(self) -> Vec<EmployeeRecord> {
        match self {
            Listing::Page { results } => results,
            Listing::Bare(records) => records,
        }
    }
}

pub fn parse_listing(bytes: &[u8]) -> DirectoryResult<Vec<EmployeeRecord>> {
    let listing: Listing = serde_json::from_slice(bytes)?;
    Ok(listing.into_records())
}

pub struct HttpDirectory {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpDirectory {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> DirectoryResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/employees", base_url.trim_end_matches('/')),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmployeeSource for HttpDirectory {
    #[instrument(name = "directory.http.list", skip_all, fields(endpoint = %self.endpoint))]
    async fn list_employees(&self) -> DirectoryResult<Vec<EmployeeRecord>> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let records = parse_listing(&body)?;
        debug!(count = records.len(), "employees listed");
        Ok(records)
    }
}

pub struct FixtureDirectory {
    path: PathBuf,
}

impl FixtureDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EmployeeSource for FixtureDirectory {
    #[instrument(name = "directory.fixture.list", skip_all, fields(path = %self.path.display()))]
    async fn list_employees(&self) -> DirectoryResult<Vec<EmployeeRecord>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| DirectoryError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let records = parse_listing(&bytes)?;
        debug!(count = records.len(), "employees loaded from fixture");
        Ok(records)
    }
}

/// Fixed list held in memory.
pub struct StaticDirectory {
    records: Vec<EmployeeRecord>,
}

impl StaticDirectory {
    pub fn new(records: Vec<EmployeeRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl EmployeeSource for StaticDirectory {
    async fn list_employees(&self) -> DirectoryResult<Vec<EmployeeRecord>> {
        Ok(self.records.clone())
    }
}
