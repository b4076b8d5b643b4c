//! GitHub contents-API implementation of [`RemoteStore`].
//!
//! Persists the scene as one file in a repository. Each write carries
//! the blob SHA from the latest read or write of the file so the API
//! accepts the overwrite; the first-ever write omits it, which creates
//! the file.

use crate::config::GitHubConfig;
use chrono::{SecondsFormat, Utc};
use inkvault_core::storage::{BoxFuture, RemoteStore, StoreError, StoreResult};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    content: String,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: String,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Remote store backed by a file in a GitHub repository.
pub struct GitHubStore {
    config: GitHubConfig,
    http: Client,
    /// Version token (blob SHA) of the last revision seen. Empty until
    /// the first successful read or write; interior mutability because
    /// trait methods take `&self`.
    sha: RwLock<Option<String>>,
}

impl GitHubStore {
    /// Create a store for the given configuration.
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            sha: RwLock::new(None),
        }
    }

    /// Store configured from the environment, if a repository is set.
    pub fn from_env() -> Option<Self> {
        GitHubConfig::from_env().map(Self::new)
    }

    /// The configuration this store was built from.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_base, self.config.repo, self.config.path
        )
    }

    fn held_sha(&self) -> Option<String> {
        self.sha.read().ok().and_then(|guard| guard.clone())
    }

    fn remember_sha(&self, sha: String) {
        if let Ok(mut guard) = self.sha.write() {
            *guard = Some(sha);
        }
    }

    async fn error_for_status(response: Response) -> StoreError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        StoreError::RemoteUnavailable(format!("status {status}: {text}"))
    }

    async fn fetch_inner(&self, token: &str) -> StoreResult<Option<String>> {
        let response = self
            .http
            .get(self.contents_url())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, GITHUB_JSON)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            log::info!("no scene file in {}", self.config.repo);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(format!("invalid response: {e}")))?;

        self.remember_sha(body.sha);
        Ok(Some(body.content))
    }

    async fn store_inner(&self, token: &str, payload: &str) -> StoreResult<()> {
        let request = PutRequest {
            message: format!(
                "Auto-save {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            content: payload,
            sha: self.held_sha(),
        };

        let response = self
            .http
            .put(self.contents_url())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, GITHUB_JSON)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(format!("invalid response: {e}")))?;

        self.remember_sha(body.content.sha);
        Ok(())
    }
}

impl RemoteStore for GitHubStore {
    fn is_configured(&self) -> bool {
        self.config.is_enabled()
    }

    fn fetch(&self) -> BoxFuture<'_, StoreResult<Option<String>>> {
        Box::pin(async move {
            let Some(token) = self.config.token.clone() else {
                log::debug!("github store not configured; skipping fetch");
                return Ok(None);
            };
            self.fetch_inner(&token).await
        })
    }

    fn store(&self, payload: &str) -> BoxFuture<'_, StoreResult<()>> {
        let payload = payload.to_string();
        Box::pin(async move {
            let Some(token) = self.config.token.clone() else {
                return Err(StoreError::NotConfigured);
            };
            self.store_inner(&token, &payload).await
        })
    }
}
