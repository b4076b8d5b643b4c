//! Environment configuration for the GitHub store.

use std::env;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "INKVAULT_GITHUB_TOKEN";

/// Environment variable holding the `owner/name` repository slug.
pub const REPO_ENV: &str = "INKVAULT_GITHUB_REPO";

/// Name of the scene file inside the repository.
pub const SCENE_FILE: &str = "scene.inkvault";

/// Default API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Connection settings for the GitHub store.
///
/// A missing token is the disabled state, not an error: the store is
/// constructed anyway and every operation short-circuits without
/// touching the network.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Bearer token; `None` disables persistence entirely.
    pub token: Option<String>,
    /// Repository slug, `owner/name`.
    pub repo: String,
    /// Path of the scene file within the repository.
    pub path: String,
    /// API base URL; tests point this at a local fixture server.
    pub api_base: String,
}

impl GitHubConfig {
    /// Config for the given repository with the default file name and
    /// endpoint.
    pub fn new(repo: impl Into<String>, token: Option<String>) -> Self {
        Self {
            token,
            repo: repo.into(),
            path: SCENE_FILE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// Returns `None` when no repository is configured. An absent or
    /// empty token yields a disabled config, not `None`.
    pub fn from_env() -> Option<Self> {
        let repo = env::var(REPO_ENV).ok().filter(|r| !r.is_empty())?;
        let token = env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Some(Self::new(repo, token))
    }

    /// Whether a token is present.
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }
}
