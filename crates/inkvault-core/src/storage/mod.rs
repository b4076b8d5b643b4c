//! Storage abstraction for remote persistence.

mod codec;
mod manager;
mod memory;

pub use codec::{FORMAT_TAG, FORMAT_VERSION, decode_scene, encode_scene};
pub use manager::{DEFAULT_QUIET_PERIOD_MS, SaveManager};
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credentials configured; persistence is disabled, not failing.
    #[error("remote store not configured")]
    NotConfigured,
    /// The remote file does not exist yet.
    #[error("remote document not found")]
    NotFound,
    /// Stored content could not be decoded into a scene.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// Network or protocol failure talking to the remote store.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A remote store holding a single named scene document.
///
/// Implementations track whatever revision handle the backing service
/// requires for safe overwrite; callers only move opaque payload text
/// produced by [`encode_scene`].
pub trait RemoteStore: Send + Sync {
    /// Whether credentials are present and calls may touch the network.
    fn is_configured(&self) -> bool;

    /// Fetch the stored payload.
    ///
    /// `Ok(None)` means the file does not exist yet (cold start). The
    /// unconfigured state also yields `Ok(None)` without any network
    /// access.
    fn fetch(&self) -> BoxFuture<'_, StoreResult<Option<String>>>;

    /// Overwrite (or create) the stored payload.
    fn store(&self, payload: &str) -> BoxFuture<'_, StoreResult<()>>;
}
